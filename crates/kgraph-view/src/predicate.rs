//! Node-selection predicates, the parameterisation shared by most links.

use crate::View;
use kgraph_core::NodeId;
use kgraph_engine::Kernel;

/// A way to select among a candidate set of nodes. Every link that accepts a
/// predicate treats `Predicate::Any` as "no filtering".
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches every candidate.
    Any,
    /// Matches a candidate whose (resolved) heading equals this text.
    Heading(String),
    /// Matches a candidate whose (resolved) id equals this id.
    Id(NodeId),
    /// Matches a candidate only if every sub-predicate matches.
    AllOf(Vec<Predicate>),
    /// Matches a candidate if at least one sub-predicate matches.
    AnyOf(Vec<Predicate>),
    /// Matches a candidate only if no sub-predicate matches.
    NoneOf(Vec<Predicate>),
    /// Matches a candidate if exactly one sub-predicate matches it —
    /// `any_of`'s exclusive-or counterpart.
    Exactly(Vec<Predicate>),
    /// Matches a candidate iff it appears in the result set of a nested view,
    /// evaluated fresh against the same kernel for every candidate checked.
    InView(Box<View>),
}

impl Predicate {
    /// `true` iff `candidate` satisfies this predicate against `kernel`.
    pub fn matches(&self, kernel: &Kernel, candidate: NodeId) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Heading(heading) => kernel.fetch_heading(candidate).as_deref() == Some(heading.as_str()),
            Predicate::Id(id) => kernel.resolve(candidate) == kernel.resolve(*id),
            Predicate::AllOf(preds) => preds.iter().all(|p| p.matches(kernel, candidate)),
            Predicate::AnyOf(preds) => preds.iter().any(|p| p.matches(kernel, candidate)),
            Predicate::NoneOf(preds) => !preds.iter().any(|p| p.matches(kernel, candidate)),
            Predicate::Exactly(preds) => preds.iter().filter(|p| p.matches(kernel, candidate)).count() == 1,
            Predicate::InView(view) => view
                .eval(kernel)
                .map(|nodes| nodes.contains(&candidate))
                .unwrap_or(false),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Any => write!(f, "*"),
            Predicate::Heading(h) => write!(f, "{h:?}"),
            Predicate::Id(id) => write!(f, "#{id}"),
            Predicate::AllOf(ps) => write!(f, "all_of({})", render(ps)),
            Predicate::AnyOf(ps) => write!(f, "any_of({})", render(ps)),
            Predicate::NoneOf(ps) => write!(f, "none_of({})", render(ps)),
            Predicate::Exactly(ps) => write!(f, "exactly({})", render(ps)),
            Predicate::InView(view) => write!(f, "in({view})"),
        }
    }
}

fn render(preds: &[Predicate]) -> String {
    preds.iter().map(Predicate::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_testkit::TestGraph;

    #[test]
    fn heading_and_id_predicates() {
        let mut g = TestGraph::new();
        let n1 = g.child(g.root, "1");
        assert!(Predicate::Heading("1".into()).matches(&g.kernel, n1));
        assert!(!Predicate::Heading("2".into()).matches(&g.kernel, n1));
        assert!(Predicate::Id(n1).matches(&g.kernel, n1));
    }

    #[test]
    fn exactly_is_an_exclusive_or_over_sub_predicates() {
        let mut g = TestGraph::new();
        let n1 = g.child(g.root, "1");
        let pred = Predicate::Exactly(vec![
            Predicate::Heading("1".into()),
            Predicate::Heading("also_1".into()),
        ]);
        assert!(pred.matches(&g.kernel, n1));

        let pred_both = Predicate::Exactly(vec![Predicate::Heading("1".into()), Predicate::Any]);
        assert!(!pred_both.matches(&g.kernel, n1));
    }
}
