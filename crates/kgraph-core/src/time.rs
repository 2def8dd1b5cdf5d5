//! Wall-clock timestamps for genesis stamps.
//!
//! This is a one-shot timestamp source, not a timer or scheduler — it only
//! answers "what time is it right now", once, at node creation. Autosave and
//! clock-tick driven concerns live outside the kernel entirely.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, for the genesis attribute's body.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
