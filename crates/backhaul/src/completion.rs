//! Single-shot completion slot for the backhaul status event.
//!
//! One producer (the init path or the link-up interrupt), one consumer (the
//! bring-up orchestrator). The slot replaces the raw callback as the thing
//! callers wait on, and — unlike the callback channel — gives them a bounded
//! wait: construction failure never produces an event, so a caller that
//! polls past its budget can conclude the attempt is dead instead of
//! spinning forever on a status that will never arrive.

use thiserror_no_std::Error;

use crate::handle::StatusEvent;

/// Errors from resolving the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompletionError {
    /// The slot already holds an event; the exactly-once delivery guarantee
    /// means a second resolution is a protocol bug, not data to merge.
    #[error("completion already resolved")]
    AlreadyResolved,
}

/// A one-shot `Pending` → `Resolved(event)` slot.
#[derive(Debug, Default)]
pub struct Completion {
    event: Option<StatusEvent>,
}

impl Completion {
    /// A pending slot.
    pub const fn new() -> Self {
        Completion { event: None }
    }

    /// Store the status event. Rejects a second resolution.
    pub fn resolve(&mut self, event: StatusEvent) -> Result<(), CompletionError> {
        if self.event.is_some() {
            return Err(CompletionError::AlreadyResolved);
        }
        self.event = Some(event);
        Ok(())
    }

    /// The event, if the attempt has resolved.
    pub fn poll(&self) -> Option<StatusEvent> {
        self.event
    }

    /// Poll up to `budget` times, calling `step` between polls (a timer
    /// delay on hardware, a scheduler turn in tests). `None` after an
    /// exhausted budget means no status arrived — per the init protocol,
    /// the attempt failed during construction or the link never came up.
    pub fn wait<F>(&self, budget: usize, mut step: F) -> Option<StatusEvent>
    where
        F: FnMut(),
    {
        for _ in 0..budget {
            if let Some(event) = self.poll() {
                return Some(event);
            }
            step();
        }
        self.poll()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending() {
        assert_eq!(Completion::new().poll(), None);
    }

    #[test]
    fn test_resolve_then_poll() {
        let mut completion = Completion::new();
        completion
            .resolve(StatusEvent::from_raw_result(1))
            .expect("first resolve");
        let event = completion.poll().expect("resolved");
        assert!(event.link_up());
    }

    #[test]
    fn test_second_resolve_rejected() {
        let mut completion = Completion::new();
        completion
            .resolve(StatusEvent::from_raw_result(1))
            .expect("first resolve");
        let err = completion
            .resolve(StatusEvent::down())
            .expect_err("second resolve");
        assert_eq!(err, CompletionError::AlreadyResolved);
        // The original event is untouched.
        assert!(completion.poll().expect("still resolved").link_up());
    }

    #[test]
    fn test_wait_exhausts_budget_when_never_resolved() {
        let completion = Completion::new();
        let mut steps = 0usize;
        let result = completion.wait(10, || steps += 1);
        assert_eq!(result, None);
        assert_eq!(steps, 10, "every budget slot must be consumed");
    }

    #[test]
    fn test_wait_zero_budget_still_observes_resolved_slot() {
        let mut completion = Completion::new();
        completion
            .resolve(StatusEvent::down())
            .expect("resolve");
        assert!(completion.wait(0, || {}).is_some());
    }
}
