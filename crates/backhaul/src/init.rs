//! The backhaul initialization state machine.
//!
//! ```text
//! Uninitialized → Constructing → AwaitingResult → Succeeded
//!                      │                 └──────→ Failed
//!                      └────────────────────────→ Failed   (construction)
//! ```
//!
//! Whatever happens, the status sink fires at most once per attempt, and for
//! every path except construction failure it fires exactly once. On
//! construction failure the attempt terminates *without* an event — the
//! stack-compatible contract is that callers bound their wait and treat "no
//! status" as failure (see [`crate::Completion::wait`]). That contract is a
//! sharp edge inherited from the stack's driver API, not something to rely
//! on in new callers: the `Result` returned by [`Initializer::initialize`]
//! is the honest signal.

use platform::mac::Eui48;
use thiserror_no_std::Error;

use crate::handle::StatusEvent;

/// Result of a transport's registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUp {
    /// Registration finished on this call stack; the raw stack result is
    /// ready (non-negative handle or negative error).
    Immediate(i8),
    /// Registration continues in a hardware completion context (Ethernet
    /// PHY auto-negotiation); the result arrives later via
    /// [`Initializer::complete`].
    Deferred,
}

/// Why driver construction failed before registration was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConstructError {
    /// Driver storage could not be allocated.
    #[error("driver allocation failed")]
    AllocationFailed,
    /// The transport's parameters cannot configure the hardware.
    #[error("invalid transport configuration")]
    InvalidConfiguration,
}

/// A backhaul transport as the init protocol sees it.
///
/// Implemented by the hardware drivers in the firmware crate and by mock
/// transports in tests. `construct` performs resource pre-allocation only
/// (claiming pins, reserving driver storage); `bring_up` registers the
/// device with the mesh stack under the given MAC address.
pub trait Transport {
    /// Allocate driver resources. No side effects beyond pre-allocation.
    fn construct(&mut self) -> Result<(), ConstructError>;

    /// Register with the stack. Synchronous transports return
    /// [`BringUp::Immediate`]; transports with asynchronous link
    /// negotiation return [`BringUp::Deferred`].
    fn bring_up(&mut self, mac: &Eui48) -> BringUp;
}

/// States of one initialization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitState {
    /// No attempt started.
    Uninitialized,
    /// Constructing the driver.
    Constructing,
    /// Waiting for a deferred registration result.
    AwaitingResult,
    /// Terminal: the backhaul is up.
    Succeeded,
    /// Terminal: the attempt failed. No internal retry — retry policy, if
    /// any, belongs to the caller.
    Failed,
}

/// Protocol violations and construction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// `initialize` called on an attempt that already ran.
    #[error("initialization already attempted")]
    AlreadyStarted,
    /// Driver construction failed; no status event was (or will be) emitted.
    #[error("driver construction failed: {0}")]
    Construction(ConstructError),
    /// `complete` called while no deferred registration is outstanding.
    #[error("no deferred registration outstanding")]
    NotAwaitingResult,
}

/// Drives one initialization attempt over a [`Transport`].
///
/// The status sink is invoked exactly once per attempt — from the same call
/// stack as [`Self::initialize`] for synchronous transports, or from the
/// completion context via [`Self::complete`] for deferred ones. The state
/// machine itself holds no interior mutability; callers in interrupt-driven
/// contexts wrap it in their executor's mutex (the firmware uses a
/// critical-section mutex so the completion interrupt cannot race the init
/// call stack).
#[derive(Debug)]
pub struct Initializer {
    state: InitState,
}

impl Initializer {
    /// A fresh attempt in `Uninitialized`.
    pub const fn new() -> Self {
        Initializer {
            state: InitState::Uninitialized,
        }
    }

    /// Current protocol state.
    pub fn state(&self) -> InitState {
        self.state
    }

    /// Run the attempt: construct, then register under `mac`.
    ///
    /// - Construction failure → `Failed`, returns `Err`, **no status event**
    ///   (stack-compatible callback-absence path).
    /// - Immediate registration → terminal state and exactly one event
    ///   through `sink`.
    /// - Deferred registration → stays `AwaitingResult`; the event is
    ///   emitted by [`Self::complete`].
    pub fn initialize<T, F>(
        &mut self,
        transport: &mut T,
        mac: &Eui48,
        sink: F,
    ) -> Result<InitState, InitError>
    where
        T: Transport,
        F: FnOnce(StatusEvent),
    {
        if self.state != InitState::Uninitialized {
            return Err(InitError::AlreadyStarted);
        }

        self.state = InitState::Constructing;
        if let Err(cause) = transport.construct() {
            self.state = InitState::Failed;
            return Err(InitError::Construction(cause));
        }

        self.state = InitState::AwaitingResult;
        match transport.bring_up(mac) {
            BringUp::Immediate(raw) => {
                let event = self.settle(raw);
                sink(event);
                Ok(self.state)
            }
            BringUp::Deferred => Ok(self.state),
        }
    }

    /// Deliver the result of a deferred registration.
    ///
    /// Valid only in `AwaitingResult`; a second completion (or one without a
    /// matching deferred `initialize`) is rejected, which is what makes the
    /// exactly-once sink guarantee hold across the interrupt boundary.
    pub fn complete<F>(&mut self, raw: i8, sink: F) -> Result<InitState, InitError>
    where
        F: FnOnce(StatusEvent),
    {
        if self.state != InitState::AwaitingResult {
            return Err(InitError::NotAwaitingResult);
        }
        let event = self.settle(raw);
        sink(event);
        Ok(self.state)
    }

    fn settle(&mut self, raw: i8) -> StatusEvent {
        let event = StatusEvent::from_raw_result(raw);
        self.state = if event.link_up() {
            InitState::Succeeded
        } else {
            InitState::Failed
        };
        event
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mac::Eui48;

    struct FakeTransport {
        construct_result: Result<(), ConstructError>,
        bring_up_result: BringUp,
        constructed: bool,
    }

    impl FakeTransport {
        fn new(bring_up_result: BringUp) -> Self {
            FakeTransport {
                construct_result: Ok(()),
                bring_up_result,
                constructed: false,
            }
        }
    }

    impl Transport for FakeTransport {
        fn construct(&mut self) -> Result<(), ConstructError> {
            self.constructed = true;
            self.construct_result
        }

        fn bring_up(&mut self, _mac: &Eui48) -> BringUp {
            self.bring_up_result
        }
    }

    const MAC: Eui48 = Eui48::from_octets([0x02, 0, 0, 0, 0, 1]);

    #[test]
    fn test_sync_success_reaches_succeeded() {
        let mut init = Initializer::new();
        let mut transport = FakeTransport::new(BringUp::Immediate(4));
        let mut seen = None;
        let state = init
            .initialize(&mut transport, &MAC, |e| seen = Some(e))
            .expect("init must succeed");
        assert_eq!(state, InitState::Succeeded);
        let event = seen.expect("exactly one event");
        assert!(event.link_up());
        assert_eq!(event.handle().raw(), 4);
    }

    #[test]
    fn test_sync_failure_reaches_failed_with_event() {
        let mut init = Initializer::new();
        let mut transport = FakeTransport::new(BringUp::Immediate(-3));
        let mut seen = None;
        let state = init
            .initialize(&mut transport, &MAC, |e| seen = Some(e))
            .expect("protocol itself succeeds; the event carries the failure");
        assert_eq!(state, InitState::Failed);
        assert!(!seen.expect("event present").link_up());
    }

    #[test]
    fn test_construction_failure_emits_no_event() {
        let mut init = Initializer::new();
        let mut transport = FakeTransport::new(BringUp::Immediate(0));
        transport.construct_result = Err(ConstructError::AllocationFailed);
        let mut fired = false;
        let err = init
            .initialize(&mut transport, &MAC, |_| fired = true)
            .expect_err("construction failure propagates");
        assert_eq!(
            err,
            InitError::Construction(ConstructError::AllocationFailed)
        );
        assert!(!fired, "callback-absence path: no event on construction failure");
        assert_eq!(init.state(), InitState::Failed);
    }

    #[test]
    fn test_deferred_then_complete_success() {
        let mut init = Initializer::new();
        let mut transport = FakeTransport::new(BringUp::Deferred);
        let state = init
            .initialize(&mut transport, &MAC, |_| {
                unreachable!("deferred path must not emit yet")
            })
            .expect("deferred init accepted");
        assert_eq!(state, InitState::AwaitingResult);

        let mut seen = None;
        let state = init
            .complete(2, |e| seen = Some(e))
            .expect("completion accepted");
        assert_eq!(state, InitState::Succeeded);
        assert_eq!(seen.expect("event").handle().raw(), 2);
    }

    #[test]
    fn test_double_completion_rejected() {
        let mut init = Initializer::new();
        let mut transport = FakeTransport::new(BringUp::Deferred);
        init.initialize(&mut transport, &MAC, |_| {}).expect("init");
        init.complete(1, |_| {}).expect("first completion");
        let mut fired = false;
        let err = init.complete(1, |_| fired = true).expect_err("second");
        assert_eq!(err, InitError::NotAwaitingResult);
        assert!(!fired);
    }

    #[test]
    fn test_reinitialize_rejected() {
        let mut init = Initializer::new();
        let mut transport = FakeTransport::new(BringUp::Immediate(0));
        init.initialize(&mut transport, &MAC, |_| {}).expect("first");
        let err = init
            .initialize(&mut transport, &MAC, |_| {})
            .expect_err("second attempt");
        assert_eq!(err, InitError::AlreadyStarted);
    }

    #[test]
    fn test_complete_without_deferred_init_rejected() {
        let mut init = Initializer::new();
        let err = init.complete(0, |_| {}).expect_err("nothing outstanding");
        assert_eq!(err, InitError::NotAwaitingResult);
    }
}
