//! End-to-end tests of the backhaul init-and-notify protocol:
//! Initializer + Completion wired the way the firmware orchestrator wires
//! them, with mock transports standing in for the hardware drivers.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use std::cell::RefCell;

use backhaul::{
    BringUp, Completion, ConstructError, DriverHandle, InitState, Initializer, StatusEvent,
    Transport,
};
use platform::mac::Eui48;

const MAC: Eui48 = Eui48::from_octets([0x02, 0x1A, 0x4B, 0x00, 0x00, 0x07]);

/// Scriptable transport: fails construction, registers synchronously, or
/// defers like the Ethernet PHY negotiation.
struct ScriptedTransport {
    construct: Result<(), ConstructError>,
    bring_up: BringUp,
}

impl Transport for ScriptedTransport {
    fn construct(&mut self) -> Result<(), ConstructError> {
        self.construct
    }

    fn bring_up(&mut self, _mac: &Eui48) -> BringUp {
        self.bring_up
    }
}

/// Count every event that lands in the completion slot, the way the
/// orchestrator's status sink does.
fn sink_into<'a>(
    completion: &'a RefCell<Completion>,
    deliveries: &'a RefCell<u32>,
) -> impl FnOnce(StatusEvent) + 'a {
    move |event| {
        *deliveries.borrow_mut() += 1;
        completion
            .borrow_mut()
            .resolve(event)
            .expect("slot must accept the first event");
    }
}

#[test]
fn synchronous_success_delivers_exactly_one_up_event() {
    let completion = RefCell::new(Completion::new());
    let deliveries = RefCell::new(0u32);
    let mut init = Initializer::new();
    let mut transport = ScriptedTransport {
        construct: Ok(()),
        bring_up: BringUp::Immediate(6),
    };

    init.initialize(&mut transport, &MAC, sink_into(&completion, &deliveries))
        .expect("init");

    assert_eq!(*deliveries.borrow(), 1);
    let event = completion.borrow().poll().expect("resolved");
    assert!(event.link_up());
    assert!(event.handle().raw() >= 0);
    // No second invocation follows: the initializer is terminal.
    assert_eq!(init.state(), InitState::Succeeded);
    assert!(init.complete(6, |_| panic!("must not emit again")).is_err());
}

#[test]
fn synchronous_failure_delivers_exactly_one_down_event() {
    let completion = RefCell::new(Completion::new());
    let deliveries = RefCell::new(0u32);
    let mut init = Initializer::new();
    let mut transport = ScriptedTransport {
        construct: Ok(()),
        bring_up: BringUp::Immediate(-1),
    };

    init.initialize(&mut transport, &MAC, sink_into(&completion, &deliveries))
        .expect("init");

    assert_eq!(*deliveries.borrow(), 1);
    let event = completion.borrow().poll().expect("resolved");
    assert!(!event.link_up());
    assert_eq!(event.handle(), DriverHandle::INVALID);
}

#[test]
fn construction_failure_fires_nothing_within_poll_window() {
    let completion = RefCell::new(Completion::new());
    let deliveries = RefCell::new(0u32);
    let mut init = Initializer::new();
    let mut transport = ScriptedTransport {
        construct: Err(ConstructError::AllocationFailed),
        bring_up: BringUp::Immediate(0),
    };

    let result = init.initialize(&mut transport, &MAC, sink_into(&completion, &deliveries));
    assert!(result.is_err());

    // Bounded poll window: nothing may arrive, ever.
    let waited = completion.borrow().wait(100, || {});
    assert_eq!(waited, None);
    assert_eq!(*deliveries.borrow(), 0);
}

#[test]
fn deferred_registration_resolves_during_poll_loop() {
    let mut completion = Completion::new();
    let mut init = Initializer::new();
    let mut transport = ScriptedTransport {
        construct: Ok(()),
        bring_up: BringUp::Deferred,
    };

    init.initialize(&mut transport, &MAC, |_| {
        panic!("deferred transport must not emit from initialize")
    })
    .expect("init");
    assert_eq!(init.state(), InitState::AwaitingResult);

    // Bounded poll loop with the PHY negotiation finishing on step 3.
    let mut observed = None;
    for step in 0..10 {
        if let Some(event) = completion.poll() {
            observed = Some(event);
            break;
        }
        if step == 3 {
            init.complete(1, |e| {
                completion.resolve(e).expect("first event");
            })
            .expect("completion accepted");
        }
    }

    let event = observed.expect("event must arrive inside the budget");
    assert!(event.link_up());
    assert_eq!(event.handle().raw(), 1);
    assert_eq!(init.state(), InitState::Succeeded);
}

#[test]
fn deferred_negative_result_is_down_event_with_sentinel() {
    let mut completion = Completion::new();
    let mut init = Initializer::new();
    let mut transport = ScriptedTransport {
        construct: Ok(()),
        bring_up: BringUp::Deferred,
    };
    init.initialize(&mut transport, &MAC, |_| {}).expect("init");

    init.complete(-5, |e| {
        completion.resolve(e).expect("first event");
    })
    .expect("completion accepted");

    let event = completion.poll().expect("resolved");
    assert!(!event.link_up());
    assert_eq!(event.handle(), DriverHandle::INVALID);
    assert_eq!(init.state(), InitState::Failed);
}
