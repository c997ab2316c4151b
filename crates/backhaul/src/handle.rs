//! Driver handles and the status event delivered on init completion.

/// Opaque identifier for a registered backhaul driver instance.
///
/// The mesh stack hands out small non-negative integers; [`Self::INVALID`]
/// is the reserved sentinel distinct from every valid handle. Produced at
/// most once per successful initialization attempt, never mutated after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverHandle(i8);

impl DriverHandle {
    /// The reserved "no driver" sentinel.
    pub const INVALID: DriverHandle = DriverHandle(-1);

    /// Wrap a raw stack-assigned id. Negative values are all treated as the
    /// sentinel — the stack's error returns carry no finer meaning here.
    pub fn from_raw(raw: i8) -> Self {
        if raw >= 0 {
            DriverHandle(raw)
        } else {
            DriverHandle::INVALID
        }
    }

    /// `true` for every handle the stack actually assigned (≥ 0).
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// The raw id for calls back into the stack.
    pub fn raw(self) -> i8 {
        self.0
    }
}

/// Outcome of one backhaul initialization attempt, delivered exactly once.
///
/// Invariant: `link_up` implies `handle.is_valid()`. The only constructors
/// are [`StatusEvent::from_raw_result`] and [`StatusEvent::down`], both of
/// which maintain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusEvent {
    link_up: bool,
    handle: DriverHandle,
}

impl StatusEvent {
    /// Classify a raw driver-registration result: non-negative is a live
    /// link with that handle, negative is a failed attempt with the
    /// sentinel.
    pub fn from_raw_result(raw: i8) -> Self {
        if raw >= 0 {
            StatusEvent {
                link_up: true,
                handle: DriverHandle::from_raw(raw),
            }
        } else {
            StatusEvent::down()
        }
    }

    /// A failed attempt: link down, sentinel handle.
    pub fn down() -> Self {
        StatusEvent {
            link_up: false,
            handle: DriverHandle::INVALID,
        }
    }

    /// `true` when the backhaul came up.
    pub fn link_up(&self) -> bool {
        self.link_up
    }

    /// The assigned driver handle; the sentinel when the attempt failed.
    pub fn handle(&self) -> DriverHandle {
        self.handle
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_raw_is_valid_handle() {
        assert!(DriverHandle::from_raw(0).is_valid());
        assert!(DriverHandle::from_raw(5).is_valid());
    }

    #[test]
    fn test_negative_raw_collapses_to_sentinel() {
        assert_eq!(DriverHandle::from_raw(-1), DriverHandle::INVALID);
        assert_eq!(DriverHandle::from_raw(-7), DriverHandle::INVALID);
        assert!(!DriverHandle::INVALID.is_valid());
    }

    #[test]
    fn test_success_event_carries_valid_handle() {
        let event = StatusEvent::from_raw_result(3);
        assert!(event.link_up());
        assert!(event.handle().is_valid());
        assert_eq!(event.handle().raw(), 3);
    }

    #[test]
    fn test_failure_event_carries_sentinel() {
        let event = StatusEvent::from_raw_result(-2);
        assert!(!event.link_up());
        assert_eq!(event.handle(), DriverHandle::INVALID);
    }

    #[test]
    fn test_link_up_implies_valid_handle() {
        for raw in i8::MIN..=i8::MAX {
            let event = StatusEvent::from_raw_result(raw);
            if event.link_up() {
                assert!(event.handle().is_valid());
            } else {
                assert_eq!(event.handle(), DriverHandle::INVALID);
            }
        }
    }
}
