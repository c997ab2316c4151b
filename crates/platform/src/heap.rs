//! Allocator fault taxonomy and heap statistics.
//!
//! The mesh stack brings its own region allocator; this layer only hands it
//! a static region at startup and receives two things back: a fault callback
//! when the allocator detects corruption or misuse, and a statistics block
//! it keeps updated. Neither is acted on — faults are classified, reported
//! and followed by a permanent halt, and statistics are printed for bench
//! diagnostics.

/// One allocator-misuse category, decoded from the event code the external
/// allocator passes to its fault callback.
///
/// Codes follow the allocator's own enumeration order (0..=5). Ephemeral:
/// consumed synchronously by the classifier, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeapFaultEvent {
    /// `free(NULL)` style call.
    NullFree,
    /// Block released twice.
    DoubleFree,
    /// Allocation size outside the allocator's accepted range.
    InvalidSize,
    /// Pointer released that the allocator never handed out.
    InvalidPointer,
    /// Heap sector bookkeeping overwritten.
    SectorCorrupted,
    /// Heap used before the region was installed.
    SectorUninitialized,
}

impl HeapFaultEvent {
    /// Decode the allocator's raw event code. Unknown codes yield `None`;
    /// the caller reports the raw value instead of guessing a category.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(HeapFaultEvent::NullFree),
            1 => Some(HeapFaultEvent::DoubleFree),
            2 => Some(HeapFaultEvent::InvalidSize),
            3 => Some(HeapFaultEvent::InvalidPointer),
            4 => Some(HeapFaultEvent::SectorCorrupted),
            5 => Some(HeapFaultEvent::SectorUninitialized),
            _ => None,
        }
    }

    /// The allocator's code for this category.
    pub fn code(self) -> u8 {
        match self {
            HeapFaultEvent::NullFree => 0,
            HeapFaultEvent::DoubleFree => 1,
            HeapFaultEvent::InvalidSize => 2,
            HeapFaultEvent::InvalidPointer => 3,
            HeapFaultEvent::SectorCorrupted => 4,
            HeapFaultEvent::SectorUninitialized => 5,
        }
    }

    /// Short diagnostic name for fault reports.
    pub fn description(self) -> &'static str {
        match self {
            HeapFaultEvent::NullFree => "null free",
            HeapFaultEvent::DoubleFree => "double free",
            HeapFaultEvent::InvalidSize => "invalid allocation size",
            HeapFaultEvent::InvalidPointer => "invalid pointer",
            HeapFaultEvent::SectorCorrupted => "heap sector corrupted",
            HeapFaultEvent::SectorUninitialized => "heap sector uninitialized",
        }
    }
}

/// Snapshot of the allocator's statistics block.
///
/// The allocator updates its block in place; the firmware copies it into
/// this struct before reporting so the numbers in one report are coherent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemStats {
    /// Total bytes in the installed heap region.
    pub heap_size: u32,
    /// Bytes currently allocated.
    pub allocated_bytes: u32,
    /// High-water mark of allocated bytes.
    pub max_allocated_bytes: u32,
    /// Allocation requests the allocator had to refuse.
    pub alloc_fail_count: u32,
}

impl MemStats {
    /// `true` when the allocator has ever refused a request — an early
    /// warning that the configured heap is undersized for the deployment.
    pub fn has_failures(&self) -> bool {
        self.alloc_fail_count > 0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_six_codes_decode() {
        for code in 0..=5u8 {
            let event = HeapFaultEvent::from_code(code);
            assert!(event.is_some(), "code {code} must decode");
        }
    }

    #[test]
    fn test_code_round_trip() {
        for code in 0..=5u8 {
            let event = HeapFaultEvent::from_code(code).expect("known code");
            assert_eq!(event.code(), code);
        }
    }

    #[test]
    fn test_unknown_codes_are_none() {
        assert_eq!(HeapFaultEvent::from_code(6), None);
        assert_eq!(HeapFaultEvent::from_code(0xFF), None);
    }

    #[test]
    fn test_descriptions_are_distinct() {
        let events = [
            HeapFaultEvent::NullFree,
            HeapFaultEvent::DoubleFree,
            HeapFaultEvent::InvalidSize,
            HeapFaultEvent::InvalidPointer,
            HeapFaultEvent::SectorCorrupted,
            HeapFaultEvent::SectorUninitialized,
        ];
        for (i, a) in events.iter().enumerate() {
            for b in events.iter().skip(i.saturating_add(1)) {
                assert_ne!(a.description(), b.description());
            }
        }
    }

    #[test]
    fn test_mem_stats_failure_flag() {
        let clean = MemStats {
            heap_size: 32 * 1024,
            allocated_bytes: 1024,
            max_allocated_bytes: 2048,
            alloc_fail_count: 0,
        };
        assert!(!clean.has_failures());

        let starved = MemStats {
            alloc_fail_count: 3,
            ..clean
        };
        assert!(starved.has_failures());
    }
}
