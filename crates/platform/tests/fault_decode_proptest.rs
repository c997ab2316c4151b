//! Property-based tests for the fault-status decoder.
//! Verifies invariants hold for ALL register values, not just fixed examples.

use platform::fault::{FaultPath, FaultSnapshot, MAX_CAUSES};

const HFSR_FORCED: u32 = 1 << 30;
const HFSR_VECTTBL: u32 = 1 << 1;

/// Mask of every CFSR bit the classifier reports on.
const REPORTABLE: u32 = (1 << 0)
    | (1 << 1)
    | (1 << 3)
    | (1 << 4)
    | (1 << 5)
    | (1 << 7)
    | (1 << 8)
    | (1 << 9)
    | (1 << 10)
    | (1 << 11)
    | (1 << 12)
    | (1 << 13)
    | (1 << 15)
    | (1 << 16)
    | (1 << 17)
    | (1 << 18)
    | (1 << 19)
    | (1 << 24)
    | (1 << 25);

proptest::proptest! {
    /// On the forced path, the number of causes equals the popcount of the
    /// reportable CFSR bits — every set bit reported, nothing invented.
    #[test]
    fn forced_cause_count_matches_popcount(cfsr in 0u32..=u32::MAX) {
        let snap = FaultSnapshot::from_raw(HFSR_FORCED, cfsr);
        let expected = (cfsr & REPORTABLE).count_ones() as usize;
        assert_eq!(snap.causes().len(), expected);
    }

    /// Cause order is a function of the register alone: re-decoding the same
    /// snapshot yields the identical sequence.
    #[test]
    fn decode_is_deterministic(cfsr in 0u32..=u32::MAX) {
        let snap = FaultSnapshot::from_raw(HFSR_FORCED, cfsr);
        assert_eq!(snap.causes(), snap.causes());
    }

    /// The cause list never exceeds its declared capacity.
    #[test]
    fn cause_count_is_bounded(hfsr in 0u32..=u32::MAX, cfsr in 0u32..=u32::MAX) {
        let snap = FaultSnapshot::from_raw(hfsr, cfsr);
        assert!(snap.causes().len() <= MAX_CAUSES);
    }

    /// Without FORCED, no CFSR residue ever produces a cause.
    #[test]
    fn non_forced_paths_report_nothing(cfsr in 0u32..=u32::MAX) {
        let snap = FaultSnapshot::from_raw(HFSR_VECTTBL, cfsr);
        assert_eq!(snap.path(), FaultPath::VectorTable);
        assert!(snap.causes().is_empty());
    }

    /// A superset of set bits yields a superset of causes (monotonicity):
    /// setting one more bit never removes an existing report.
    #[test]
    fn reporting_is_monotone(cfsr in 0u32..=u32::MAX, extra in 0u32..32u32) {
        let base = FaultSnapshot::from_raw(HFSR_FORCED, cfsr);
        let wider = FaultSnapshot::from_raw(HFSR_FORCED, cfsr | (1 << extra));
        let wider_causes = wider.causes();
        for cause in base.causes() {
            assert!(wider_causes.contains(&cause));
        }
    }
}
