//! ARMv7-M fault-status decoding.
//!
//! The HardFault handler in the firmware crate samples SCB->HFSR and
//! SCB->CFSR exactly once on exception entry and hands the raw words to
//! these types. Everything here is integer math on the sampled values, so
//! the full classifier is exercised by host tests with synthetic registers —
//! no board required to verify the decode table.
//!
//! Bit positions follow the ARMv7-M Architecture Reference Manual (DDI0403E
//! §B3.2.15–B3.2.17): CFSR packs MMFSR (bits 0–7), BFSR (bits 8–15) and
//! UFSR (bits 16–31); HFSR carries the escalation flags.

use heapless::Vec;

/// HardFault Status Register (SCB->HFSR) sampled at exception entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hfsr(pub u32);

impl Hfsr {
    const VECTTBL: u32 = 1 << 1;
    const FORCED: u32 = 1 << 30;
    const DEBUGEVT: u32 = 1 << 31;

    /// A configurable-priority fault escalated to HardFault.
    pub fn forced(self) -> bool {
        self.0 & Self::FORCED != 0
    }

    /// Bus fault on a vector table read during exception processing.
    pub fn vector_table_fault(self) -> bool {
        self.0 & Self::VECTTBL != 0
    }

    /// Debug event while halting debug was disabled.
    pub fn debug_event(self) -> bool {
        self.0 & Self::DEBUGEVT != 0
    }
}

/// Configurable Fault Status Register (SCB->CFSR) sampled at exception entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cfsr(pub u32);

#[allow(missing_docs)] // predicate names are the register bit names
impl Cfsr {
    // MemManage Fault Status Register, CFSR[7:0]
    const IACCVIOL: u32 = 1 << 0;
    const DACCVIOL: u32 = 1 << 1;
    const MUNSTKERR: u32 = 1 << 3;
    const MSTKERR: u32 = 1 << 4;
    const MLSPERR: u32 = 1 << 5;
    const MMARVALID: u32 = 1 << 7;
    // Bus Fault Status Register, CFSR[15:8]
    const IBUSERR: u32 = 1 << 8;
    const PRECISERR: u32 = 1 << 9;
    const IMPRECISERR: u32 = 1 << 10;
    const UNSTKERR: u32 = 1 << 11;
    const STKERR: u32 = 1 << 12;
    const LSPERR: u32 = 1 << 13;
    const BFARVALID: u32 = 1 << 15;
    // Usage Fault Status Register, CFSR[31:16]
    const UNDEFINSTR: u32 = 1 << 16;
    const INVSTATE: u32 = 1 << 17;
    const INVPC: u32 = 1 << 18;
    const NOCP: u32 = 1 << 19;
    const UNALIGNED: u32 = 1 << 24;
    const DIVBYZERO: u32 = 1 << 25;

    pub fn iaccviol(self) -> bool {
        self.0 & Self::IACCVIOL != 0
    }
    pub fn daccviol(self) -> bool {
        self.0 & Self::DACCVIOL != 0
    }
    pub fn munstkerr(self) -> bool {
        self.0 & Self::MUNSTKERR != 0
    }
    pub fn mstkerr(self) -> bool {
        self.0 & Self::MSTKERR != 0
    }
    pub fn mlsperr(self) -> bool {
        self.0 & Self::MLSPERR != 0
    }
    pub fn mmarvalid(self) -> bool {
        self.0 & Self::MMARVALID != 0
    }
    pub fn ibuserr(self) -> bool {
        self.0 & Self::IBUSERR != 0
    }
    pub fn preciserr(self) -> bool {
        self.0 & Self::PRECISERR != 0
    }
    pub fn impreciserr(self) -> bool {
        self.0 & Self::IMPRECISERR != 0
    }
    pub fn unstkerr(self) -> bool {
        self.0 & Self::UNSTKERR != 0
    }
    pub fn stkerr(self) -> bool {
        self.0 & Self::STKERR != 0
    }
    pub fn lsperr(self) -> bool {
        self.0 & Self::LSPERR != 0
    }
    pub fn bfarvalid(self) -> bool {
        self.0 & Self::BFARVALID != 0
    }
    pub fn undefinstr(self) -> bool {
        self.0 & Self::UNDEFINSTR != 0
    }
    pub fn invstate(self) -> bool {
        self.0 & Self::INVSTATE != 0
    }
    pub fn invpc(self) -> bool {
        self.0 & Self::INVPC != 0
    }
    pub fn nocp(self) -> bool {
        self.0 & Self::NOCP != 0
    }
    pub fn unaligned(self) -> bool {
        self.0 & Self::UNALIGNED != 0
    }
    pub fn divbyzero(self) -> bool {
        self.0 & Self::DIVBYZERO != 0
    }

    /// The MemManage sub-register byte, CFSR[7:0].
    pub fn mem_faults(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// The BusFault sub-register byte, CFSR[15:8].
    pub fn bus_faults(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// The UsageFault sub-register halfword, CFSR[31:16] (12 defined bits).
    pub fn usage_faults(self) -> u16 {
        ((self.0 >> 16) & 0x0FFF) as u16
    }
}

/// One reportable fault-status bit.
///
/// Variants are ordered the way the classifier tests them; see
/// [`FaultSnapshot::causes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCause {
    /// MMFAR holds the faulting address (reported alongside the violation).
    MemAddrValid,
    /// MemManage fault during lazy FP state preservation.
    MemLazyFpError,
    /// MemManage fault on exception entry stacking.
    MemStackingError,
    /// MemManage fault on exception return unstacking.
    MemUnstackingError,
    /// Data access violation.
    DataAccessViolation,
    /// Instruction access violation.
    InstructionAccessViolation,
    /// BFAR holds the faulting address (reported alongside the bus error).
    BusAddrValid,
    /// Bus fault during lazy FP state preservation.
    BusLazyFpError,
    /// Bus fault on exception entry stacking.
    BusStackingError,
    /// Bus fault on exception return unstacking.
    BusUnstackingError,
    /// Imprecise (asynchronous) data bus error.
    ImpreciseDataBusError,
    /// Precise data bus error.
    PreciseDataBusError,
    /// Instruction bus error.
    InstructionBusError,
    /// SDIV/UDIV with divisor of zero (CCR.DIV_0_TRP enabled).
    DivideByZero,
    /// Unaligned access (CCR.UNALIGN_TRP enabled).
    UnalignedAccess,
    /// Coprocessor instruction with no coprocessor present.
    NoCoprocessor,
    /// Invalid PC load on exception return.
    InvalidPc,
    /// Invalid EPSR state (e.g. Thumb bit clear).
    InvalidState,
    /// Undefined instruction.
    UndefinedInstruction,
}

impl FaultCause {
    /// Short diagnostic name for fault reports.
    pub fn name(self) -> &'static str {
        match self {
            FaultCause::MemAddrValid => "mmar-valid",
            FaultCause::MemLazyFpError => "mem-lazy-fp",
            FaultCause::MemStackingError => "mem-stacking",
            FaultCause::MemUnstackingError => "mem-unstacking",
            FaultCause::DataAccessViolation => "data-access-violation",
            FaultCause::InstructionAccessViolation => "instr-access-violation",
            FaultCause::BusAddrValid => "bfar-valid",
            FaultCause::BusLazyFpError => "bus-lazy-fp",
            FaultCause::BusStackingError => "bus-stacking",
            FaultCause::BusUnstackingError => "bus-unstacking",
            FaultCause::ImpreciseDataBusError => "imprecise-bus-error",
            FaultCause::PreciseDataBusError => "precise-bus-error",
            FaultCause::InstructionBusError => "instr-bus-error",
            FaultCause::DivideByZero => "divide-by-zero",
            FaultCause::UnalignedAccess => "unaligned-access",
            FaultCause::NoCoprocessor => "no-coprocessor",
            FaultCause::InvalidPc => "invalid-pc",
            FaultCause::InvalidState => "invalid-state",
            FaultCause::UndefinedInstruction => "undefined-instruction",
        }
    }
}

/// Number of reportable CFSR bits; capacity of the cause list.
pub const MAX_CAUSES: usize = 19;

/// Top-level classification of a HardFault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultPath {
    /// Escalated configurable fault — enumerate CFSR bits.
    Forced,
    /// Vector table read fault — CFSR is not consulted.
    VectorTable,
    /// Neither escalation flag set (e.g. debug event); nothing to decode.
    Unknown,
}

/// The fault-status registers sampled once on exception entry.
///
/// Immutable for the lifetime of the handler invocation; never persisted
/// past the halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultSnapshot {
    /// HardFault status word.
    pub hfsr: Hfsr,
    /// Configurable fault status word.
    pub cfsr: Cfsr,
}

impl FaultSnapshot {
    /// Build a snapshot from raw register words.
    pub const fn from_raw(hfsr: u32, cfsr: u32) -> Self {
        FaultSnapshot {
            hfsr: Hfsr(hfsr),
            cfsr: Cfsr(cfsr),
        }
    }

    /// Top-level path. FORCED is tested first; the vector-table path is
    /// taken only when FORCED is clear.
    pub fn path(&self) -> FaultPath {
        if self.hfsr.forced() {
            FaultPath::Forced
        } else if self.hfsr.vector_table_fault() {
            FaultPath::VectorTable
        } else {
            FaultPath::Unknown
        }
    }

    /// Enumerate every set sub-fault bit, in the fixed reporting order:
    /// the MemManage block, then the Bus block, then the Usage block.
    ///
    /// This is a diagnostic enumeration, not a priority resolution —
    /// multiple simultaneous bits each produce their own entry, and the
    /// walk never exits early. Non-forced paths report no causes (the CFSR
    /// is meaningless for a vector-table fault).
    pub fn causes(&self) -> Vec<FaultCause, MAX_CAUSES> {
        let mut causes = Vec::new();
        if self.path() != FaultPath::Forced {
            return causes;
        }

        let tests: [(bool, FaultCause); MAX_CAUSES] = [
            (self.cfsr.mmarvalid(), FaultCause::MemAddrValid),
            (self.cfsr.mlsperr(), FaultCause::MemLazyFpError),
            (self.cfsr.mstkerr(), FaultCause::MemStackingError),
            (self.cfsr.munstkerr(), FaultCause::MemUnstackingError),
            (self.cfsr.daccviol(), FaultCause::DataAccessViolation),
            (self.cfsr.iaccviol(), FaultCause::InstructionAccessViolation),
            (self.cfsr.bfarvalid(), FaultCause::BusAddrValid),
            (self.cfsr.lsperr(), FaultCause::BusLazyFpError),
            (self.cfsr.stkerr(), FaultCause::BusStackingError),
            (self.cfsr.unstkerr(), FaultCause::BusUnstackingError),
            (self.cfsr.impreciserr(), FaultCause::ImpreciseDataBusError),
            (self.cfsr.preciserr(), FaultCause::PreciseDataBusError),
            (self.cfsr.ibuserr(), FaultCause::InstructionBusError),
            (self.cfsr.divbyzero(), FaultCause::DivideByZero),
            (self.cfsr.unaligned(), FaultCause::UnalignedAccess),
            (self.cfsr.nocp(), FaultCause::NoCoprocessor),
            (self.cfsr.invpc(), FaultCause::InvalidPc),
            (self.cfsr.invstate(), FaultCause::InvalidState),
            (self.cfsr.undefinstr(), FaultCause::UndefinedInstruction),
        ];

        for (set, cause) in tests {
            if set {
                // Capacity equals the number of tests; push cannot fail.
                let _ = causes.push(cause);
            }
        }
        causes
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    const HFSR_FORCED: u32 = 1 << 30;
    const HFSR_VECTTBL: u32 = 1 << 1;

    #[test]
    fn test_forced_divbyzero_reports_exactly_that_cause() {
        let snap = FaultSnapshot::from_raw(HFSR_FORCED, 1 << 25);
        assert_eq!(snap.path(), FaultPath::Forced);
        let causes = snap.causes();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0], FaultCause::DivideByZero);
    }

    #[test]
    fn test_simultaneous_bus_and_usage_bits_both_reported() {
        // precise bus error (bit 9) + undefined instruction (bit 16)
        let snap = FaultSnapshot::from_raw(HFSR_FORCED, (1 << 9) | (1 << 16));
        let causes = snap.causes();
        assert!(causes.contains(&FaultCause::PreciseDataBusError));
        assert!(causes.contains(&FaultCause::UndefinedInstruction));
        assert_eq!(causes.len(), 2, "only the two set bits may be reported");
    }

    #[test]
    fn test_vecttbl_without_forced_takes_vector_table_path() {
        // CFSR residue must be ignored on the vector-table path.
        let snap = FaultSnapshot::from_raw(HFSR_VECTTBL, 1 << 25);
        assert_eq!(snap.path(), FaultPath::VectorTable);
        assert!(snap.causes().is_empty());
    }

    #[test]
    fn test_forced_wins_over_vecttbl_when_both_set() {
        let snap = FaultSnapshot::from_raw(HFSR_FORCED | HFSR_VECTTBL, 0);
        assert_eq!(snap.path(), FaultPath::Forced);
    }

    #[test]
    fn test_no_flags_is_unknown_path() {
        let snap = FaultSnapshot::from_raw(0, 0);
        assert_eq!(snap.path(), FaultPath::Unknown);
        assert!(snap.causes().is_empty());
    }

    #[test]
    fn test_reporting_order_mem_then_bus_then_usage() {
        // stacking error in each block: MSTKERR (4), STKERR (12), INVSTATE (17)
        let snap = FaultSnapshot::from_raw(HFSR_FORCED, (1 << 4) | (1 << 12) | (1 << 17));
        let causes = snap.causes();
        assert_eq!(
            causes.as_slice(),
            &[
                FaultCause::MemStackingError,
                FaultCause::BusStackingError,
                FaultCause::InvalidState,
            ]
        );
    }

    #[test]
    fn test_all_reportable_bits_fit_the_vec() {
        let all = (1 << 0)
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
        let snap = FaultSnapshot::from_raw(HFSR_FORCED, all);
        assert_eq!(snap.causes().len(), MAX_CAUSES);
    }

    #[test]
    fn test_sub_register_extraction() {
        let cfsr = Cfsr(0x0200_1282);
        assert_eq!(cfsr.mem_faults(), 0x82);
        assert_eq!(cfsr.bus_faults(), 0x12);
        assert_eq!(cfsr.usage_faults(), 0x200);
    }

    #[test]
    fn test_hfsr_debug_event_is_not_forced() {
        let hfsr = Hfsr(1 << 31);
        assert!(hfsr.debug_event());
        assert!(!hfsr.forced());
        assert!(!hfsr.vector_table_fault());
    }
}
