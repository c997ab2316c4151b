//! Cortex-M exception handlers for the MeshGate border router.
//!
//! The HardFault handler is a classifier, not a recovery path: it decodes
//! the fault-status registers into categorized causes for diagnostics, then
//! commits the node to a terminal halt. A corrupted machine state cannot be
//! trusted to resume; the only way back is a power-cycle or a
//! debugger-assisted reset.
//!
//! # Handler discipline
//!
//! Handlers run in exception context with interrupts effectively masked.
//! Nothing here allocates, blocks on I/O, or takes a lock — the cause list
//! is a fixed-capacity `heapless::Vec` decoded by `platform::fault`, the
//! LED writes go straight to GPIO set registers, and the terminal state is
//! a bare `wfi` loop.
//!
//! # Hardware-only handler
//!
//! The `#[cortex_m_rt::exception]` attribute requires ARM target intrinsics
//! and is therefore gated behind `#[cfg(feature = "hardware")]`. The module
//! itself (and `HARDFAULT_DEFINED`) compiles unconditionally so host tests
//! can verify the module exists without needing an ARM toolchain; the
//! classification logic itself lives in `platform::fault` and is fully
//! host-tested there.

#![allow(clippy::doc_markdown)] // register names (HFSR, CFSR, VECTTBL) as plain text

/// Marker constant — confirmed by boot tests to verify this module exists.
///
/// When `HARDFAULT_DEFINED` is `true`, the `exception_handlers` module
/// compiled successfully, proving that the HardFault handler (in
/// `#[cfg(feature = "hardware")]` below) will be linked into the firmware
/// binary.
pub const HARDFAULT_DEFINED: bool = true;

/// Terminal halt: park the core in an interrupt-masked wait loop.
///
/// `wfi` rather than a busy spin so a halted node draws microamps instead
/// of milliwatts — it may sit in a ceiling for months before anyone
/// power-cycles it.
#[cfg(feature = "hardware")]
pub fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

/// HardFault exception handler (hardware target only).
///
/// # Behavior
///
/// 1. Drives LD1 + LD3 active as the very first action — the out-of-band
///    signal for benches with no debugger or RTT console attached.
/// 2. Samples SCB HFSR and CFSR exactly once into a
///    [`platform::fault::FaultSnapshot`].
/// 3. Forced (escalated) fault: walks every set sub-fault bit in the fixed
///    MemManage → Bus → Usage order, emitting one defmt error and one
///    breakpoint per bit. Multiple simultaneous bits are each reported —
///    this is diagnostic enumeration, not priority resolution, and debug
///    tooling keys off the halt address of the per-bit breakpoint.
/// 4. Vector-table fault (FORCED clear): reported as its own exclusive
///    path; the CFSR is not consulted.
/// 5. Halts forever. Returning from a HardFault handler is undefined
///    behavior on Cortex-M; the `-> !` return type enforces the commitment.
#[cfg(feature = "hardware")]
#[cortex_m_rt::exception]
#[allow(unsafe_code)]
unsafe fn HardFault(ef: &cortex_m_rt::ExceptionFrame) -> ! {
    use platform::fault::{FaultPath, FaultSnapshot};

    // LEDs first: everything after this point may be printing into the void.
    crate::led::fault_leds_on();

    // SAFETY: read-only sample of the SCB fault-status registers; the
    // exception entry already serialized all prior memory accesses.
    let (hfsr, cfsr) = unsafe {
        let scb = &*cortex_m::peripheral::SCB::PTR;
        (scb.hfsr.read(), scb.cfsr.read())
    };
    let snapshot = FaultSnapshot::from_raw(hfsr, cfsr);

    defmt::error!(
        "HardFault! HFSR={=u32:08x} CFSR={=u32:08x} stacked frame at {=u32:08x}",
        hfsr,
        cfsr,
        ef as *const _ as u32
    );

    match snapshot.path() {
        FaultPath::Forced => {
            for cause in snapshot.causes() {
                defmt::error!("fault cause: {=str}", cause.name());
                // One breakpoint per set bit: a halted debugger lands on the
                // bit being reported.
                cortex_m::asm::bkpt();
            }
        }
        FaultPath::VectorTable => {
            defmt::error!("fault cause: vector table read fault");
            cortex_m::asm::bkpt();
        }
        FaultPath::Unknown => {
            defmt::error!("fault cause: no escalation flag set");
        }
    }

    cortex_m::asm::bkpt();
    halt()
}

/// Fatal error reported by the mesh stack runtime (hardware target only).
///
/// The stack calls this for unrecoverable internal errors (tasklet queue
/// exhaustion, timer subsystem failure). Same terminal contract as the
/// exception handlers: report, trap, halt.
#[cfg(feature = "hardware")]
#[no_mangle]
pub extern "C" fn os_error(error_code: u32) -> ! {
    defmt::error!("stack runtime fatal error {=u32}", error_code);
    crate::led::fault_leds_on();
    cortex_m::asm::bkpt();
    halt()
}
