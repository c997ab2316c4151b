//! Heap region installation, allocator fault hook, and statistics report.
//!
//! The mesh stack allocates from a static region this module owns. Two
//! things come back across the boundary: a fault callback on detected
//! corruption/misuse (classified and followed by a permanent halt — the
//! heap cannot be trusted afterwards, so there is nothing to recover), and
//! a statistics block reported once after bring-up for bench diagnostics.

use core::cell::UnsafeCell;

use platform::heap::{HeapFaultEvent, MemStats};

use crate::boot::HEAP_BYTES;
use crate::stack::{self, RawMemStats};

/// The allocator's region. `UnsafeCell` because the stack writes through
/// the raw pointer we hand it; no Rust reference to the contents exists
/// after installation.
struct HeapRegion(UnsafeCell<[u8; HEAP_BYTES]>);

// SAFETY: the region is handed to the stack once, before tasklets start,
// and never touched from Rust again.
unsafe impl Sync for HeapRegion {}

struct StatsBlock(UnsafeCell<RawMemStats>);

// SAFETY: written by the stack; read from Rust only via volatile copy in
// `report_stats`.
unsafe impl Sync for StatsBlock {}

static HEAP_REGION: HeapRegion = HeapRegion(UnsafeCell::new([0; HEAP_BYTES]));
static STATS_BLOCK: StatsBlock = StatsBlock(UnsafeCell::new(RawMemStats {
    heap_sector_size: 0,
    heap_sector_allocated_bytes: 0,
    heap_sector_allocated_bytes_max: 0,
    heap_alloc_fail_cnt: 0,
}));

/// Install the heap region and fault hook with the stack allocator.
///
/// `heap_bytes` comes from the validated configuration and must not exceed
/// the static region; the excess case is a configuration bug, reported and
/// clamped rather than handed to the allocator as memory that does not
/// exist.
pub fn install(heap_bytes: usize) {
    let len = if heap_bytes > HEAP_BYTES {
        defmt::warn!(
            "configured heap {=usize} exceeds static region, clamping to {=usize}",
            heap_bytes,
            HEAP_BYTES
        );
        HEAP_BYTES
    } else {
        heap_bytes
    };

    defmt::info!("installing {=usize} byte heap region", len);
    // SAFETY: both statics are 'static and handed over exactly once, from
    // the single-threaded bring-up path before any tasklet runs.
    unsafe {
        stack::heap_region_install(
            HEAP_REGION.0.get().cast::<u8>(),
            len,
            mem_fault_hook,
            STATS_BLOCK.0.get(),
        );
    }
}

/// Allocator fault callback. The `-> !` return type encodes the contract:
/// a heap that has faulted is never handed back to the allocator.
///
/// Classifies the event code into one of the six misuse categories, emits
/// one diagnostic report, and halts. Runs in whatever context the
/// allocator detected the fault — possibly an interrupt — so it must not
/// allocate, block, or lock, and it does none of those.
pub extern "C" fn mem_fault_hook(code: u8) -> ! {
    match HeapFaultEvent::from_code(code) {
        Some(event) => defmt::error!(
            "heap fault {=u8}: {=str}",
            event.code(),
            event.description()
        ),
        None => defmt::error!("heap fault with unknown code {=u8}", code),
    }
    crate::led::fault_leds_on();
    crate::exception_handlers::halt()
}

/// Report a coherent snapshot of the allocator's statistics.
pub fn report_stats() {
    // SAFETY: volatile copy of a block the stack updates in place; a copy
    // keeps the four counters coherent within one report.
    let raw = unsafe { core::ptr::read_volatile(STATS_BLOCK.0.get()) };
    let stats = MemStats::from(raw);
    defmt::info!(
        "heap: size={=u32} allocated={=u32} max={=u32} failures={=u32}",
        stats.heap_size,
        stats.allocated_bytes,
        stats.max_allocated_bytes,
        stats.alloc_fail_count
    );
    if stats.has_failures() {
        defmt::warn!("allocator has refused requests; heap may be undersized");
    }
}
