//! Extern boundary to the vendored mesh stack (the "tasklet runtime").
//!
//! The stack is a pre-built C library linked into the firmware image. It
//! owns the event loop, the backhaul data pump, and the dynamic allocator;
//! this layer only feeds it a heap region, registered drivers, and a MAC
//! address, then hands over control. Everything the stack can call back
//! into lives elsewhere (`heap_hooks::mem_fault_hook`,
//! `backhaul_hw::backhaul_link_event`, `exception_handlers::os_error`,
//! `rf::rf_device_register`).
//!
//! Raw externs stay private to this module; the rest of the firmware goes
//! through the safe wrappers, which document the invariants each call
//! relies on.

use platform::heap::MemStats;
use platform::mac::Eui48;

/// The allocator's statistics block, updated in place by the stack.
/// Layout matches the stack's `mem_stat_t`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawMemStats {
    /// Total bytes in the installed region.
    pub heap_sector_size: u32,
    /// Bytes currently allocated.
    pub heap_sector_allocated_bytes: u32,
    /// High-water mark of allocated bytes.
    pub heap_sector_allocated_bytes_max: u32,
    /// Requests the allocator refused.
    pub heap_alloc_fail_cnt: u32,
}

impl From<RawMemStats> for MemStats {
    fn from(raw: RawMemStats) -> Self {
        MemStats {
            heap_size: raw.heap_sector_size,
            allocated_bytes: raw.heap_sector_allocated_bytes,
            max_allocated_bytes: raw.heap_sector_allocated_bytes_max,
            alloc_fail_count: raw.heap_alloc_fail_cnt,
        }
    }
}

extern "C" {
    fn ns_heap_region_install(
        region: *mut u8,
        region_len: usize,
        fault_cb: extern "C" fn(u8) -> !,
        stats: *mut RawMemStats,
    );
    fn slip_device_register(mac: *const u8, baud: u32) -> i8;
    fn eth_phy_device_register(mac: *const u8, status_cb: extern "C" fn(u8, i8));
    fn border_router_tasklet_start();
}

/// Hand the allocator its region, fault callback and statistics block.
///
/// # Safety
///
/// `region` and `stats` must outlive the stack — in practice both are
/// `'static` (the heap array and stats block in `heap_hooks`). Call once,
/// before any stack API that allocates.
pub unsafe fn heap_region_install(
    region: *mut u8,
    region_len: usize,
    fault_cb: extern "C" fn(u8) -> !,
    stats: *mut RawMemStats,
) {
    // SAFETY: forwarded invariants — caller guarantees 'static region and
    // stats, and single installation.
    unsafe { ns_heap_region_install(region, region_len, fault_cb, stats) };
}

/// Register the SLIP-framed serial device under `mac` at `baud`.
///
/// Synchronous: the returned raw id is final (negative = failure). The
/// stack takes over the USART byte pump from its own tasklets after this
/// call; the UART handle must already be parked in `'static` storage.
pub fn register_slip_device(mac: &Eui48, baud: u32) -> i8 {
    let octets = mac.octets();
    // SAFETY: octets lives across the call; the stack copies the 6 bytes
    // before returning.
    unsafe { slip_device_register(octets.as_ptr(), baud) }
}

/// Start Ethernet PHY registration under `mac`.
///
/// Asynchronous: the stack begins auto-negotiation and invokes `status_cb`
/// from its link interrupt context once the PHY settles. The callback must
/// be interrupt-safe and must tolerate being its caller's only signal.
pub fn register_eth_device(mac: &Eui48, status_cb: extern "C" fn(u8, i8)) {
    let octets = mac.octets();
    // SAFETY: octets lives across the call; the stack copies the 6 bytes
    // before auto-negotiation starts.
    unsafe { eth_phy_device_register(octets.as_ptr(), status_cb) };
}

/// Hand control to the mesh stack event loop.
///
/// The tasklet runtime owns the node from here on; bring-up is over.
pub fn tasklet_start() {
    // SAFETY: no arguments, no preconditions beyond heap + driver
    // registration, which the bring-up ordering guarantees.
    unsafe { border_router_tasklet_start() };
}
