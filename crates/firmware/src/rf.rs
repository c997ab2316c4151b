//! Mesh radio PHY selection and the stack-facing registration surface.
//!
//! The tasklet runtime drives radio bring-up itself: during its own startup
//! it calls `rf_device_register()` and `rf_read_mac_address()` back into
//! this layer. All this module does is pin down *which* vendor PHY driver
//! those calls reach — one closed [`RadioKind`] selection made by the
//! orchestrator before the stack starts — and forward to it.

use core::cell::Cell;

use critical_section::Mutex;
use platform::config::RadioKind;

// Vendor PHY driver libraries, linked per board build. Each `register`
// brings the transceiver out of reset on its SPI bus and registers it with
// the stack's PHY layer; `read_mac` returns the radio's own EUI-64-derived
// address, distinct from the backhaul MAC.
extern "C" {
    fn rf_phy_at86rf233_register() -> i8;
    fn rf_phy_mcr20a_register() -> i8;
    fn rf_phy_s2lp_register() -> i8;
    fn rf_phy_efr32_register() -> i8;
    fn rf_phy_read_mac(mac_out: *mut u8);
}

/// No radio selected yet: registration attempts fail with the stack's
/// "driver unavailable" convention (negative result).
const RF_NOT_SELECTED: i8 = -1;

static SELECTED: Mutex<Cell<Option<RadioKind>>> = Mutex::new(Cell::new(None));

/// Record the configured radio family. Called once by the orchestrator,
/// before [`crate::stack::tasklet_start`] — the stack may call
/// [`rf_device_register`] at any point after that.
pub fn select_radio(kind: RadioKind) {
    defmt::info!("mesh radio: {=str}", kind.driver_name());
    critical_section::with(|cs| SELECTED.borrow(cs).set(Some(kind)));
}

/// Radio registration entry point, called by the stack runtime during its
/// bring-up. Negative result = failure, per the stack's convention.
#[no_mangle]
pub extern "C" fn rf_device_register() -> i8 {
    let kind = critical_section::with(|cs| SELECTED.borrow(cs).get());
    let result = match kind {
        // SAFETY: plain FFI calls into the linked vendor drivers; each is
        // documented to be callable once from stack bring-up context.
        Some(RadioKind::At86rf233) => unsafe { rf_phy_at86rf233_register() },
        Some(RadioKind::Mcr20a) => unsafe { rf_phy_mcr20a_register() },
        Some(RadioKind::S2lp) => unsafe { rf_phy_s2lp_register() },
        Some(RadioKind::Efr32) => unsafe { rf_phy_efr32_register() },
        None => RF_NOT_SELECTED,
    };
    if result < 0 {
        defmt::error!("radio registration failed, retval = {=i8}", result);
    }
    result
}

/// Copy the radio's 6-byte MAC address into `mac_out`, called by the stack
/// runtime after successful registration.
///
/// # Safety
///
/// `mac_out` must point to at least 6 writable bytes; the stack passes a
/// buffer it owns for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn rf_read_mac_address(mac_out: *mut u8) {
    // SAFETY: forwarded contract — the active PHY driver writes exactly 6
    // bytes through the stack-owned pointer.
    unsafe { rf_phy_read_mac(mac_out) };
}
