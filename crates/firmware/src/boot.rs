//! Bring-up sequence data for the MeshGate border router.
//!
//! Order matters and is encoded once, here:
//!   1. Validate the startup configuration (closed sum types, no fallback)
//!   2. Install the heap region + allocator fault hook
//!   3. Provision the device MAC address
//!   4. Start the LED activity blinker (if enabled)
//!   5. Initialize the backhaul driver and wait (bounded) for its status
//!   6. Hand control to the mesh stack tasklet runtime
//!
//! Everything in this module is pure data — host tests assert the ordering
//! and that the shipped configuration actually validates, so a bad default
//! is caught on the development machine, not on a bench board with no RTT
//! attached.

use platform::config::{AppConfig, BackhaulKind, MacSource, RadioKind, SerialConfig};

/// Ordered list of bring-up steps for documentation and testing.
///
/// Tests assert config-before-MAC and backhaul-before-tasklet ordering, and
/// the orchestrator logs each step as it executes.
pub const BRING_UP_STEPS: &[&str] = &[
    "1. Config: validate backhaul/radio/MAC-source selections",
    "2. Heap: install region and allocator fault hook",
    "3. MAC: provision EUI-48 from device UID or fixed config",
    "4. LED: start 500 ms activity blinker (if enabled)",
    "5. Backhaul: construct driver, register with stack, await status",
    "6. Tasklet: hand control to the mesh stack runtime",
];

/// Activity LED half-period. The original bring-up toggled every 500 ms and
/// field tooling recognizes that cadence, so it stays.
pub const LED_BLINK_MS: u64 = 500;

/// Interval between polls of the backhaul status slot.
pub const STATUS_POLL_INTERVAL_MS: u64 = 100;

/// Number of status polls before the orchestrator declares the attempt
/// dead. 300 × 100 ms = 30 s, comfortably past the slowest observed PHY
/// auto-negotiation, and finite so a construction failure (which never
/// produces a status) cannot hang bring-up forever.
pub const STATUS_POLL_BUDGET: usize = 300;

/// Bytes handed to the mesh stack allocator at startup.
pub const HEAP_BYTES: usize = 64 * 1024;

/// Startup configuration for the shipped NUCLEO-H743ZI build.
///
/// Ethernet backhaul over the on-board RMII PHY, AT86RF233 mesh radio on
/// the Arduino SPI header, MAC derived from the silicon UID. The serial
/// section is populated so flipping `backhaul` to `FramedSerial` is a
/// one-field change.
pub const fn app_config() -> AppConfig {
    AppConfig {
        backhaul: BackhaulKind::Ethernet,
        radio: RadioKind::At86rf233,
        mac_source: MacSource::DeviceUid,
        serial: Some(SerialConfig {
            baud: 115_200,
            hw_flow_control: false,
        }),
        led_enabled: true,
        heap_bytes: HEAP_BYTES,
    }
}

// ── RCC clock configuration ───────────────────────────────────────────────────

/// Build the `embassy_stm32::Config` with the RCC settings for this board.
///
/// # Clock Tree (HSI → 400 MHz core)
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB1/2/3/4:    DIV2 → 100 MHz
///
/// The RMII reference clock comes from the on-board 50 MHz oscillator, not
/// the RCC, so no PLL branch is dedicated to Ethernet. The mesh radio SPI
/// runs from the APB kernel clocks.
///
/// Always call `embassy_stm32::init(build_embassy_config())` from `main.rs`;
/// `Default::default()` boots at HSI 64 MHz and the stack's timing
/// assumptions (tasklet tick, SLIP baud divisors) are calibrated for 400.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // HSI: 64 MHz internal oscillator (no prescaler)
    config.rcc.hsi = Some(HSIPrescaler::DIV1);

    // PLL1: HSI (64 MHz) / prediv(4) = 16 MHz → × mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz → system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2), // 400 MHz — system clock
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_validates() {
        app_config()
            .validate()
            .expect("the shipped default configuration must pass validation");
    }

    #[test]
    fn test_bring_up_order_config_before_mac() {
        let config_idx = step_index("Config");
        let mac_idx = step_index("MAC");
        assert!(
            config_idx < mac_idx,
            "configuration must be validated before MAC provisioning"
        );
    }

    #[test]
    fn test_bring_up_order_heap_before_backhaul() {
        assert!(
            step_index("Heap") < step_index("Backhaul"),
            "the stack allocator must exist before any driver registers"
        );
    }

    #[test]
    fn test_bring_up_order_backhaul_before_tasklet() {
        assert!(
            step_index("Backhaul") < step_index("Tasklet"),
            "the tasklet runtime consumes the driver handle; backhaul goes first"
        );
    }

    #[test]
    fn test_status_wait_is_bounded_and_generous() {
        let window_ms = (STATUS_POLL_BUDGET as u64) * STATUS_POLL_INTERVAL_MS;
        assert!(window_ms >= 10_000, "PHY negotiation can take seconds");
        assert!(window_ms <= 60_000, "bring-up must not hang unbounded");
    }

    #[test]
    fn test_shipped_serial_section_flips_cleanly() {
        // The default keeps serial parameters around so switching the
        // backhaul variant is a one-field change; that flipped config must
        // also validate.
        let mut config = app_config();
        config.backhaul = platform::config::BackhaulKind::FramedSerial;
        config.validate().expect("framed-serial flip must validate");
    }

    #[test]
    fn test_hardfault_handler_module_present() {
        assert!(crate::exception_handlers::HARDFAULT_DEFINED);
    }

    fn step_index(keyword: &str) -> usize {
        BRING_UP_STEPS
            .iter()
            .position(|s| s.contains(keyword))
            .unwrap_or_else(|| panic!("step containing {keyword:?} required"))
    }
}
