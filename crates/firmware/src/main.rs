//! MeshGate border router firmware entry point.
//!
//! Bring-up runs the fixed sequence in [`firmware::boot::BRING_UP_STEPS`]:
//! validate configuration, install the mesh stack heap, provision the MAC
//! address, start the activity LED, bring up the backhaul, then hand the
//! node to the stack's tasklet runtime. Anything unrecoverable along the
//! way reports once over defmt and halts with the fault LEDs lit.

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use firmware::{backhaul_hw, boot, exception_handlers, heap_hooks, led, rf, stack};
use platform::config::BackhaulKind;
use platform::mac;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("MeshGate border router v{=str}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(boot::build_embassy_config());

    let config = match boot::app_config().validate() {
        Ok(validated) => validated,
        Err(err) => {
            defmt::error!("configuration rejected: {}", err);
            led::fault_leds_on();
            exception_handlers::halt()
        }
    };
    let app = *config.get();

    heap_hooks::install(app.heap_bytes);

    let mac = mac::provision(&app.mac_source, Some(&device_uid()));
    if mac.is_suspect() {
        // Blank OTP benches still boot; the address just will not be unique.
        defmt::warn!("device UID unavailable, using zero-filled MAC address");
    }
    let octets = mac.octets();
    defmt::info!("backhaul MAC {=[u8; 6]:02x}", octets);

    if app.led_enabled {
        let ld1 = Output::new(p.PB0, Level::Low, Speed::Low).degrade();
        if spawner.spawn(led::blink(ld1)).is_err() {
            defmt::warn!("activity blinker not started");
        }
    }

    rf::select_radio(app.radio);

    let mut transport = match app.backhaul {
        BackhaulKind::FramedSerial => {
            // Validation guarantees serial parameters for this backhaul.
            let Some(serial) = config.serial() else {
                defmt::error!("serial parameters missing after validation");
                led::fault_leds_on();
                exception_handlers::halt()
            };
            backhaul_hw::BackhaulTransport::Slip(backhaul_hw::SlipSerialTransport::new(
                serial, p.USART3, p.PD8, p.PD9, p.PD12, p.PD11,
            ))
        }
        BackhaulKind::Ethernet => {
            backhaul_hw::BackhaulTransport::Eth(backhaul_hw::EthTransport::new(
                p.ETH, p.PA1, p.PA2, p.PA7, p.PC1, p.PC4, p.PC5, p.PB13, p.PG11, p.PG13,
            ))
        }
    };

    match backhaul_hw::bring_up(&mut transport, &mac).await {
        Some(event) if event.link_up() => {
            defmt::info!("backhaul up, driver handle {=i8}", event.handle().raw());
        }
        Some(_) => {
            defmt::error!("backhaul link down after registration");
            led::fault_leds_on();
            exception_handlers::halt()
        }
        None => {
            defmt::error!("no backhaul status within the bring-up window");
            led::fault_leds_on();
            exception_handlers::halt()
        }
    }

    heap_hooks::report_stats();

    defmt::info!("starting border router tasklet");
    stack::tasklet_start();
    // The tasklet runtime owns the node from here; this task's job is done
    // and the executor keeps the blinker and stack interrupts serviced.
}

/// The 96-bit device unique ID from system memory (RM0433 §61.1).
fn device_uid() -> [u8; 12] {
    const UID_BASE: *const u8 = 0x1FF1_E800 as *const u8;
    let mut uid = [0u8; 12];
    for (i, byte) in uid.iter_mut().enumerate() {
        // SAFETY: the UID words are read-only system memory on this part,
        // valid for the 12 bytes starting at UID_BASE.
        *byte = unsafe { core::ptr::read_volatile(UID_BASE.add(i)) };
    }
    uid
}
