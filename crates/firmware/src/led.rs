//! LED indication: activity blinker and the fault indicator path.
//!
//! NUCLEO-H743ZI user LEDs: LD1 (green, PB0), LD2 (yellow, PE1),
//! LD3 (red, PB14). LD1 carries the 500 ms activity blink; a fault freezes
//! the blinker (the scheduler stops) and drives LD1 + LD3 solid — the
//! out-of-band "this node is halted" signal.

use embassy_stm32::gpio::{AnyPin, Output};
use embassy_time::{Duration, Ticker};

use crate::boot::LED_BLINK_MS;

/// Activity blinker: toggle the given LED every [`LED_BLINK_MS`].
///
/// Spawned by the orchestrator when `led_enabled` is set. Runs for the life
/// of the node; a halted node stops blinking because the executor stops,
/// not because this task exits.
#[embassy_executor::task]
pub async fn blink(mut led: Output<'static, AnyPin>) {
    let mut ticker = Ticker::every(Duration::from_millis(LED_BLINK_MS));
    loop {
        led.toggle();
        ticker.next().await;
    }
}

/// Drive LD1 + LD3 active, bypassing the GPIO driver.
///
/// Callable from exception context: raw register writes, no locks, no
/// allocation. Forces both pins to output mode itself so the indicator
/// works even for faults taken before the blinker task configured PB0.
/// GPIO port clocks are enabled by `embassy_stm32::init`, which runs before
/// anything that can fault.
pub fn fault_leds_on() {
    use embassy_stm32::pac::gpio::vals::Moder;
    use embassy_stm32::pac::GPIOB;

    GPIOB.moder().modify(|w| {
        w.set_moder(0, Moder::OUTPUT); // LD1, PB0
        w.set_moder(14, Moder::OUTPUT); // LD3, PB14
    });
    GPIOB.bsrr().write(|w| {
        w.set_bs(0, true);
        w.set_bs(14, true);
    });
}
