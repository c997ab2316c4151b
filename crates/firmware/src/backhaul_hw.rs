//! Hardware backhaul transports and the bring-up entry point.
//!
//! Two transports exist on this board: a SLIP-framed serial link on USART3
//! and the on-board RMII Ethernet PHY. Construction claims the pins and
//! parks driver storage; registration hands the device to the mesh stack
//! under the provisioned MAC. Ethernet registration completes out of line —
//! the stack reports the auto-negotiation result through
//! [`backhaul_link_event`] from its link interrupt — so the protocol state
//! lives in critical-section mutexes shared between the async bring-up task
//! and that interrupt.

use core::cell::RefCell;

use backhaul::{
    BringUp, Completion, ConstructError, InitError, InitState, Initializer, StatusEvent,
    Transport,
};
use critical_section::Mutex;
use embassy_stm32::dma::NoDma;
use embassy_stm32::usart::{Config as UsartConfig, Uart};
use embassy_stm32::{bind_interrupts, peripherals, usart};
use embassy_time::Timer;
use platform::config::SerialConfig;
use platform::mac::Eui48;
use static_cell::StaticCell;

use crate::boot::{STATUS_POLL_BUDGET, STATUS_POLL_INTERVAL_MS};
use crate::stack;

static INITIALIZER: Mutex<RefCell<Initializer>> = Mutex::new(RefCell::new(Initializer::new()));
static COMPLETION: Mutex<RefCell<Completion>> = Mutex::new(RefCell::new(Completion::new()));

bind_interrupts!(struct Irqs {
    USART3 => usart::InterruptHandler<peripherals::USART3>;
});

/// The configured USART parked for the stack's byte pump. One slot: a
/// second construction attempt maps to an allocation failure.
static SLIP_UART: StaticCell<Uart<'static, peripherals::USART3, NoDma, NoDma>> =
    StaticCell::new();

struct SlipPins {
    usart: peripherals::USART3,
    tx: peripherals::PD8,
    rx: peripherals::PD9,
    rts: peripherals::PD12,
    cts: peripherals::PD11,
}

/// SLIP-framed serial backhaul on USART3 (the ST-LINK VCP pins).
pub struct SlipSerialTransport {
    serial: SerialConfig,
    pins: Option<SlipPins>,
}

impl SlipSerialTransport {
    /// Take ownership of the USART and its pins; nothing is configured
    /// until [`Transport::construct`].
    pub fn new(
        serial: SerialConfig,
        usart: peripherals::USART3,
        tx: peripherals::PD8,
        rx: peripherals::PD9,
        rts: peripherals::PD12,
        cts: peripherals::PD11,
    ) -> Self {
        SlipSerialTransport {
            serial,
            pins: Some(SlipPins {
                usart,
                tx,
                rx,
                rts,
                cts,
            }),
        }
    }
}

impl Transport for SlipSerialTransport {
    fn construct(&mut self) -> Result<(), ConstructError> {
        let pins = self.pins.take().ok_or(ConstructError::AllocationFailed)?;

        let mut config = UsartConfig::default();
        config.baudrate = self.serial.baud;

        let uart = if self.serial.hw_flow_control {
            Uart::new_with_rtscts(
                pins.usart, pins.rx, pins.tx, Irqs, pins.rts, pins.cts, NoDma, NoDma, config,
            )
        } else {
            Uart::new(pins.usart, pins.rx, pins.tx, Irqs, NoDma, NoDma, config)
        }
        .map_err(|_| ConstructError::InvalidConfiguration)?;

        // The stack pumps bytes through the peripheral registers directly;
        // the handle only has to stay alive (and owned) somewhere 'static.
        SLIP_UART
            .try_init(uart)
            .map(|_| ())
            .ok_or(ConstructError::AllocationFailed)
    }

    fn bring_up(&mut self, mac: &Eui48) -> BringUp {
        BringUp::Immediate(stack::register_slip_device(mac, self.serial.baud))
    }
}

/// The RMII pin set for the on-board LAN8742 PHY. Held for ownership: the
/// stack's MAC driver does its own alternate-function muxing, but claiming
/// the pins here keeps the rest of the firmware from configuring them.
struct RmiiPins {
    _eth: peripherals::ETH,
    _ref_clk: peripherals::PA1,
    _mdio: peripherals::PA2,
    _crs_dv: peripherals::PA7,
    _mdc: peripherals::PC1,
    _rxd0: peripherals::PC4,
    _rxd1: peripherals::PC5,
    _txd1: peripherals::PB13,
    _tx_en: peripherals::PG11,
    _txd0: peripherals::PG13,
}

static RMII_PINS: StaticCell<RmiiPins> = StaticCell::new();

/// RMII Ethernet backhaul through the stack's own MAC driver.
pub struct EthTransport {
    pins: Option<RmiiPins>,
}

impl EthTransport {
    /// Take ownership of the MAC peripheral and the RMII pin set.
    #[allow(clippy::too_many_arguments)] // one parameter per claimed pin
    pub fn new(
        eth: peripherals::ETH,
        ref_clk: peripherals::PA1,
        mdio: peripherals::PA2,
        crs_dv: peripherals::PA7,
        mdc: peripherals::PC1,
        rxd0: peripherals::PC4,
        rxd1: peripherals::PC5,
        txd1: peripherals::PB13,
        tx_en: peripherals::PG11,
        txd0: peripherals::PG13,
    ) -> Self {
        EthTransport {
            pins: Some(RmiiPins {
                _eth: eth,
                _ref_clk: ref_clk,
                _mdio: mdio,
                _crs_dv: crs_dv,
                _mdc: mdc,
                _rxd0: rxd0,
                _rxd1: rxd1,
                _txd1: txd1,
                _tx_en: tx_en,
                _txd0: txd0,
            }),
        }
    }
}

impl Transport for EthTransport {
    fn construct(&mut self) -> Result<(), ConstructError> {
        let pins = self.pins.take().ok_or(ConstructError::AllocationFailed)?;
        RMII_PINS
            .try_init(pins)
            .map(|_| ())
            .ok_or(ConstructError::AllocationFailed)
    }

    fn bring_up(&mut self, mac: &Eui48) -> BringUp {
        stack::register_eth_device(mac, backhaul_link_event);
        BringUp::Deferred
    }
}

/// The board's backhaul, one of the two transports. Selection happens once
/// at startup from the validated configuration; the match in each method is
/// exhaustive, so adding a transport without wiring it up will not compile.
pub enum BackhaulTransport {
    /// SLIP-framed serial on USART3.
    Slip(SlipSerialTransport),
    /// RMII Ethernet through the stack's MAC driver.
    Eth(EthTransport),
}

impl Transport for BackhaulTransport {
    fn construct(&mut self) -> Result<(), ConstructError> {
        match self {
            BackhaulTransport::Slip(t) => t.construct(),
            BackhaulTransport::Eth(t) => t.construct(),
        }
    }

    fn bring_up(&mut self, mac: &Eui48) -> BringUp {
        match self {
            BackhaulTransport::Slip(t) => t.bring_up(mac),
            BackhaulTransport::Eth(t) => t.bring_up(mac),
        }
    }
}

/// Run the backhaul bring-up attempt to a status, or to a timeout.
///
/// Drives the [`Initializer`] over the selected transport, then waits up to
/// [`STATUS_POLL_BUDGET`] × [`STATUS_POLL_INTERVAL_MS`] for the status
/// event. `None` means no status will ever arrive: construction failed, or
/// Ethernet auto-negotiation never reported back within the window. The
/// caller decides what a dead backhaul means for the node.
pub async fn bring_up(transport: &mut BackhaulTransport, mac: &Eui48) -> Option<StatusEvent> {
    let started = critical_section::with(|cs| {
        let mut init = INITIALIZER.borrow_ref_mut(cs);
        init.initialize(transport, mac, |event| {
            resolve_completion(cs, event);
        })
    });

    match started {
        Ok(InitState::AwaitingResult) => {
            defmt::info!("backhaul registered, awaiting link status");
        }
        Ok(state) => {
            defmt::info!("backhaul registration settled immediately: {}", state);
            return poll_completion();
        }
        Err(InitError::Construction(cause)) => {
            defmt::error!("backhaul driver construction failed: {}", cause);
            return None;
        }
        Err(err) => {
            defmt::error!("backhaul init protocol violation: {}", err);
            return None;
        }
    }

    for _ in 0..STATUS_POLL_BUDGET {
        if let Some(event) = poll_completion() {
            return Some(event);
        }
        Timer::after_millis(STATUS_POLL_INTERVAL_MS).await;
    }
    poll_completion()
}

fn poll_completion() -> Option<StatusEvent> {
    critical_section::with(|cs| COMPLETION.borrow_ref(cs).poll())
}

fn resolve_completion(cs: critical_section::CriticalSection<'_>, event: StatusEvent) {
    if COMPLETION.borrow_ref_mut(cs).resolve(event).is_err() {
        // Exactly-once is enforced upstream by the initializer; reaching
        // this arm means the protocol state and the slot disagree.
        defmt::warn!("duplicate backhaul status event dropped");
    }
}

/// Link status callback invoked by the stack's Ethernet MAC driver from its
/// link interrupt once auto-negotiation settles.
///
/// `up == 0` reports a dead link; any raw handle that arrives with it is
/// meaningless and is collapsed to the invalid sentinel before it reaches
/// the protocol.
#[no_mangle]
pub extern "C" fn backhaul_link_event(up: u8, raw: i8) {
    let raw = if up == 0 { -1 } else { raw };
    critical_section::with(|cs| {
        let mut init = INITIALIZER.borrow_ref_mut(cs);
        let outcome = init.complete(raw, |event| resolve_completion(cs, event));
        match outcome {
            Ok(state) => defmt::info!("backhaul link settled: {}", state),
            Err(err) => defmt::warn!("unexpected backhaul link event: {}", err),
        }
    });
}
