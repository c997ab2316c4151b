//! Startup configuration for the border router node.
//!
//! All build-variant choices (backhaul transport, radio family, MAC source)
//! are closed sum types matched exhaustively by the orchestrator. A missing
//! or contradictory selection is rejected by [`AppConfig::validate`] before
//! any hardware is touched — never discovered mid-bring-up.

use thiserror_no_std::Error;

/// Backhaul transport connecting this node to the wider network.
///
/// Exactly one transport exists per node. The local mesh radio is a separate
/// device and is configured through [`RadioKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackhaulKind {
    /// SLIP-framed serial uplink over the VCP USART.
    FramedSerial,
    /// Wired Ethernet uplink (on-board RMII PHY).
    Ethernet,
}

/// Mesh radio transceiver family attached to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioKind {
    /// Atmel/Microchip AT86RF233 (SPI, 2.4 GHz).
    At86rf233,
    /// NXP MCR20A (SPI, 2.4 GHz).
    Mcr20a,
    /// ST S2-LP (SPI, sub-GHz).
    S2lp,
    /// Silicon Labs EFR32 (on-module).
    Efr32,
}

impl RadioKind {
    /// Driver name reported in bring-up logs and diagnostics.
    pub fn driver_name(self) -> &'static str {
        match self {
            RadioKind::At86rf233 => "at86rf233",
            RadioKind::Mcr20a => "mcr20a",
            RadioKind::S2lp => "s2lp",
            RadioKind::Efr32 => "efr32",
        }
    }
}

/// Where the 6-byte device MAC address comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacSource {
    /// Derive from the 96-bit silicon unique ID (byte-shuffling transform).
    DeviceUid,
    /// Fixed value configured at build time.
    Fixed([u8; 6]),
}

/// Serial parameters for the framed-serial backhaul.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Baud rate for the uplink USART.
    pub baud: u32,
    /// Enable RTS/CTS hardware flow control.
    pub hw_flow_control: bool,
}

/// Smallest heap the mesh stack can run with. Below this the allocator
/// thrashes and the node drops off the network in ways that look like RF
/// problems, so reject it up front.
pub const MIN_HEAP_BYTES: usize = 16 * 1024;

/// Complete startup configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    /// Which backhaul transport to bring up.
    pub backhaul: BackhaulKind,
    /// Which mesh radio family is attached.
    pub radio: RadioKind,
    /// MAC address provisioning strategy.
    pub mac_source: MacSource,
    /// Serial parameters; required iff `backhaul` is `FramedSerial`.
    pub serial: Option<SerialConfig>,
    /// Drive the activity LED blinker.
    pub led_enabled: bool,
    /// Bytes handed to the mesh stack allocator.
    pub heap_bytes: usize,
}

/// Configuration rejected before bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Framed-serial backhaul selected but no serial parameters given.
    #[error("framed-serial backhaul requires serial parameters")]
    MissingSerialConfig,
    /// Serial baud rate of zero can never clock the uplink.
    #[error("serial baud rate must be non-zero")]
    ZeroBaudRate,
    /// Heap below the stack's working floor.
    #[error("heap size below the 16 KiB stack floor")]
    HeapTooSmall,
}

/// A configuration that passed [`AppConfig::validate`].
///
/// Only this type reaches the bring-up path, so the orchestrator can match
/// on the selections without re-checking them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidatedConfig {
    config: AppConfig,
}

impl ValidatedConfig {
    /// The validated configuration values.
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Serial parameters, present whenever the backhaul is framed-serial.
    pub fn serial(&self) -> Option<SerialConfig> {
        self.config.serial
    }
}

impl AppConfig {
    /// Check the cross-field selection rules.
    ///
    /// The rules the preprocessor used to enforce in the C-era build system
    /// live here instead: every selection is an exhaustive enum, and the
    /// combinations that cannot work are rejected before any peripheral is
    /// claimed.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        match self.backhaul {
            BackhaulKind::FramedSerial => match self.serial {
                None => return Err(ConfigError::MissingSerialConfig),
                Some(serial) if serial.baud == 0 => return Err(ConfigError::ZeroBaudRate),
                Some(_) => {}
            },
            // Ethernet ignores serial parameters if present; the spare VCP
            // USART stays available as a console.
            BackhaulKind::Ethernet => {}
        }

        if self.heap_bytes < MIN_HEAP_BYTES {
            return Err(ConfigError::HeapTooSmall);
        }

        Ok(ValidatedConfig { config: self })
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            backhaul: BackhaulKind::Ethernet,
            radio: RadioKind::At86rf233,
            mac_source: MacSource::DeviceUid,
            serial: None,
            led_enabled: true,
            heap_bytes: 32 * 1024,
        }
    }

    #[test]
    fn test_ethernet_without_serial_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_framed_serial_requires_serial_config() {
        let config = AppConfig {
            backhaul: BackhaulKind::FramedSerial,
            serial: None,
            ..base_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingSerialConfig));
    }

    #[test]
    fn test_framed_serial_rejects_zero_baud() {
        let config = AppConfig {
            backhaul: BackhaulKind::FramedSerial,
            serial: Some(SerialConfig {
                baud: 0,
                hw_flow_control: false,
            }),
            ..base_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBaudRate));
    }

    #[test]
    fn test_framed_serial_with_baud_is_valid() {
        let config = AppConfig {
            backhaul: BackhaulKind::FramedSerial,
            serial: Some(SerialConfig {
                baud: 115_200,
                hw_flow_control: true,
            }),
            ..base_config()
        };
        let validated = config.validate().expect("valid serial config");
        assert_eq!(validated.serial().map(|s| s.baud), Some(115_200));
    }

    #[test]
    fn test_heap_floor_enforced() {
        let config = AppConfig {
            heap_bytes: MIN_HEAP_BYTES - 1,
            ..base_config()
        };
        assert_eq!(config.validate(), Err(ConfigError::HeapTooSmall));
    }

    #[test]
    fn test_heap_at_floor_is_valid() {
        let config = AppConfig {
            heap_bytes: MIN_HEAP_BYTES,
            ..base_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_radio_driver_names_are_distinct() {
        let kinds = [
            RadioKind::At86rf233,
            RadioKind::Mcr20a,
            RadioKind::S2lp,
            RadioKind::Efr32,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.driver_name(), b.driver_name());
            }
        }
    }

    #[test]
    fn test_ethernet_tolerates_stray_serial_config() {
        // Ethernet nodes often keep the VCP USART as a console; a leftover
        // serial section must not fail validation.
        let config = AppConfig {
            serial: Some(SerialConfig {
                baud: 115_200,
                hw_flow_control: false,
            }),
            ..base_config()
        };
        assert!(config.validate().is_ok());
    }
}
