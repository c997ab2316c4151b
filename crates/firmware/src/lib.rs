//! MeshGate Border Router Firmware
//!
//! Bring-up and fault-handling layer for a battery-less 6LoWPAN border
//! router on the NUCLEO-H743ZI: selects and initializes the mesh radio and
//! the backhaul link (Ethernet or SLIP-framed serial), provisions the device
//! MAC address, and classifies fatal CPU/allocator faults before halting.
//! The mesh stack itself (the tasklet runtime) is an external collaborator —
//! this layer hands it a registered driver and gets out of the way.
//!
//! # Architecture
//!
//! ```text
//! Bring-up orchestrator (main.rs)
//!         ↓
//! Init protocol (backhaul crate) + pure decode (platform crate)
//!         ↓
//! Hardware drivers (backhaul_hw, rf, led — feature = "hardware")
//!         ↓
//! Embassy HAL + extern mesh stack (stack module)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the STM32H743ZI target (Embassy, cortex-m)
//! - `std` - Enable standard library (host tests)
//!
//! # Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // defmt only in lib code
#![warn(clippy::dbg_macro)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)] // register and driver names in doc comments
#![allow(clippy::must_use_candidate)]

pub mod boot;
pub mod exception_handlers;

#[cfg(feature = "hardware")]
pub mod backhaul_hw;
#[cfg(feature = "hardware")]
pub mod heap_hooks;
#[cfg(feature = "hardware")]
pub mod led;
#[cfg(feature = "hardware")]
pub mod rf;
#[cfg(feature = "hardware")]
pub mod stack;

// Re-export the bring-up constants the orchestrator and tests share.
pub use boot::{BRING_UP_STEPS, LED_BLINK_MS, STATUS_POLL_BUDGET, STATUS_POLL_INTERVAL_MS};
