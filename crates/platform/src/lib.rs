//! Platform layer for the MeshGate border router
//!
//! Pure-data types and decoding logic shared by the bring-up orchestrator and
//! the fault handlers: startup configuration validation, MAC address
//! provisioning, CPU fault-status decoding, and the allocator fault taxonomy.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Backhaul init protocol (backhaul crate)
//!         ↓
//! Platform layer (this crate - pure data, host-testable)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC, firmware crate only)
//! ```
//!
//! Everything in this crate is host-testable: register words are decoded as
//! plain integers, never read from hardware here. The firmware crate samples
//! the actual registers and hands the values to these types.
//!
//! # Features
//!
//! - `std`: Enable standard library support (for testing)
//! - `defmt`: Enable defmt logging derives (hardware builds)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Pedantic lints suppressed for this crate:
#![allow(clippy::doc_markdown)] // register names (CFSR, HFSR) in doc comments
#![allow(clippy::must_use_candidate)] // accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod fault;
pub mod heap;
pub mod mac;

// Re-export the types the firmware crate touches on every boot.
pub use config::{AppConfig, BackhaulKind, ConfigError, MacSource, RadioKind, SerialConfig};
pub use fault::{Cfsr, FaultCause, FaultPath, FaultSnapshot, Hfsr};
pub use heap::{HeapFaultEvent, MemStats};
pub use mac::Eui48;
