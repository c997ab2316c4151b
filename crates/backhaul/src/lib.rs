//! Backhaul driver initialization protocol for the MeshGate border router.
//!
//! The node has exactly one backhaul transport — wired Ethernet or
//! SLIP-framed serial — and this crate owns the runtime protocol that brings
//! it up: construct the driver, register it with the mesh stack using the
//! provisioned MAC address, and report the outcome through a single status
//! event. The hardware drivers themselves live in the firmware crate behind
//! the [`Transport`] seam, so the whole protocol is host-testable.
//!
//! This crate is `no_std` by default; its data types need only `core`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod completion;
pub mod handle;
pub mod init;

pub use completion::{Completion, CompletionError};
pub use handle::{DriverHandle, StatusEvent};
pub use init::{BringUp, ConstructError, InitError, InitState, Initializer, Transport};
