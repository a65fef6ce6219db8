//! lnlevel Hardware Abstraction Layer
//!
//! This crate defines the capabilities the level meter needs from the
//! board, so the core logic can be exercised on the host with mocks and
//! run on the RP2040 with real peripherals.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (lnlevel-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lnlevel-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ lnlevel-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::ByteStore`] - Persistent single-byte slots
//! - [`timer::Monotonic`] - Microsecond clock for echo timing
//! - [`uart::UartConfig`] - Serial link framing

#![no_std]
#![deny(unsafe_code)]

pub mod storage;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use storage::{ByteStore, StorageError, StorageSlot, ERASED_BYTE};
pub use timer::Monotonic;
pub use uart::UartConfig;
