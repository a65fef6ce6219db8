//! RP2040-specific HAL for the level meter firmware
//!
//! This crate provides RP2040 implementations of the shared `lnlevel-hal`
//! capabilities:
//!
//! - Flash byte store (implements `lnlevel_hal::ByteStore`)
//! - Microsecond clock on the embassy time driver
//! - UART configuration mapping

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod timer;
pub mod uart;

pub use flash::Rp2040ByteStore;
pub use timer::EmbassyClock;
pub use uart::uart_config;
