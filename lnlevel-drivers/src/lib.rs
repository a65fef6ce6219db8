//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in lnlevel-core:
//!
//! - Ultrasonic ranging (HC-SR04 and pin-compatible modules)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod ranging;
