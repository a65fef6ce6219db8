//! Configuration type definitions
//!
//! These types represent the meter configuration. The firmware embeds a
//! `meter.toml`, parses it at boot, and falls back to [`MeterConfig::default`]
//! when parsing fails.

use heapless::String;
use lnlevel_hal::uart::{DataBits, Parity, StopBits, UartConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum identity field length
pub const MAX_LABEL_LEN: usize = 24;

/// Maximum number of ranging samples per measurement
pub const MAX_SAMPLES: u8 = 15;

/// Maximum decimals printed for a level reading
pub const MAX_LEVEL_DECIMALS: u8 = 6;

/// Speed of sound in dry air at 20 °C, cm per microsecond
pub const DEFAULT_SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }
}

/// Ranging sample settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    /// Pings per measurement; the median is reported (1..=MAX_SAMPLES)
    pub sample_count: u8,
    /// Speed of sound used for the time-to-distance conversion
    pub speed_of_sound_cm_per_us: f32,
    /// Minimum spacing between pings in milliseconds
    pub ping_interval_ms: u16,
    /// Give up waiting for an echo after this many microseconds
    pub echo_timeout_us: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: 5,
            speed_of_sound_cm_per_us: DEFAULT_SPEED_OF_SOUND_CM_PER_US,
            ping_interval_ms: 29,
            echo_timeout_us: 23_200, // ~4 m round trip
        }
    }
}

/// Response formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputConfig {
    /// Decimals printed for `:LEVel:MEASure?`
    pub level_decimals: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { level_decimals: 2 }
    }
}

/// `*IDN?` fields
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdentityConfig {
    pub manufacturer: String<MAX_LABEL_LEN>,
    pub model: String<MAX_LABEL_LEN>,
    /// Placeholder unless set per unit
    pub serial: String<MAX_LABEL_LEN>,
    pub version: String<MAX_LABEL_LEN>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            manufacturer: label("lnlevel"),
            model: label("LN2 Level Meter"),
            serial: label("0"),
            version: label("1.0"),
        }
    }
}

fn label(s: &str) -> String<MAX_LABEL_LEN> {
    let mut out = String::new();
    let _ = out.push_str(s);
    out
}

/// Serial link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// UART TX GPIO
    pub tx_pin: u8,
    /// UART RX GPIO
    pub rx_pin: u8,
}

impl SerialConfig {
    /// Framing handed to the chip HAL
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baudrate,
            data_bits: self.data_bits,
            parity: self.parity,
            stop_bits: self.stop_bits,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        let uart = UartConfig::default();
        Self {
            baudrate: uart.baudrate,
            data_bits: uart.data_bits,
            parity: uart.parity,
            stop_bits: uart.stop_bits,
            tx_pin: 0,
            rx_pin: 1,
        }
    }
}

/// Ultrasonic module wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangingHwConfig {
    /// Trigger output
    pub trigger_pin: PinConfig,
    /// Echo input
    pub echo_pin: PinConfig,
}

impl Default for RangingHwConfig {
    fn default() -> Self {
        Self {
            trigger_pin: PinConfig::new(2),
            echo_pin: PinConfig::new(3),
        }
    }
}

/// Complete meter configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeterConfig {
    pub sampling: SamplingConfig,
    pub output: OutputConfig,
    pub identity: IdentityConfig,
    pub serial: SerialConfig,
    pub ranging: RangingHwConfig,
}
