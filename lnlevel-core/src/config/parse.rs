//! Minimal TOML parser for the meter configuration
//!
//! Handles only the subset `meter.toml` uses. It does NOT support the full
//! TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float)
//! - [section] headers
//! - Comments (# ...), including trailing comments
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use heapless::String;
use lnlevel_hal::uart::{DataBits, Parity, StopBits};

use super::types::{
    MeterConfig, PinConfig, MAX_LABEL_LEN, MAX_LEVEL_DECIMALS, MAX_SAMPLES,
};

/// Highest GPIO number on the RP2040
const MAX_GPIO: u8 = 29;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sampling,
    Output,
    Identity,
    Serial,
    Ranging,
}

/// Parse TOML text into a [`MeterConfig`]
///
/// Keys that are not present keep their default value.
pub fn parse_config(input: &str) -> Result<MeterConfig, ParseError> {
    let mut config = MeterConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "sampling" => Ok(Section::Sampling),
        "output" => Ok(Section::Output),
        "identity" => Ok(Section::Identity),
        "serial" => Ok(Section::Serial),
        "ranging" => Ok(Section::Ranging),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping a trailing comment outside quotes
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Strip surrounding quotes; unquoted text is taken as-is
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_label(value: &str) -> Result<String<MAX_LABEL_LEN>, ParseError> {
    String::try_from(parse_string(value)).map_err(|_| ParseError::InvalidValue)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a strictly positive, finite float
fn parse_positive_float(value: &str) -> Result<f32, ParseError> {
    let v: f32 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse a pin string like "gpio2", "!gpio3", "^gpio3"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = number.parse().map_err(|_| ParseError::InvalidPin)?;
    if pin > MAX_GPIO {
        return Err(ParseError::InvalidPin);
    }

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn parse_data_bits(value: &str) -> Result<DataBits, ParseError> {
    match value {
        "7" => Ok(DataBits::Seven),
        "8" => Ok(DataBits::Eight),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_parity(value: &str) -> Result<Parity, ParseError> {
    match parse_string(value) {
        "none" => Ok(Parity::None),
        "even" => Ok(Parity::Even),
        "odd" => Ok(Parity::Odd),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_stop_bits(value: &str) -> Result<StopBits, ParseError> {
    match value {
        "1" => Ok(StopBits::One),
        "2" => Ok(StopBits::Two),
        _ => Err(ParseError::InvalidValue),
    }
}

fn check(ok: bool) -> Result<(), ParseError> {
    if ok {
        Ok(())
    } else {
        Err(ParseError::InvalidValue)
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MeterConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Sampling => {
            let s = &mut config.sampling;
            match key {
                "sample_count" => {
                    let count: u8 = parse_int(value)?;
                    check((1..=MAX_SAMPLES).contains(&count))?;
                    s.sample_count = count;
                }
                "speed_of_sound" => s.speed_of_sound_cm_per_us = parse_positive_float(value)?,
                "ping_interval_ms" => s.ping_interval_ms = parse_int(value)?,
                "echo_timeout_us" => {
                    let timeout: u32 = parse_int(value)?;
                    check(timeout > 0)?;
                    s.echo_timeout_us = timeout;
                }
                _ => {}
            }
        }
        Section::Output => {
            if key == "level_decimals" {
                let decimals: u8 = parse_int(value)?;
                check(decimals <= MAX_LEVEL_DECIMALS)?;
                config.output.level_decimals = decimals;
            }
        }
        Section::Identity => {
            let id = &mut config.identity;
            match key {
                "manufacturer" => id.manufacturer = parse_label(value)?,
                "model" => id.model = parse_label(value)?,
                "serial" => id.serial = parse_label(value)?,
                "version" => id.version = parse_label(value)?,
                _ => {}
            }
        }
        Section::Serial => {
            let s = &mut config.serial;
            match key {
                "baudrate" => {
                    let baud: u32 = parse_int(value)?;
                    check(baud > 0)?;
                    s.baudrate = baud;
                }
                "data_bits" => s.data_bits = parse_data_bits(value)?,
                "parity" => s.parity = parse_parity(value)?,
                "stop_bits" => s.stop_bits = parse_stop_bits(value)?,
                "tx_pin" => s.tx_pin = parse_pin(value)?.pin,
                "rx_pin" => s.rx_pin = parse_pin(value)?.pin,
                _ => {}
            }
        }
        Section::Ranging => match key {
            "trigger_pin" => config.ranging.trigger_pin = parse_pin(value)?,
            "echo_pin" => config.ranging.echo_pin = parse_pin(value)?,
            _ => {}
        },
        // No keys live outside a section
        Section::Root => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Dewar level meter
[sampling]
sample_count = 7
speed_of_sound = 0.0331   # cold nitrogen vapour
ping_interval_ms = 60
echo_timeout_us = 30000

[output]
level_decimals = 3

[identity]
manufacturer = "Cryo Lab"
model = "LN2 Meter # rev B"
serial = "SN-0042"
version = "2.1"

[serial]
baudrate = 9600
tx_pin = "gpio4"
rx_pin = "gpio5"

[ranging]
trigger_pin = "gpio14"
echo_pin = "^gpio15"
"#;

    #[test]
    fn test_parse_full_file() {
        let config = parse_config(SAMPLE).unwrap();

        assert_eq!(config.sampling.sample_count, 7);
        assert!((config.sampling.speed_of_sound_cm_per_us - 0.0331).abs() < 1e-6);
        assert_eq!(config.sampling.ping_interval_ms, 60);
        assert_eq!(config.sampling.echo_timeout_us, 30000);
        assert_eq!(config.output.level_decimals, 3);
        assert_eq!(config.identity.manufacturer.as_str(), "Cryo Lab");
        // '#' inside quotes is not a comment
        assert_eq!(config.identity.model.as_str(), "LN2 Meter # rev B");
        assert_eq!(config.identity.serial.as_str(), "SN-0042");
        assert_eq!(config.serial.baudrate, 9600);
        assert_eq!(config.serial.tx_pin, 4);
        assert_eq!(config.serial.rx_pin, 5);
        assert_eq!(config.ranging.trigger_pin, PinConfig::new(14));
        assert_eq!(
            config.ranging.echo_pin,
            PinConfig {
                pin: 15,
                inverted: false,
                pull_up: true
            }
        );
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), MeterConfig::default());
        assert_eq!(
            parse_config("# only a comment\n").unwrap(),
            MeterConfig::default()
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config("[output]\nlevel_decimals = 4\n").unwrap();
        assert_eq!(config.output.level_decimals, 4);
        assert_eq!(config.sampling, MeterConfig::default().sampling);
    }

    #[test]
    fn test_unknown_key_ignored() {
        let config = parse_config("[sampling]\nfilter = \"kalman\"\nsample_count = 3\n").unwrap();
        assert_eq!(config.sampling.sample_count, 3);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_config("[heater]\npin = \"gpio1\"\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert_eq!(
            parse_config("[sampling]\nsample_count = 0\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[sampling]\nsample_count = 16\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[sampling]\nspeed_of_sound = -1.0\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[output]\nlevel_decimals = 7\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[serial]\nbaudrate = 0\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_label_too_long_rejected() {
        assert_eq!(
            parse_config("[identity]\nmodel = \"this model name is far too long to fit\"\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_parse_pin_modifiers() {
        assert_eq!(parse_pin("\"gpio3\""), Ok(PinConfig::new(3)));
        assert_eq!(
            parse_pin("!^gpio7"),
            Ok(PinConfig {
                pin: 7,
                inverted: true,
                pull_up: true
            })
        );
        assert_eq!(parse_pin("pin7"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio30"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_serial_framing() {
        let config =
            parse_config("[serial]\ndata_bits = 7\nparity = \"even\"\nstop_bits = 2\n").unwrap();
        let uart = config.serial.uart_config();
        assert_eq!(uart.baudrate, 115200);
        assert_eq!(uart.data_bits, DataBits::Seven);
        assert_eq!(uart.parity, Parity::Even);
        assert_eq!(uart.stop_bits, StopBits::Two);

        assert_eq!(
            parse_config("[serial]\nparity = \"mark\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[serial]\ndata_bits = 9\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[serial]\nstop_bits = 0\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("a = 1 # note"), Some(("a", "1")));
        assert_eq!(parse_key_value("a ="), None);
        assert_eq!(parse_key_value("no equals"), None);
    }
}
