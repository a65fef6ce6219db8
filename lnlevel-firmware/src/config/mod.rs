//! Configuration loading
//!
//! The meter configuration is compiled in from `meter.toml` and parsed at
//! boot with the core's no_std parser. `build.rs` has already validated the
//! file, so a parse failure here means the two have drifted apart; the
//! firmware then runs on built-in defaults.

use defmt::*;

use lnlevel_core::config::{parse_config, MeterConfig};

/// Parse the embedded configuration, falling back to defaults
pub fn load_config(text: &str) -> MeterConfig {
    match parse_config(text) {
        Ok(config) => {
            info!("Loaded configuration from meter.toml");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            warn!("meter.toml parse error: {:?}, using defaults", e);
            MeterConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &MeterConfig) {
    debug!(
        "  sampling: {} pings, {} ms apart, timeout {} us",
        config.sampling.sample_count,
        config.sampling.ping_interval_ms,
        config.sampling.echo_timeout_us
    );
    debug!("  output: {} level decimals", config.output.level_decimals);
    debug!(
        "  serial: {} baud on gpio{}/gpio{}",
        config.serial.baudrate, config.serial.tx_pin, config.serial.rx_pin
    );
    debug!(
        "  ranging: trigger gpio{}, echo gpio{}",
        config.ranging.trigger_pin.pin, config.ranging.echo_pin.pin
    );
}
