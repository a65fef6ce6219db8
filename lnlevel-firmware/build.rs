//! Build script for lnlevel-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates meter.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections the firmware's config parser understands
const KNOWN_SECTIONS: &[&str] = &["sampling", "output", "identity", "serial", "ranging"];

/// Longest identity field the firmware stores
const MAX_LABEL_LEN: usize = 24;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate meter.toml at compile time
///
/// The firmware falls back to defaults when the embedded file does not
/// parse, so mistakes are caught here rather than on the bench.
fn validate_config() {
    println!("cargo:rerun-if-changed=meter.toml");

    let config_path = Path::new("meter.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: meter.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds meter.toml from the lnlevel-firmware        ║\n\
            ║  directory. Restore it or create a new one.                      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read meter.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in meter.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_sampling(&config, &mut errors);
    validate_output(&config, &mut errors);
    validate_identity(&config, &mut errors);
    validate_serial(&config, &mut errors);
    validate_pins(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in meter.toml                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=meter.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !value.is_table() {
            errors.push(format!("'{}' must be inside a section", name));
        } else if !KNOWN_SECTIONS.contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
        }
    }
}

fn int_in_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
        return;
    };
    match value.as_integer() {
        Some(v) if range.contains(&v) => {}
        _ => errors.push(format!(
            "{}.{} must be an integer in {}..={}",
            section,
            key,
            range.start(),
            range.end()
        )),
    }
}

fn validate_sampling(config: &toml::Value, errors: &mut Vec<String>) {
    int_in_range(config, "sampling", "sample_count", 1..=15, errors);
    int_in_range(config, "sampling", "ping_interval_ms", 0..=u16::MAX as i64, errors);
    int_in_range(config, "sampling", "echo_timeout_us", 1..=u32::MAX as i64, errors);

    if let Some(speed) = config.get("sampling").and_then(|s| s.get("speed_of_sound")) {
        match speed.as_float() {
            Some(v) if v.is_finite() && v > 0.0 => {}
            _ => errors.push("sampling.speed_of_sound must be a positive float".to_string()),
        }
    }

    int_in_range(config, "serial", "baudrate", 1..=u32::MAX as i64, errors);
}

fn validate_output(config: &toml::Value, errors: &mut Vec<String>) {
    int_in_range(config, "output", "level_decimals", 0..=6, errors);
}

fn validate_identity(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(identity) = config.get("identity") else {
        return;
    };
    for key in ["manufacturer", "model", "serial", "version"] {
        if let Some(value) = identity.get(key) {
            match value.as_str() {
                Some(s) if s.len() <= MAX_LABEL_LEN => {}
                Some(_) => errors.push(format!(
                    "identity.{} is longer than {} bytes",
                    key, MAX_LABEL_LEN
                )),
                None => errors.push(format!("identity.{} must be a string", key)),
            }
        }
    }
}

fn validate_serial(config: &toml::Value, errors: &mut Vec<String>) {
    int_in_range(config, "serial", "data_bits", 7..=8, errors);
    int_in_range(config, "serial", "stop_bits", 1..=2, errors);

    if let Some(parity) = config.get("serial").and_then(|s| s.get("parity")) {
        if !matches!(parity.as_str(), Some("none" | "even" | "odd")) {
            errors.push("serial.parity must be \"none\", \"even\" or \"odd\"".to_string());
        }
    }
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let pins = [
        ("serial", "tx_pin"),
        ("serial", "rx_pin"),
        ("ranging", "trigger_pin"),
        ("ranging", "echo_pin"),
    ];
    for (section, key) in pins {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        let valid = value
            .as_str()
            .map(|s| s.trim_start_matches(['!', '^']))
            .and_then(|s| s.strip_prefix("gpio"))
            .and_then(|n| n.parse::<u8>().ok())
            .is_some_and(|n| n <= 29);
        if !valid {
            errors.push(format!(
                "{}.{} must look like \"gpioN\" (N = 0-29)",
                section, key
            ));
        }
    }
}
