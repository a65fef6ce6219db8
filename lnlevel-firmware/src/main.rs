//! lnlevel - Liquid Level Meter Firmware
//!
//! Main firmware binary for an RP2040 board with an HC-SR04 ultrasonic
//! module looking down into a dewar. The meter answers SCPI-style queries
//! for distance and fill level over UART0 and keeps its two calibration
//! distances in flash.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lnlevel_core::instrument::{dispatcher, LevelMeter};
use lnlevel_drivers::ranging::{Hcsr04, Hcsr04Config};
use lnlevel_hal_rp2040::{uart_config, EmbassyClock, Rp2040ByteStore};

mod config;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit meter.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../meter.toml");

/// Board wiring; pin numbers in meter.toml are checked against these
const UART_TX_GPIO: u8 = 0;
const UART_RX_GPIO: u8 = 1;
const TRIGGER_GPIO: u8 = 2;
const ECHO_GPIO: u8 = 3;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("lnlevel firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config(EMBEDDED_CONFIG);
    check_wiring(&config);

    // UART0 for the command link
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart_cfg = uart_config(&config.serial.uart_config());
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_cfg);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!(
        "UART initialized at {} baud, {} {} {}",
        config.serial.baudrate,
        config.serial.data_bits,
        config.serial.parity,
        config.serial.stop_bits
    );

    // Ultrasonic module
    let echo_pull = if config.ranging.echo_pin.pull_up {
        Pull::Up
    } else {
        Pull::None
    };
    let trigger = Output::new(p.PIN_2, Level::Low);
    let echo = Input::new(p.PIN_3, echo_pull);
    let ranger = Hcsr04::new(
        trigger,
        echo,
        Delay,
        EmbassyClock,
        Hcsr04Config::from_sampling(&config.sampling, config.ranging.echo_pin.inverted),
    );
    info!("HC-SR04 initialized");

    // Calibration lives in the last 64K of flash
    let storage = Rp2040ByteStore::new(p.FLASH, p.DMA_CH0);
    let meter = LevelMeter::new(ranger, storage, &config);
    let calibration = meter.calibration().snapshot();
    info!(
        "Calibration loaded: empty={} cm, full={} cm",
        calibration.empty_distance, calibration.full_distance
    );
    if calibration.is_degenerate() {
        warn!("Meter is not calibrated, level reads nan");
    }

    let dispatcher = unwrap!(dispatcher());

    spawner
        .spawn(tasks::scpi_task(rx, tx, dispatcher, meter))
        .unwrap();

    info!("All tasks spawned, meter ready");
}

/// Warn when meter.toml names pins other than the ones this board uses
fn check_wiring(config: &lnlevel_core::config::MeterConfig) {
    let wiring = [
        ("serial.tx_pin", config.serial.tx_pin, UART_TX_GPIO),
        ("serial.rx_pin", config.serial.rx_pin, UART_RX_GPIO),
        ("ranging.trigger_pin", config.ranging.trigger_pin.pin, TRIGGER_GPIO),
        ("ranging.echo_pin", config.ranging.echo_pin.pin, ECHO_GPIO),
    ];
    for (key, configured, wired) in wiring {
        if configured != wired {
            warn!(
                "{=str} = gpio{} but the board uses gpio{}; using gpio{}",
                key, configured, wired, wired
            );
        }
    }
}
