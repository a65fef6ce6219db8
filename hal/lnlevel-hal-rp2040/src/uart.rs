//! UART configuration mapping

use embassy_rp::uart::{Config, DataBits, Parity, StopBits};
use lnlevel_hal::uart::{self as hal_uart, UartConfig};

/// Translate the board-independent UART settings to embassy-rp's
pub fn uart_config(config: &UartConfig) -> Config {
    let mut out = Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        hal_uart::DataBits::Seven => DataBits::DataBits7,
        hal_uart::DataBits::Eight => DataBits::DataBits8,
    };
    out.parity = match config.parity {
        hal_uart::Parity::None => Parity::ParityNone,
        hal_uart::Parity::Even => Parity::ParityEven,
        hal_uart::Parity::Odd => Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        hal_uart::StopBits::One => StopBits::STOP1,
        hal_uart::StopBits::Two => StopBits::STOP2,
    };
    out
}
