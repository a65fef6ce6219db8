//! SCPI command task
//!
//! Reads the UART byte by byte into lines, runs each complete line through
//! the dispatcher, then writes the queued responses, each terminated by
//! `\n`. Ranging and flash writes complete inside the handler, so the UART
//! read is the only point where the task yields.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::Delay;
use embedded_io_async::{Read, Write};

use lnlevel_core::instrument::{Command, CommandError, LevelMeter};
use lnlevel_drivers::ranging::Hcsr04;
use lnlevel_hal_rp2040::{EmbassyClock, Rp2040ByteStore};
use lnlevel_protocol::{
    DispatchReport, Dispatcher, LineBuffer, LineError, LineResponses, LINE_TERMINATOR,
};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// HC-SR04 on embassy-rp pins
pub type Ranger = Hcsr04<Output<'static>, Input<'static>, Delay, EmbassyClock>;

/// The meter as wired on the board
pub type Meter = LevelMeter<Ranger, Rp2040ByteStore<'static>>;

/// SCPI task - serves the command protocol on the UART
#[embassy_executor::task]
pub async fn scpi_task(
    mut rx: BufferedUartRx,
    mut tx: BufferedUartTx,
    dispatcher: Dispatcher<Command>,
    mut meter: Meter,
) {
    info!("SCPI task started");

    let mut line = LineBuffer::new();
    let mut responses = LineResponses::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match line.feed(byte) {
                Ok(Some(text)) => {
                    trace!("RX line: {=str}", text);
                    responses.clear();
                    let report = dispatcher.process_line(text, &mut meter, &mut responses);
                    log_report(&report);
                    write_responses(&mut tx, &responses).await;
                }
                Ok(None) => {}
                Err(LineError::Overflow) => {
                    warn!("Input line too long, discarding until newline");
                }
                Err(e) => {
                    warn!("Line error: {:?}", e);
                }
            }
        }
    }
}

/// Write queued responses, one per line
async fn write_responses(tx: &mut BufferedUartTx, responses: &LineResponses) {
    for response in responses.iter() {
        trace!("TX line: {=str}", response);
        let result = match tx.write_all(response.as_bytes()).await {
            Ok(()) => tx.write_all(&[LINE_TERMINATOR]).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("UART write error: {:?}", e);
            return;
        }
    }
}

/// Unknown and failed commands never reach the wire; log them instead
fn log_report(report: &DispatchReport<CommandError>) {
    if report.is_clean() {
        return;
    }

    debug!(
        "Dispatch: {} executed, {} unresolved, {} malformed, {} failed",
        report.executed, report.unresolved, report.malformed, report.failed
    );

    match report.last_error {
        Some(CommandError::Storage(e)) => {
            error!("Calibration write failed: {:?}", e);
        }
        Some(e) => {
            warn!("Command failed: {:?}", e);
        }
        None => {}
    }
}
