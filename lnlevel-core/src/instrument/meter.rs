//! Level meter command handlers

use lnlevel_hal::{ByteStore, StorageError};
use lnlevel_protocol::{Instrument, Request, ResponseError, ResponseWriter, MAX_RESPONSE_LEN};

use super::commands::Command;
use crate::config::{
    CalibrationPoint, CalibrationStore, IdentityConfig, MeterConfig, MAX_LABEL_LEN,
    MAX_LEVEL_DECIMALS,
};
use crate::level::measure_level;
use crate::sensor::SensorGateway;
use crate::traits::RangingSensor;

// `*IDN?` joins four labels with commas
const _: () = assert!(4 * MAX_LABEL_LEN + 3 <= MAX_RESPONSE_LEN);

/// Handler failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Set parameter is not a number; nothing was stored
    InvalidParameter,
    /// Value was cached but could not be persisted
    Storage(StorageError),
    /// Response did not fit the response buffer
    ResponseOverflow,
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        CommandError::Storage(e)
    }
}

impl From<ResponseError> for CommandError {
    fn from(_: ResponseError) -> Self {
        CommandError::ResponseOverflow
    }
}

/// The meter: sensor, calibration and identity behind the command set
pub struct LevelMeter<R, S> {
    gateway: SensorGateway<R>,
    calibration: CalibrationStore<S>,
    identity: IdentityConfig,
    level_decimals: u8,
}

impl<R: RangingSensor, S: ByteStore> LevelMeter<R, S> {
    /// Create a meter, loading the calibration from `storage`
    pub fn new(sensor: R, storage: S, config: &MeterConfig) -> Self {
        Self {
            gateway: SensorGateway::new(sensor, &config.sampling),
            calibration: CalibrationStore::load(storage),
            identity: config.identity.clone(),
            level_decimals: config.output.level_decimals.min(MAX_LEVEL_DECIMALS),
        }
    }

    /// Calibration store
    pub fn calibration(&self) -> &CalibrationStore<S> {
        &self.calibration
    }

    /// Mutable calibration store
    pub fn calibration_mut(&mut self) -> &mut CalibrationStore<S> {
        &mut self.calibration
    }

    fn write_level<W: ResponseWriter>(&self, level: f32, out: &mut W) -> Result<(), ResponseError> {
        if level.is_nan() {
            out.write_line("nan")
        } else {
            out.write_fmt_line(format_args!("{:.*}", self.level_decimals as usize, level))
        }
    }

    /// Store a calibration point from the first parameter
    ///
    /// Without a parameter the current measured distance is stored.
    fn set_point(&mut self, point: CalibrationPoint, request: &Request<'_>) -> Result<(), CommandError> {
        let raw = match request.params.int(0) {
            Ok(Some(value)) => value,
            Ok(None) => self.gateway.measure_distance() as i32,
            Err(_) => return Err(CommandError::InvalidParameter),
        };
        self.calibration.set(point, raw)?;
        Ok(())
    }

    fn identify<W: ResponseWriter>(&self, out: &mut W) -> Result<(), ResponseError> {
        let id = &self.identity;
        out.write_fmt_line(format_args!(
            "{},{},{},{}",
            id.manufacturer, id.model, id.serial, id.version
        ))
    }
}

impl<R: RangingSensor, S: ByteStore> Instrument for LevelMeter<R, S> {
    type Command = Command;
    type Error = CommandError;

    fn execute<W: ResponseWriter>(
        &mut self,
        command: Command,
        request: &Request<'_>,
        out: &mut W,
    ) -> Result<(), CommandError> {
        match command {
            Command::DistanceMeasure => {
                let distance = self.gateway.measure_distance();
                out.write_fmt_line(format_args!("{}", distance))?;
            }
            Command::LevelMeasure => {
                let level = measure_level(&mut self.gateway, &self.calibration);
                self.write_level(level, out)?;
            }
            Command::EmptyQuery => {
                out.write_fmt_line(format_args!("{}", self.calibration.get(CalibrationPoint::Empty)))?;
            }
            Command::FullQuery => {
                out.write_fmt_line(format_args!("{}", self.calibration.get(CalibrationPoint::Full)))?;
            }
            Command::EmptySet => self.set_point(CalibrationPoint::Empty, request)?,
            Command::FullSet => self.set_point(CalibrationPoint::Full, request)?,
            Command::Identify => self.identify(out)?,
        }
        Ok(())
    }
}
