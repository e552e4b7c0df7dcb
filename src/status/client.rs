//! Client Status Parser
//!
//! Client-mode status files are a flat list of `key,value` statistics:
//!
//! ```text
//! OpenVPN STATISTICS
//! Updated,Thu Oct 19 10:00:00 2017
//! TUN/TAP read bytes,153789941
//! ...
//! END
//! ```

use crate::error::{ExporterError, Result};
use crate::metrics::{self, Measurement, MeasurementSink, MetricDesc};
use chrono::{Local, NaiveDateTime, TimeZone};
use std::collections::HashMap;
use std::io::BufRead;

/// ctime form written by OpenVPN 2.4 and earlier, then ISO form from 2.5 on
const UPDATED_FORMATS: &[&str] = &["%a %b %d %H:%M:%S %Y", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone)]
pub struct ClientParser {
    statistics: HashMap<&'static str, MetricDesc>,
}

impl ClientParser {
    pub fn new() -> Self {
        Self {
            statistics: metrics::CLIENT_STATISTICS.iter().copied().collect(),
        }
    }

    /// Converts a client statistics stream into measurements
    pub fn parse<R, S>(&self, name: &str, reader: R, sink: &mut S) -> Result<()>
    where
        R: BufRead,
        S: MeasurementSink + ?Sized,
    {
        for line in reader.lines() {
            let line = line?;
            let fields: Vec<&str> = line.split(',').collect();

            match (fields[0], fields.len()) {
                ("END", 1) | ("OpenVPN STATISTICS", 1) => {}
                ("Updated", 2) => {
                    let updated = parse_updated(fields[1])?;
                    sink.emit(Measurement::for_source(
                        metrics::STATUS_UPDATE_TIME,
                        updated,
                        name,
                    ))?;
                }
                (key, 2) if self.statistics.contains_key(key) => {
                    let value = fields[1]
                        .parse::<f64>()
                        .map_err(|e| ExporterError::invalid_number(key, fields[1], e))?;
                    sink.emit(Measurement::for_source(self.statistics[key], value, name))?;
                }
                (key, _) => return Err(ExporterError::UnsupportedKey(key.to_string())),
            }
        }

        Ok(())
    }
}

impl Default for ClientParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the local-time `Updated` date into Unix seconds
///
/// OpenVPN pads single-digit days with an extra space, so runs of whitespace
/// are collapsed first.
fn parse_updated(raw: &str) -> Result<f64> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let naive = UPDATED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .ok_or_else(|| ExporterError::InvalidTimestamp(raw.to_string()))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ExporterError::InvalidTimestamp(raw.to_string()))?;
    Ok(local.timestamp() as f64)
}
