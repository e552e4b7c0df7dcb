//! Source Reader
//!
//! Opens one status source, sniffs its format and hands the stream to the
//! matching parser.

use super::client::ClientParser;
use super::format::{self, StatusFormat, PREFIX_LEN};
use super::server::ServerParser;
use crate::error::Result;
use crate::metrics::MeasurementSink;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Reads status sources with a fixed server schema
///
/// Holds no per-scrape state, so one reader can serve any number of sources.
#[derive(Debug, Clone)]
pub struct StatusReader {
    server: ServerParser,
    client: ClientParser,
}

impl StatusReader {
    pub fn new(ignore_individuals: bool) -> Self {
        Self {
            server: ServerParser::new(ignore_individuals),
            client: ClientParser::new(),
        }
    }

    /// Reads the status file at `path`
    pub fn read_path<S>(
        &self,
        name: &str,
        path: impl AsRef<Path>,
        sink: &mut S,
    ) -> Result<StatusFormat>
    where
        S: MeasurementSink + ?Sized,
    {
        let file = File::open(path.as_ref())?;
        self.read_from(name, file, sink)
    }

    /// Detects the format of `source` and parses it from the first byte
    pub fn read_from<R, S>(&self, name: &str, mut source: R, sink: &mut S) -> Result<StatusFormat>
    where
        R: Read,
        S: MeasurementSink + ?Sized,
    {
        let mut prefix = Vec::with_capacity(PREFIX_LEN);
        (&mut source).take(PREFIX_LEN as u64).read_to_end(&mut prefix)?;
        let format = format::detect(&prefix)?;
        debug!("Detected {:?} status format for {}", format, name);

        // Replay the sniffed prefix in front of the rest of the stream
        let stream = BufReader::new(Cursor::new(prefix).chain(source));
        match format {
            StatusFormat::ServerV2 | StatusFormat::ServerV3 => {
                self.server.parse(name, stream, format.separator(), sink)?
            }
            StatusFormat::Client => self.client.parse(name, stream, sink)?,
        }
        Ok(format)
    }
}
