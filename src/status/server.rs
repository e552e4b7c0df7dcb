//! Server Status Parser
//!
//! Parses the server-mode status file written by `--status` with
//! `--status-version 2` or `3`. Each line starts with a keyword:
//!
//! ```text
//! TITLE,OpenVPN 2.4.4 x86_64-pc-linux-gnu
//! TIME,Thu Oct 19 10:00:00 2017,1508407200
//! HEADER,CLIENT_LIST,Common Name,Real Address,...
//! CLIENT_LIST,alice,1.2.3.4:1194,...
//! HEADER,ROUTING_TABLE,Virtual Address,Common Name,...
//! ROUTING_TABLE,10.0.0.2,alice,...
//! GLOBAL_STATS,Max bcast/mcast queue length,0
//! END
//! ```
//!
//! Data rows are only meaningful together with the most recent `HEADER` line
//! for their section, so headers are tracked per parse call.

use super::schema::{SectionSchema, ServerSchema, CLIENT_LIST};
use crate::error::{ExporterError, Result};
use crate::metrics::{self, Measurement, MeasurementSink};
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ServerParser {
    schema: ServerSchema,
}

impl ServerParser {
    pub fn new(ignore_individuals: bool) -> Self {
        Self::with_schema(ServerSchema::new(ignore_individuals))
    }

    pub fn with_schema(schema: ServerSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ServerSchema {
        &self.schema
    }

    /// Converts a server status stream into measurements
    ///
    /// Measurements are pushed into `sink` as each line is processed. The first
    /// grammar, numeric or I/O error aborts the parse; whatever was emitted
    /// before it stays in the sink.
    pub fn parse<R, S>(&self, name: &str, reader: R, separator: char, sink: &mut S) -> Result<()>
    where
        R: BufRead,
        S: MeasurementSink + ?Sized,
    {
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        let mut connected_clients: u64 = 0;

        for line in reader.lines() {
            let line = line?;
            let fields: Vec<&str> = line.split(separator).collect();

            match fields[0] {
                // Stats footer
                "END" if fields.len() == 1 => {}
                "GLOBAL_STATS" => {}
                "HEADER" if fields.len() > 2 => {
                    headers.insert(
                        fields[1].to_string(),
                        fields[2..].iter().map(|c| c.to_string()).collect(),
                    );
                }
                "TIME" if fields.len() == 3 => {
                    let updated = fields[2]
                        .parse::<f64>()
                        .map_err(|e| ExporterError::invalid_number("TIME", fields[2], e))?;
                    sink.emit(Measurement::for_source(
                        metrics::STATUS_UPDATE_TIME,
                        updated,
                        name,
                    ))?;
                }
                // OpenVPN version string
                "TITLE" if fields.len() == 2 => {}
                key => {
                    let Some(section) = self.schema.section(key) else {
                        return Err(ExporterError::UnsupportedKey(key.to_string()));
                    };
                    if key == CLIENT_LIST {
                        connected_clients += 1;
                    }
                    let columns = headers
                        .get(key)
                        .ok_or_else(|| ExporterError::MissingHeader(key.to_string()))?;
                    emit_row(name, key, section, columns, &fields, sink)?;
                }
            }
        }

        debug!(
            "Parsed server status for {}: {} connected clients",
            name, connected_clients
        );
        sink.emit(Measurement::for_source(
            metrics::SERVER_CONNECTED_CLIENTS,
            connected_clients as f64,
            name,
        ))
    }
}

fn emit_row<S>(
    name: &str,
    key: &str,
    section: &SectionSchema,
    columns: &[String],
    fields: &[&str],
    sink: &mut S,
) -> Result<()>
where
    S: MeasurementSink + ?Sized,
{
    if fields.len() != columns.len() + 1 {
        return Err(ExporterError::ColumnCountMismatch {
            section: key.to_string(),
            expected: columns.len(),
            found: fields.len() - 1,
        });
    }

    let row: HashMap<&str, &str> = columns
        .iter()
        .map(String::as_str)
        .zip(fields[1..].iter().copied())
        .collect();

    let mut labels = Vec::with_capacity(section.label_columns.len() + 1);
    labels.push(name.to_string());
    labels.extend(
        section
            .label_columns
            .iter()
            .map(|column| row.get(column).copied().unwrap_or_default().to_string()),
    );

    for rule in &section.fields {
        let Some(raw) = row.get(rule.column) else {
            continue;
        };
        let value = raw
            .parse::<f64>()
            .map_err(|e| ExporterError::invalid_number(format!("{key} {}", rule.column), *raw, e))?;
        sink.emit(Measurement::new(rule.desc, value, labels.clone()))?;
    }

    Ok(())
}
