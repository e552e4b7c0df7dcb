//! Server section schemas
//!
//! A schema says, for each data section of a server status file, which
//! columns become labels and which columns become metrics. Two variants
//! exist: aggregated (one series per common name) and detailed (one series
//! per session, including addresses and connection time).

use crate::metrics::{self, MetricDesc};
use std::collections::HashMap;

pub const CLIENT_LIST: &str = "CLIENT_LIST";
pub const ROUTING_TABLE: &str = "ROUTING_TABLE";

const CLIENT_COLUMNS_AGGREGATED: &[&str] = &["Common Name"];
const CLIENT_COLUMNS_DETAILED: &[&str] = &[
    "Common Name",
    "Connected Since (time_t)",
    "Real Address",
    "Virtual Address",
    "Username",
];
const ROUTE_COLUMNS_AGGREGATED: &[&str] = &["Common Name"];
const ROUTE_COLUMNS_DETAILED: &[&str] = &["Common Name", "Real Address", "Virtual Address"];

/// Extraction rule: parse `column` as a float and emit it as `desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub column: &'static str,
    pub desc: MetricDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSchema {
    /// Columns used as labels, after the source name, in label order
    pub label_columns: &'static [&'static str],
    pub fields: Vec<FieldRule>,
}

/// Immutable section table for one value of the ignore-individuals flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSchema {
    ignore_individuals: bool,
    sections: HashMap<&'static str, SectionSchema>,
}

impl ServerSchema {
    pub fn new(ignore_individuals: bool) -> Self {
        let (client_columns, route_columns) = if ignore_individuals {
            (CLIENT_COLUMNS_AGGREGATED, ROUTE_COLUMNS_AGGREGATED)
        } else {
            (CLIENT_COLUMNS_DETAILED, ROUTE_COLUMNS_DETAILED)
        };

        let (received, sent, last_ref) = if ignore_individuals {
            (
                metrics::SERVER_CLIENT_RECEIVED_BYTES_AGGREGATED,
                metrics::SERVER_CLIENT_SENT_BYTES_AGGREGATED,
                metrics::SERVER_ROUTE_LAST_REFERENCE_AGGREGATED,
            )
        } else {
            (
                metrics::SERVER_CLIENT_RECEIVED_BYTES_DETAILED,
                metrics::SERVER_CLIENT_SENT_BYTES_DETAILED,
                metrics::SERVER_ROUTE_LAST_REFERENCE_DETAILED,
            )
        };

        let mut sections = HashMap::new();
        sections.insert(
            CLIENT_LIST,
            SectionSchema {
                label_columns: client_columns,
                fields: vec![
                    FieldRule {
                        column: "Bytes Received",
                        desc: received,
                    },
                    FieldRule {
                        column: "Bytes Sent",
                        desc: sent,
                    },
                ],
            },
        );
        sections.insert(
            ROUTING_TABLE,
            SectionSchema {
                label_columns: route_columns,
                fields: vec![FieldRule {
                    column: "Last Ref (time_t)",
                    desc: last_ref,
                }],
            },
        );

        Self {
            ignore_individuals,
            sections,
        }
    }

    pub fn ignore_individuals(&self) -> bool {
        self.ignore_individuals
    }

    pub fn section(&self, key: &str) -> Option<&SectionSchema> {
        self.sections.get(key)
    }
}
