//! Prometheus Metrics Definitions
//!
//! This module defines every metric the OpenVPN exporter can emit, the
//! [`Measurement`] type the status parsers produce, and the per-scrape
//! Prometheus registry that turns measurements into exposition text.
//!
//! # Metric Categories
//!
//! ## Exporter
//! - `openvpn_up` - whether reading a status source succeeded
//! - `openvpn_status_update_time_seconds` - when the daemon last rewrote the file
//!
//! ## Server mode
//! - Per-client traffic counters from `CLIENT_LIST` rows
//! - Route freshness from `ROUTING_TABLE` rows
//! - Number of connected clients
//!
//! ## Client mode
//! - TUN/TAP, TCP/UDP, auth and compression byte counters
//!
//! # Metric Types
//!
//! - **Counter**: monotonically increasing totals (`*_bytes_total`)
//! - **Gauge**: point-in-time values (timestamps, client counts, availability)
//!
//! All metrics use the `openvpn_` namespace prefix.

use crate::error::{ExporterError, Result};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use tracing::debug;

/// Whether a metric only ever grows or reflects a point-in-time value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Counter,
    Gauge,
}

/// Static identity of a metric: name, help text, kind and label names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: ValueKind,
    pub labels: &'static [&'static str],
}

const NAME_LABEL: &[&str] = &["name"];

pub const SERVER_CLIENT_LABELS_AGGREGATED: &[&str] = &["name", "common_name"];
pub const SERVER_CLIENT_LABELS_DETAILED: &[&str] = &[
    "name",
    "common_name",
    "connection_time",
    "real_address",
    "virtual_address",
    "username",
];
pub const SERVER_ROUTE_LABELS_AGGREGATED: &[&str] = &["name", "common_name"];
pub const SERVER_ROUTE_LABELS_DETAILED: &[&str] =
    &["name", "common_name", "real_address", "virtual_address"];

pub const UP: MetricDesc = MetricDesc {
    name: "openvpn_up",
    help: "Whether scraping OpenVPN's metrics was successful.",
    kind: ValueKind::Gauge,
    labels: NAME_LABEL,
};

pub const STATUS_UPDATE_TIME: MetricDesc = MetricDesc {
    name: "openvpn_status_update_time_seconds",
    help: "UNIX timestamp at which the OpenVPN statistics were updated.",
    kind: ValueKind::Gauge,
    labels: NAME_LABEL,
};

pub const SERVER_CONNECTED_CLIENTS: MetricDesc = MetricDesc {
    name: "openvpn_server_connected_clients",
    help: "Number Of Connected Clients",
    kind: ValueKind::Gauge,
    labels: NAME_LABEL,
};

const fn server_client_received(labels: &'static [&'static str]) -> MetricDesc {
    MetricDesc {
        name: "openvpn_server_client_received_bytes_total",
        help: "Amount of data received over a connection on the VPN server, in bytes.",
        kind: ValueKind::Counter,
        labels,
    }
}

const fn server_client_sent(labels: &'static [&'static str]) -> MetricDesc {
    MetricDesc {
        name: "openvpn_server_client_sent_bytes_total",
        help: "Amount of data sent over a connection on the VPN server, in bytes.",
        kind: ValueKind::Counter,
        labels,
    }
}

const fn server_route_last_reference(labels: &'static [&'static str]) -> MetricDesc {
    MetricDesc {
        name: "openvpn_server_route_last_reference_time_seconds",
        help: "Time at which a route was last referenced, in seconds.",
        kind: ValueKind::Gauge,
        labels,
    }
}

pub const SERVER_CLIENT_RECEIVED_BYTES_AGGREGATED: MetricDesc =
    server_client_received(SERVER_CLIENT_LABELS_AGGREGATED);
pub const SERVER_CLIENT_RECEIVED_BYTES_DETAILED: MetricDesc =
    server_client_received(SERVER_CLIENT_LABELS_DETAILED);
pub const SERVER_CLIENT_SENT_BYTES_AGGREGATED: MetricDesc =
    server_client_sent(SERVER_CLIENT_LABELS_AGGREGATED);
pub const SERVER_CLIENT_SENT_BYTES_DETAILED: MetricDesc =
    server_client_sent(SERVER_CLIENT_LABELS_DETAILED);
pub const SERVER_ROUTE_LAST_REFERENCE_AGGREGATED: MetricDesc =
    server_route_last_reference(SERVER_ROUTE_LABELS_AGGREGATED);
pub const SERVER_ROUTE_LAST_REFERENCE_DETAILED: MetricDesc =
    server_route_last_reference(SERVER_ROUTE_LABELS_DETAILED);

const fn client_counter(name: &'static str, help: &'static str) -> MetricDesc {
    MetricDesc {
        name,
        help,
        kind: ValueKind::Counter,
        labels: NAME_LABEL,
    }
}

/// Client-mode statistics keyed by the exact line prefix OpenVPN writes
pub const CLIENT_STATISTICS: &[(&str, MetricDesc)] = &[
    (
        "TUN/TAP read bytes",
        client_counter(
            "openvpn_client_tun_tap_read_bytes_total",
            "Total amount of TUN/TAP traffic read, in bytes.",
        ),
    ),
    (
        "TUN/TAP write bytes",
        client_counter(
            "openvpn_client_tun_tap_write_bytes_total",
            "Total amount of TUN/TAP traffic written, in bytes.",
        ),
    ),
    (
        "TCP/UDP read bytes",
        client_counter(
            "openvpn_client_tcp_udp_read_bytes_total",
            "Total amount of TCP/UDP traffic read, in bytes.",
        ),
    ),
    (
        "TCP/UDP write bytes",
        client_counter(
            "openvpn_client_tcp_udp_write_bytes_total",
            "Total amount of TCP/UDP traffic written, in bytes.",
        ),
    ),
    (
        "Auth read bytes",
        client_counter(
            "openvpn_client_auth_read_bytes_total",
            "Total amount of authentication traffic read, in bytes.",
        ),
    ),
    (
        "pre-compress bytes",
        client_counter(
            "openvpn_client_pre_compress_bytes_total",
            "Total amount of data before compression, in bytes.",
        ),
    ),
    (
        "post-compress bytes",
        client_counter(
            "openvpn_client_post_compress_bytes_total",
            "Total amount of data after compression, in bytes.",
        ),
    ),
    (
        "pre-decompress bytes",
        client_counter(
            "openvpn_client_pre_decompress_bytes_total",
            "Total amount of data before decompression, in bytes.",
        ),
    ),
    (
        "post-decompress bytes",
        client_counter(
            "openvpn_client_post_decompress_bytes_total",
            "Total amount of data after decompression, in bytes.",
        ),
    ),
];

/// One numeric sample produced while parsing a status source
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub desc: MetricDesc,
    pub value: f64,
    /// Label values, in the order of `desc.labels`
    pub labels: Vec<String>,
}

impl Measurement {
    pub fn new(desc: MetricDesc, value: f64, labels: Vec<String>) -> Self {
        debug_assert_eq!(
            desc.labels.len(),
            labels.len(),
            "label arity mismatch for {}",
            desc.name
        );
        Self {
            desc,
            value,
            labels,
        }
    }

    /// Measurement labeled only by the status source name
    pub fn for_source(desc: MetricDesc, value: f64, source: &str) -> Self {
        Self::new(desc, value, vec![source.to_string()])
    }

    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    pub fn kind(&self) -> ValueKind {
        self.desc.kind
    }
}

/// Destination for measurements as they are produced
///
/// Parsers push each measurement as soon as it is known, so a sink sees every
/// sample emitted before a parse error aborts the source.
pub trait MeasurementSink {
    fn emit(&mut self, measurement: Measurement) -> Result<()>;
}

impl MeasurementSink for Vec<Measurement> {
    fn emit(&mut self, measurement: Measurement) -> Result<()> {
        self.push(measurement);
        Ok(())
    }
}

enum Family {
    Counter(CounterVec),
    Gauge(GaugeVec),
}

/// Prometheus registry holding the results of exactly one scrape
///
/// Metric vectors are created on first use. Counters accumulate, so two rows
/// sharing a label set are summed; gauges keep the last value written.
pub struct ScrapeRegistry {
    registry: Registry,
    families: HashMap<&'static str, Family>,
}

impl ScrapeRegistry {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            families: HashMap::new(),
        }
    }

    fn family(&mut self, desc: &MetricDesc) -> Result<&Family> {
        if !self.families.contains_key(desc.name) {
            let opts = Opts::new(desc.name, desc.help);
            let family = match desc.kind {
                ValueKind::Counter => {
                    let vec = CounterVec::new(opts, desc.labels)?;
                    self.registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
                ValueKind::Gauge => {
                    let vec = GaugeVec::new(opts, desc.labels)?;
                    self.registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
            };
            debug!("Registered metric family {}", desc.name);
            self.families.insert(desc.name, family);
        }
        Ok(&self.families[desc.name])
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for ScrapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementSink for ScrapeRegistry {
    fn emit(&mut self, measurement: Measurement) -> Result<()> {
        let desc = measurement.desc;
        if desc.labels.len() != measurement.labels.len() {
            return Err(ExporterError::LabelArity {
                metric: desc.name,
                expected: desc.labels.len(),
                found: measurement.labels.len(),
            });
        }

        let values: Vec<&str> = measurement.labels.iter().map(String::as_str).collect();
        match self.family(&desc)? {
            Family::Counter(vec) => {
                // NaN fails this comparison too
                if !(measurement.value >= 0.0) {
                    return Err(ExporterError::InvalidCounterValue {
                        metric: desc.name,
                        value: measurement.value,
                    });
                }
                vec.get_metric_with_label_values(&values)?
                    .inc_by(measurement.value);
            }
            Family::Gauge(vec) => {
                vec.get_metric_with_label_values(&values)?
                    .set(measurement.value);
            }
        }
        Ok(())
    }
}
