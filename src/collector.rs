//! OpenVPN Collector
//!
//! Walks every configured status source once per scrape and reports an
//! `openvpn_up` gauge for each of them.
//!
//! # Error Handling
//!
//! A failing source is logged as a warning and reported with `openvpn_up 0`;
//! the remaining sources are still read. Measurements a source produced
//! before it failed are kept.

use crate::config::StatusSourceConfig;
use crate::error::Result;
use crate::metrics::{self, Measurement, MeasurementSink, ScrapeRegistry};
use crate::status::StatusReader;
use std::fs::File;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Outcome of reading one status source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Up,
    Down,
}

impl SourceStatus {
    pub fn value(self) -> f64 {
        match self {
            SourceStatus::Up => 1.0,
            SourceStatus::Down => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenVpnCollector {
    sources: Vec<StatusSourceConfig>,
    reader: StatusReader,
}

impl OpenVpnCollector {
    pub fn new(sources: Vec<StatusSourceConfig>, ignore_individuals: bool) -> Self {
        Self {
            sources,
            reader: StatusReader::new(ignore_individuals),
        }
    }

    pub fn sources(&self) -> &[StatusSourceConfig] {
        &self.sources
    }

    /// Sources whose status file cannot be opened for reading
    pub fn unreadable_sources(&self) -> Vec<&StatusSourceConfig> {
        self.sources
            .iter()
            .filter(|source| match File::open(&source.path) {
                Ok(_) => false,
                Err(e) => {
                    warn!(
                        "Status file {} for {} unreadable: {}",
                        source.path, source.name, e
                    );
                    true
                }
            })
            .collect()
    }

    /// Reads every source in order, pushing measurements into `sink`
    ///
    /// Returns the availability of each source, in configuration order.
    pub fn collect<S>(&self, sink: &mut S) -> Result<Vec<SourceStatus>>
    where
        S: MeasurementSink + ?Sized,
    {
        let mut statuses = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let status = match self.reader.read_path(&source.name, &source.path, sink) {
                Ok(format) => {
                    info!("Read {:?} status for {}", format, source.name);
                    SourceStatus::Up
                }
                Err(e) => {
                    warn!(
                        "Failed to read status for {} from {}: {}",
                        source.name, source.path, e
                    );
                    SourceStatus::Down
                }
            };
            sink.emit(Measurement::for_source(
                metrics::UP,
                status.value(),
                &source.name,
            ))?;
            statuses.push(status);
        }

        Ok(statuses)
    }

    /// Runs one full scrape and renders it in Prometheus text format
    pub fn scrape(&self) -> anyhow::Result<String> {
        let mut registry = ScrapeRegistry::new();
        self.collect(&mut registry)?;
        registry.render()
    }
}

/// Runs scrapes one at a time on the blocking thread pool
///
/// The lock guard moves into the blocking task, so a scrape whose caller went
/// away still finishes before the next one starts.
#[derive(Debug, Clone)]
pub struct SerializedScraper {
    collector: Arc<OpenVpnCollector>,
    lock: Arc<Mutex<()>>,
}

impl SerializedScraper {
    pub fn new(collector: OpenVpnCollector) -> Self {
        Self {
            collector: Arc::new(collector),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn collector(&self) -> &Arc<OpenVpnCollector> {
        &self.collector
    }

    /// Whether a scrape currently holds the lock
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    pub async fn scrape(&self) -> anyhow::Result<String> {
        let guard = self.lock.clone().lock_owned().await;
        let collector = self.collector.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            collector.scrape()
        })
        .await?
    }
}
