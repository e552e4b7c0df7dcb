//! OpenVPN Prometheus Exporter
//!
//! Reads the status files written by OpenVPN's `--status` option and exposes
//! their contents as Prometheus metrics.
//!
//! # Overview
//!
//! Every scrape reads each configured status file from scratch. The exporter
//! sniffs the file layout (server status version 2 or 3, or client
//! statistics), parses it line by line and turns each numeric cell into a
//! labeled [`metrics::Measurement`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   --status file   ┌──────────────────────────┐
//! │   OpenVPN   │ ────────────────► │         Exporter         │
//! │   daemon    │                   │  ┌────────┐  ┌────────┐  │      HTTP      ┌────────────┐
//! └─────────────┘                   │  │ Reader │─►│Registry│  │ ◄────────────► │ Prometheus │
//!                                   │  └────────┘  └────────┘  │   /metrics     └────────────┘
//!                                   └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`status`] - Format detection and status file parsers
//! - [`metrics`] - Metric definitions, measurements and the per-scrape registry
//! - [`collector`] - Scrapes every configured source
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use openvpn_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! Parsing a status stream without the HTTP layer:
//!
//! ```
//! use openvpn_exporter::metrics::Measurement;
//! use openvpn_exporter::status::StatusReader;
//!
//! let status = "TITLE,OpenVPN 2.4\nTIME,,1600000100\nEND\n";
//! let mut measurements: Vec<Measurement> = Vec::new();
//! StatusReader::new(true)
//!     .read_from("vpn", status.as_bytes(), &mut measurements)
//!     .unwrap();
//! assert_eq!(measurements[0].value, 1600000100.0);
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod status;
