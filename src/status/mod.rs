//! OpenVPN status file parsing
//!
//! - [`format`] - sniffs which of the three status layouts a source uses
//! - [`schema`] - label/metric tables for server sections
//! - [`server`] - server-mode parser (status versions 2 and 3)
//! - [`client`] - client-mode statistics parser
//! - [`reader`] - ties detection and parsing together for one source

pub mod client;
pub mod format;
pub mod reader;
pub mod schema;
pub mod server;

pub use client::ClientParser;
pub use format::{detect, StatusFormat};
pub use reader::StatusReader;
pub use schema::{SectionSchema, ServerSchema};
pub use server::ServerParser;
