//! uam library - consolidation engine for device model databases.
//!
//! This library exposes the core functionality of the `uam` CLI for use in
//! tests and other tools.
//!
//! # Modules
//!
//! - `models`: The brand → model store, alias resolution, name dedup and sort order
//! - `extract`: Brand/model extraction from raw user agents
//! - `import`: Bulk user-agent and tab-separated row input
//! - `persist`: Loading and saving the store as YAML or JSON
//! - `report`: Tab-separated diagnostic report
//! - `session`: Load → mutate → save runs used by the CLI
//! - `config`: Configuration file handling
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod import;
pub mod logging;
pub mod models;
pub mod persist;
pub mod report;
pub mod session;
pub mod ualist;
