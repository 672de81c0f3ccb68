//! htcc-io: File I/O for HTCC reconstruction.
//!
//! This crate reads memory-mapped JSON Lines event files, writes cluster
//! records as CSV or fixed-size binary, and loads parameter files.
//!

pub mod config;
mod error;
mod reader;
mod writer;

pub use config::{load_parameters, parameters_from_json, parameters_to_json};
pub use error::{Error, Result};
pub use reader::{EventFileReader, EventIter, EventRecord, MappedFileReader};
pub use writer::{ClusterFileWriter, OutputFormat, BINARY_RECORD_SIZE, CSV_HEADER};
