//! `bn-output`: network writers for the bikenet workspace.
//!
//! | Backend             | Files created                                   |
//! |---------------------|-------------------------------------------------|
//! | [`MatsimXmlWriter`] | one MATSim `network_v2` XML file, gzipped for `.gz` |
//! | [`CsvNetworkWriter`]| `nodes.csv`, `links.csv`                        |
//!
//! All backends implement [`NetworkWriter`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use bn_output::write_network;
//!
//! write_network(&network, Path::new("elevation_merged.xml.gz"))?;
//! ```

pub mod csv;
pub mod error;
pub mod matsim;
pub mod writer;


use std::path::Path;

pub use crate::csv::CsvNetworkWriter;
pub use error::{OutputError, OutputResult};
pub use matsim::{write_matsim_xml, MatsimXmlWriter};
pub use writer::NetworkWriter;

/// Write `network` as MATSim XML to `path`, gzip-compressed when the file
/// name ends in `.gz`.
pub fn write_network(network: &bn_network::Network, path: &Path) -> OutputResult<()> {
    MatsimXmlWriter::new(path).write(network)
}
