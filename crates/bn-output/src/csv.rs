//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `nodes.csv`: `node_id,osm_id,x,y,z`
//! - `links.csv`: `link_id,from,to,length_m,freespeed_mps,capacity_veh_h,lanes,modes`
//!
//! Missing `osm_id` and `z` are written as empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;
use log::debug;

use bn_network::Network;

use crate::writer::NetworkWriter;
use crate::OutputResult;

/// Writes a network to two CSV files.
pub struct CsvNetworkWriter {
    nodes: Writer<File>,
    links: Writer<File>,
}

impl CsvNetworkWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut nodes = Writer::from_path(dir.join("nodes.csv"))?;
        nodes.write_record(["node_id", "osm_id", "x", "y", "z"])?;

        let mut links = Writer::from_path(dir.join("links.csv"))?;
        links.write_record([
            "link_id",
            "from",
            "to",
            "length_m",
            "freespeed_mps",
            "capacity_veh_h",
            "lanes",
            "modes",
        ])?;

        Ok(Self { nodes, links })
    }
}

impl NetworkWriter for CsvNetworkWriter {
    fn write(&mut self, network: &Network) -> OutputResult<()> {
        for node in &network.nodes {
            self.nodes.write_record(&[
                node.id.0.to_string(),
                node.osm_id.map(|id| id.to_string()).unwrap_or_default(),
                node.coord.x.to_string(),
                node.coord.y.to_string(),
                node.coord.z.map(|z| z.to_string()).unwrap_or_default(),
            ])?;
        }
        for link in &network.links {
            self.links.write_record(&[
                link.id.0.to_string(),
                link.from.0.to_string(),
                link.to.0.to_string(),
                link.length_m.to_string(),
                link.freespeed_mps.to_string(),
                link.capacity_veh_h.to_string(),
                link.lanes.to_string(),
                link.modes.to_string(),
            ])?;
        }
        self.nodes.flush()?;
        self.links.flush()?;
        debug!("wrote {} nodes and {} links as CSV", network.node_count(), network.link_count());
        Ok(())
    }
}
