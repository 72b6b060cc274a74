//! OSM PBF loading: enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use bn_network::OsmNetworkReader;
//!
//! let network = OsmNetworkReader::builder().build().read(Path::new("brussels.osm.pbf"))?;
//! ```
//!
//! # Memory note
//!
//! One sequential pass buffers every OSM node position (not just road
//! nodes) because ways reference nodes by id and may precede them in
//! unsorted files.  Untagged ways and non-`highway` features are dropped
//! while reading.

use std::path::Path;

use log::debug;
use osmpbf::{Element, ElementReader};

use crate::network::Network;
use crate::reader::{OsmExtract, OsmNetworkReader, OsmWay};
use crate::{NetworkError, NetworkResult};

impl OsmExtract {
    /// Read node positions and `highway=*` ways from a PBF file.
    ///
    /// # Errors
    ///
    /// [`NetworkError::Osm`] when the file cannot be opened or parsed.
    pub fn from_pbf(path: &Path) -> NetworkResult<OsmExtract> {
        let reader = ElementReader::from_path(path)
            .map_err(|e| NetworkError::Osm(format!("{}: {e}", path.display())))?;

        let mut extract = OsmExtract::new();
        reader
            .for_each(|element| match element {
                Element::Node(n)      => extract.add_node(n.id(), n.lon(), n.lat()),
                Element::DenseNode(n) => extract.add_node(n.id(), n.lon(), n.lat()),
                Element::Way(w) => {
                    if !w.tags().any(|(k, _)| k == "highway") {
                        return;
                    }
                    extract.add_way(OsmWay {
                        id:   w.id(),
                        refs: w.refs().collect(),
                        tags: w.tags().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
                    });
                }
                _ => {}
            })
            .map_err(|e| NetworkError::Osm(e.to_string()))?;

        debug!(
            "{}: {} nodes, {} highway ways",
            path.display(),
            extract.nodes.len(),
            extract.ways.len()
        );
        Ok(extract)
    }
}

impl OsmNetworkReader<'_> {
    /// Parse the PBF file at `path` and build a network from it.
    pub fn read(&self, path: &Path) -> NetworkResult<Network> {
        let extract = OsmExtract::from_pbf(path)?;
        self.read_extract(&extract)
    }
}
