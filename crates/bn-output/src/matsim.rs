//! MATSim `network_v2` XML backend.
//!
//! ```text
//! <network>
//!   <attributes>   coordinateReferenceSystem
//!   <nodes>        id, x, y, z (when set)
//!   <links>        id, from, to, length, freespeed, capacity, permlanes,
//!                  oneway="1", modes; osm:way:id as a link attribute
//! </network>
//! ```
//!
//! Node ids are the OSM ids where known, `n<index>` otherwise.  Link ids are
//! the link indices.  Capacity is per hour (`capperiod="01:00:00"`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

use bn_core::ModeSet;
use bn_network::{Network, Node};

use crate::writer::NetworkWriter;
use crate::OutputResult;

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE network SYSTEM \"http://www.matsim.org/files/dtd/network_v2.dtd\">\n";

/// Writes a network to one XML file.
#[derive(Clone, Debug)]
pub struct MatsimXmlWriter {
    path: PathBuf,
}

impl MatsimXmlWriter {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    /// `true` when output goes through gzip.
    pub fn compressed(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "gz")
    }
}

impl NetworkWriter for MatsimXmlWriter {
    fn write(&mut self, network: &Network) -> OutputResult<()> {
        let file = BufWriter::new(File::create(&self.path)?);
        if self.compressed() {
            let mut gz = GzEncoder::new(file, Compression::default());
            write_matsim_xml(network, &mut gz)?;
            gz.finish()?.flush()?;
        } else {
            let mut file = file;
            write_matsim_xml(network, &mut file)?;
            file.flush()?;
        }
        debug!(
            "wrote {} nodes and {} links to {}",
            network.node_count(),
            network.link_count(),
            self.path.display()
        );
        Ok(())
    }
}

/// Serialize `network` as MATSim XML into `out`.
pub fn write_matsim_xml<W: Write>(network: &Network, out: &mut W) -> io::Result<()> {
    out.write_all(HEADER.as_bytes())?;
    writeln!(out, "<network>")?;

    if let Some(crs) = &network.crs {
        writeln!(out, "\t<attributes>")?;
        writeln!(
            out,
            "\t\t<attribute name=\"coordinateReferenceSystem\" class=\"java.lang.String\">{}</attribute>",
            escape(&crs.to_string())
        )?;
        writeln!(out, "\t</attributes>")?;
    }

    writeln!(out, "\t<nodes>")?;
    for node in &network.nodes {
        write!(out, "\t\t<node id=\"{}\" x=\"{}\" y=\"{}\"", node_id(node), node.coord.x, node.coord.y)?;
        if let Some(z) = node.coord.z {
            write!(out, " z=\"{z}\"")?;
        }
        writeln!(out, " />")?;
    }
    writeln!(out, "\t</nodes>")?;

    writeln!(
        out,
        "\t<links capperiod=\"01:00:00\" effectivecellsize=\"7.5\" effectivelanewidth=\"3.75\">"
    )?;
    for link in &network.links {
        let (Some(from), Some(to)) = (network.node(link.from), network.node(link.to)) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("link {} references a missing node", link.id),
            ));
        };
        write!(
            out,
            "\t\t<link id=\"{}\" from=\"{}\" to=\"{}\" length=\"{}\" freespeed=\"{}\" \
             capacity=\"{}\" permlanes=\"{}\" oneway=\"1\" modes=\"{}\"",
            link.id.0,
            node_id(from),
            node_id(to),
            link.length_m,
            link.freespeed_mps,
            link.capacity_veh_h,
            link.lanes,
            modes(link.modes),
        )?;
        match link.osm_way {
            Some(way) => {
                writeln!(out, ">")?;
                writeln!(out, "\t\t\t<attributes>")?;
                writeln!(
                    out,
                    "\t\t\t\t<attribute name=\"osm:way:id\" class=\"java.lang.Long\">{way}</attribute>"
                )?;
                writeln!(out, "\t\t\t</attributes>")?;
                writeln!(out, "\t\t</link>")?;
            }
            None => writeln!(out, " />")?,
        }
    }
    writeln!(out, "\t</links>")?;
    writeln!(out, "</network>")?;
    Ok(())
}

fn node_id(node: &Node) -> String {
    match node.osm_id {
        Some(osm) => osm.to_string(),
        None      => format!("n{}", node.id.0),
    }
}

fn modes(set: ModeSet) -> String {
    escape(&set.to_string())
}

/// Escape the five XML special characters.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c    => out.push(c),
        }
    }
    out
}
