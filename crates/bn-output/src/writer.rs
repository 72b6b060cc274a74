//! The `NetworkWriter` trait implemented by all backends.

use bn_network::Network;

use crate::OutputResult;

/// Serializes a finished [`Network`].
pub trait NetworkWriter {
    /// Write `network` in full.  Files are complete and flushed when this
    /// returns `Ok`.
    fn write(&mut self, network: &Network) -> OutputResult<()>;
}
