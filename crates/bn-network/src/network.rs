//! Network representation and builder.
//!
//! # Two shapes
//!
//! A [`NetworkBuilder`] is the *construction-time* graph.  Each node's
//! position sits behind its own `parking_lot::Mutex` so link observers
//! running on several threads can rewrite node positions while the builder is
//! shared immutably.  [`NetworkBuilder::build`] strips the locks and yields a
//! plain [`Network`].
//!
//! # Ids
//!
//! `NodeId`/`LinkId` are positions in `Network::nodes` / `Network::links`.
//! [`Network::compact`] renumbers both after removals, so ids are only stable
//! between structural edits.
//!
//! # Adjacency
//!
//! The network stores links as a flat list.  [`Adjacency`] derives
//! **Compressed Sparse Row** out/in lists on demand:
//!
//! ```text
//! out_links[ out_start[n] .. out_start[n+1] ]
//! ```

use parking_lot::{Mutex, MutexGuard};

use bn_core::{Coord, CoordSpace, Crs, LinkId, ModeSet, NodeId};

// ── Node / Link ───────────────────────────────────────────────────────────────

/// A node's coordinate together with the space it is expressed in.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub coord: Coord,
    pub space: CoordSpace,
}

impl Position {
    pub fn new(coord: Coord, space: CoordSpace) -> Self {
        Self { coord, space }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:     NodeId,
    /// Source OSM node, if the node came from OSM.
    pub osm_id: Option<i64>,
    pub coord:  Coord,
    pub space:  CoordSpace,
}

/// Whether a link runs along its OSM way's node order or against it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// A directed link between two nodes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub id:             LinkId,
    pub from:           NodeId,
    pub to:             NodeId,
    /// Length in metres.
    pub length_m:       f64,
    pub freespeed_mps:  f64,
    /// Vehicles per hour.
    pub capacity_veh_h: f64,
    pub lanes:          f32,
    pub modes:          ModeSet,
    pub osm_way:        Option<i64>,
    pub direction:      Direction,
}

impl Link {
    /// A link with no id yet; [`NetworkBuilder::add_link`] assigns one.
    pub fn new(from: NodeId, to: NodeId, length_m: f64, modes: ModeSet) -> Self {
        Self {
            id: LinkId::INVALID,
            from,
            to,
            length_m,
            freespeed_mps:  13.9,
            capacity_veh_h: 600.0,
            lanes:          1.0,
            modes,
            osm_way:        None,
            direction:      Direction::Forward,
        }
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// A directed multi-modal road network.
///
/// Fields are `pub` for direct indexed access; keep `nodes[i].id == NodeId(i)`
/// and `links[i].id == LinkId(i)` when editing by hand.
#[derive(Clone, Debug, Default)]
pub struct Network {
    /// Reference system of node coordinates tagged `Working`.
    pub crs:   Option<Crs>,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Network {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// CSR out/in link lists over every link.
    pub fn adjacency(&self) -> Adjacency {
        Adjacency::build(self, |_| true)
    }

    /// Drop links rejected by `keep`, then every node no remaining link
    /// touches, and renumber both.
    ///
    /// Returns `(nodes_removed, links_removed)`.
    pub fn compact<F: FnMut(&Link) -> bool>(&mut self, mut keep: F) -> (usize, usize) {
        let links_before = self.links.len();
        let nodes_before = self.nodes.len();

        self.links.retain(|l| keep(l));

        let mut used = vec![false; self.nodes.len()];
        for l in &self.links {
            used[l.from.index()] = true;
            used[l.to.index()] = true;
        }

        // Old index → new NodeId.
        let mut remap = vec![NodeId::INVALID; self.nodes.len()];
        let mut next = 0u32;
        for (old, node) in self.nodes.iter_mut().enumerate() {
            if used[old] {
                remap[old] = NodeId(next);
                node.id = NodeId(next);
                next += 1;
            }
        }
        let mut index = 0;
        self.nodes.retain(|_| {
            let keep = used[index];
            index += 1;
            keep
        });

        for (i, l) in self.links.iter_mut().enumerate() {
            l.id = LinkId(i as u32);
            l.from = remap[l.from.index()];
            l.to = remap[l.to.index()];
        }

        (nodes_before - self.nodes.len(), links_before - self.links.len())
    }
}

// ── Adjacency ─────────────────────────────────────────────────────────────────

/// Out- and in-link lists per node in CSR layout.
#[derive(Clone, Debug)]
pub struct Adjacency {
    out_start: Vec<u32>,
    out_links: Vec<LinkId>,
    in_start:  Vec<u32>,
    in_links:  Vec<LinkId>,
}

impl Adjacency {
    /// Build over the links accepted by `filter`.
    pub fn build<F: Fn(&Link) -> bool>(network: &Network, filter: F) -> Self {
        let n = network.node_count();
        let selected: Vec<&Link> = network.links.iter().filter(|l| filter(l)).collect();

        let (out_start, out_links) = csr(n, &selected, |l| l.from);
        let (in_start, in_links)   = csr(n, &selected, |l| l.to);
        Self { out_start, out_links, in_start, in_links }
    }

    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        let start = self.out_start[node.index()] as usize;
        let end   = self.out_start[node.index() + 1] as usize;
        &self.out_links[start..end]
    }

    #[inline]
    pub fn in_links(&self, node: NodeId) -> &[LinkId] {
        let start = self.in_start[node.index()] as usize;
        let end   = self.in_start[node.index() + 1] as usize;
        &self.in_links[start..end]
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_links(node).len()
    }
}

/// Counting sort of `links` by `key` into a row-pointer + id array.
fn csr(n: usize, links: &[&Link], key: impl Fn(&Link) -> NodeId) -> (Vec<u32>, Vec<LinkId>) {
    let mut start = vec![0u32; n + 1];
    for l in links {
        start[key(l).index() + 1] += 1;
    }
    for i in 1..=n {
        start[i] += start[i - 1];
    }
    let mut fill = start.clone();
    let mut ids = vec![LinkId::INVALID; links.len()];
    for l in links {
        let slot = &mut fill[key(l).index()];
        ids[*slot as usize] = l.id;
        *slot += 1;
    }
    (start, ids)
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// A construction-time node: identity is fixed, position is lockable.
#[derive(Debug)]
pub struct NodeCell {
    osm_id:   Option<i64>,
    position: Mutex<Position>,
}

/// Borrowed handle to a node under construction.
///
/// Handed to [`LinkObserver`](crate::LinkObserver)s.  All position access
/// goes through the node's lock.
#[derive(Copy, Clone, Debug)]
pub struct NodeRef<'a> {
    id:   NodeId,
    cell: &'a NodeCell,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn osm_id(&self) -> Option<i64> {
        self.cell.osm_id
    }

    /// A copy of the current position.
    pub fn position(&self) -> Position {
        *self.cell.position.lock()
    }

    /// Exclusive access to the position for a read-modify-write.
    pub fn lock(&self) -> MutexGuard<'a, Position> {
        self.cell.position.lock()
    }
}

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use bn_core::{Coord, CoordSpace, ModeSet, TransportMode};
/// use bn_network::{Link, NetworkBuilder};
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_node(Coord::new(150_000.0, 170_000.0), CoordSpace::Working);
/// let c = b.add_node(Coord::new(150_100.0, 170_000.0), CoordSpace::Working);
/// b.add_link(Link::new(a, c, 100.0, ModeSet::of(&[TransportMode::Bike])));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.link_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    crs:   Option<Crs>,
    nodes: Vec<NodeCell>,
    links: Vec<Link>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and links.
    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            crs:   None,
            nodes: Vec::with_capacity(nodes),
            links: Vec::with_capacity(links),
        }
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, coord: Coord, space: CoordSpace) -> NodeId {
        self.push_node(None, coord, space)
    }

    pub fn add_osm_node(&mut self, osm_id: i64, coord: Coord, space: CoordSpace) -> NodeId {
        self.push_node(Some(osm_id), coord, space)
    }

    fn push_node(&mut self, osm_id: Option<i64>, coord: Coord, space: CoordSpace) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeCell {
            osm_id,
            position: Mutex::new(Position::new(coord, space)),
        });
        id
    }

    /// Add a link, assigning the next `LinkId`.
    pub fn add_link(&mut self, mut link: Link) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        link.id = id;
        self.links.push(link);
        id
    }

    /// Handle to node `id`.
    ///
    /// # Panics
    ///
    /// If `id` was not returned by this builder.
    pub fn node_ref(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { id, cell: &self.nodes[id.index()] }
    }

    /// Copy of every node's current position, indexed by `NodeId`.
    pub fn positions(&self) -> Vec<Position> {
        self.nodes.iter().map(|n| *n.position.lock()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Consume the builder and produce a [`Network`].
    pub fn build(self) -> Network {
        let nodes = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let Position { coord, space } = cell.position.into_inner();
                Node { id: NodeId(i as u32), osm_id: cell.osm_id, coord, space }
            })
            .collect();

        Network { crs: self.crs, nodes, links: self.links }
    }
}
