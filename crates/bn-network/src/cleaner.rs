//! Mode-aware network cleaning.
//!
//! For every requested mode, only the largest strongly connected part of
//! that mode's sub-network survives: any trip between two of its nodes can
//! be routed, in both directions.  Links outside it lose the mode; links
//! left without modes are dropped together with the nodes they isolate.

use log::{debug, info};

use bn_core::{ModeSet, NodeId, TransportMode};

use crate::network::{Adjacency, Network};

/// Outcome of [`clean`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CleanReport {
    pub nodes_removed:  usize,
    pub links_removed:  usize,
    /// `(link, mode)` pairs stripped, summed over modes.
    pub modes_stripped: usize,
}

/// Reduce each mode in `modes` to its largest strongly connected component,
/// then compact the network.  Modes outside `modes` are untouched.
pub fn clean(network: &mut Network, modes: &ModeSet) -> CleanReport {
    let mut report = CleanReport::default();

    for mode in modes.iter() {
        let stripped = keep_largest_component(network, mode);
        debug!("clean {mode}: {stripped} links lose the mode");
        report.modes_stripped += stripped;
    }

    let (nodes_removed, links_removed) = network.compact(|l| !l.modes.is_empty());
    report.nodes_removed = nodes_removed;
    report.links_removed = links_removed;

    info!(
        "cleaned network: {} nodes and {} links removed, {} mode assignments stripped",
        nodes_removed, links_removed, report.modes_stripped
    );
    report
}

/// Strip `mode` from every link outside the mode's largest SCC.  Returns the
/// number of links changed.
fn keep_largest_component(network: &mut Network, mode: TransportMode) -> usize {
    if !network.links.iter().any(|l| l.modes.contains(mode)) {
        return 0;
    }
    let adjacency = Adjacency::build(network, |l| l.modes.contains(mode));
    let components = strongly_connected(network, &adjacency);
    let Some(best) = components.largest() else {
        return 0;
    };

    let mut stripped = 0;
    for link in &mut network.links {
        if !link.modes.contains(mode) {
            continue;
        }
        let inside = components.of(link.from) == Some(best) && components.of(link.to) == Some(best);
        if !inside {
            link.modes.remove(mode);
            stripped += 1;
        }
    }
    stripped
}

// ── Tarjan ────────────────────────────────────────────────────────────────────

const UNVISITED: u32 = u32::MAX;

/// Component id per node; `UNVISITED` for nodes without links in the
/// adjacency.
struct Components {
    of_node: Vec<u32>,
    sizes:   Vec<usize>,
    /// Lowest node index in each component.
    min_node: Vec<usize>,
}

impl Components {
    fn of(&self, node: NodeId) -> Option<u32> {
        match self.of_node[node.index()] {
            UNVISITED => None,
            c         => Some(c),
        }
    }

    /// The biggest component; ties go to the one holding the lowest node id.
    fn largest(&self) -> Option<u32> {
        (0..self.sizes.len())
            .max_by(|&a, &b| {
                self.sizes[a]
                    .cmp(&self.sizes[b])
                    .then(self.min_node[b].cmp(&self.min_node[a]))
            })
            .map(|c| c as u32)
    }
}

/// Iterative Tarjan; recursion would overflow on city-sized networks.
fn strongly_connected(network: &Network, adjacency: &Adjacency) -> Components {
    let n = network.node_count();
    let mut index    = vec![UNVISITED; n];
    let mut low      = vec![0u32; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    // (node, position in its out-link list)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    let mut components = Components { of_node: vec![UNVISITED; n], sizes: Vec::new(), min_node: Vec::new() };
    let mut next_index = 0u32;

    for root in 0..n {
        let root_id = NodeId(root as u32);
        if index[root] != UNVISITED
            || (adjacency.out_degree(root_id) == 0 && adjacency.in_links(root_id).is_empty())
        {
            continue;
        }

        index[root] = next_index;
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            let out = adjacency.out_links(NodeId(v as u32));

            if frame.1 < out.len() {
                let w = network.links[out[frame.1].index()].to.index();
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    low[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == index[v] {
                let component = components.sizes.len() as u32;
                let mut size = 0;
                let mut min_node = v;
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    components.of_node[w] = component;
                    size += 1;
                    min_node = min_node.min(w);
                    if w == v {
                        break;
                    }
                }
                components.sizes.push(size);
                components.min_node.push(min_node);
            }
        }
    }
    components
}
