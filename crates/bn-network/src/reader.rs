//! OSM extract → [`Network`].
//!
//! # Phases
//!
//! 1. **Plan** (sequential): classify every way with the [`highway`] table,
//!    drop the ones carrying none of the requested modes.
//! 2. **Nodes** (sequential): every node referenced by a kept way becomes a
//!    network node, in way order, so ids are deterministic.  Coordinates are
//!    transformed into the working system when a transformation is set.
//! 3. **Links** (parallel with the `parallel` feature): each way's
//!    consecutive node pairs become links; the configured [`LinkObserver`]
//!    sees every link as soon as it exists.  Link ids are assigned in way
//!    order after all workers finish.
//!
//! Link lengths come from a snapshot of node positions taken between phases
//! 2 and 3, so observers rewriting positions concurrently cannot skew them.

use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashMap;

use bn_core::{Coord, CoordSpace, Crs, ModeSet, NodeId, TransportMode};
use bn_crs::CoordinateTransformation;

use crate::highway::{self, HighwayDefaults};
use crate::network::{Direction, Link, Network, NetworkBuilder, Position};
use crate::observer::{LinkCreated, LinkObserver, NoopObserver};
use crate::{NetworkError, NetworkResult};

// ── Extract ───────────────────────────────────────────────────────────────────

/// One OSM way: its id, node references in order, and tags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsmWay {
    pub id:   i64,
    pub refs: Vec<i64>,
    pub tags: Vec<(String, String)>,
}

impl OsmWay {
    pub fn new(id: i64, refs: Vec<i64>) -> Self {
        Self { id, refs, tags: Vec::new() }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        highway::tag(&self.tags, key)
    }
}

/// The subset of an OSM dataset network construction needs: node positions
/// (WGS84 degrees, `x` = longitude) and `highway=*` ways.
#[derive(Clone, Debug, Default)]
pub struct OsmExtract {
    pub nodes: FxHashMap<i64, Coord>,
    pub ways:  Vec<OsmWay>,
}

impl OsmExtract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, osm_id: i64, lon: f64, lat: f64) {
        self.nodes.insert(osm_id, Coord::new(lon, lat));
    }

    pub fn add_way(&mut self, way: OsmWay) {
        self.ways.push(way);
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Builds networks from OSM data.  Construct with [`OsmNetworkReader::builder`].
pub struct OsmNetworkReader<'a> {
    transformation: Option<Arc<dyn CoordinateTransformation>>,
    observer:       Box<dyn LinkObserver + 'a>,
    modes:          ModeSet,
}

/// Configures an [`OsmNetworkReader`].
pub struct OsmNetworkReaderBuilder<'a> {
    transformation: Option<Arc<dyn CoordinateTransformation>>,
    observer:       Box<dyn LinkObserver + 'a>,
    modes:          ModeSet,
}

impl<'a> OsmNetworkReaderBuilder<'a> {
    /// Transform node coordinates from WGS84 into `transformation.target()`.
    /// Without one, nodes stay geographic and are tagged `Source`.
    pub fn transformation(mut self, transformation: Arc<dyn CoordinateTransformation>) -> Self {
        self.transformation = Some(transformation);
        self
    }

    /// Invoke `observer` after every link is created.
    pub fn after_link_created<O: LinkObserver + 'a>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Modes to build the network for (default: bike and car).
    pub fn modes(mut self, modes: ModeSet) -> Self {
        self.modes = modes;
        self
    }

    pub fn build(self) -> OsmNetworkReader<'a> {
        OsmNetworkReader {
            transformation: self.transformation,
            observer:       self.observer,
            modes:          self.modes,
        }
    }
}

/// A kept way with its attributes resolved and its node pairs mapped.
struct WayPlan<'e> {
    way:           &'e OsmWay,
    modes:         ModeSet,
    forward:       bool,
    reverse:       bool,
    /// Bike-only link against a one-way direction.
    contraflow:    bool,
    freespeed_mps: f64,
    lanes:         f32,
    capacity:      f64,
    segments:      Vec<(NodeId, NodeId)>,
}

impl<'a> OsmNetworkReader<'a> {
    pub fn builder() -> OsmNetworkReaderBuilder<'a> {
        OsmNetworkReaderBuilder {
            transformation: None,
            observer:       Box::new(NoopObserver),
            modes:          ModeSet::of(&[TransportMode::Bike, TransportMode::Car]),
        }
    }

    pub fn modes(&self) -> ModeSet {
        self.modes
    }

    /// Build a network from `extract`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::Transform`] if a node coordinate cannot be
    /// transformed into the working system.
    pub fn read_extract(&self, extract: &OsmExtract) -> NetworkResult<Network> {
        // ── Phase 1: plan ways ──
        let mut plans: Vec<WayPlan<'_>> = extract
            .ways
            .iter()
            .filter_map(|way| self.plan(way))
            .collect();

        // ── Phase 2: nodes ──
        let mut builder = NetworkBuilder::new();
        builder.set_crs(Some(match &self.transformation {
            Some(t) => t.target().clone(),
            None    => Crs::WGS84,
        }));

        let mut node_ids: FxHashMap<i64, NodeId> = FxHashMap::default();
        let mut missing_refs = 0usize;
        for plan in &mut plans {
            let mut previous: Option<NodeId> = None;
            for &osm_id in &plan.way.refs {
                let Some(&coord) = extract.nodes.get(&osm_id) else {
                    missing_refs += 1;
                    previous = None;
                    continue;
                };
                let id = match node_ids.get(&osm_id) {
                    Some(&id) => id,
                    None => {
                        let (coord, space) = self.place(osm_id, coord)?;
                        let id = builder.add_osm_node(osm_id, coord, space);
                        node_ids.insert(osm_id, id);
                        id
                    }
                };
                if let Some(prev) = previous {
                    if prev != id {
                        plan.segments.push((prev, id));
                    }
                }
                previous = Some(id);
            }
        }
        if missing_refs > 0 {
            debug!("{missing_refs} way node references have no position; segments skipped");
        }

        // ── Phase 3: links ──
        let positions = builder.positions();
        let per_way = self.materialize_all(&builder, &positions, &plans);

        for link in per_way.into_iter().flatten() {
            builder.add_link(link);
        }
        debug!(
            "network built: {} ways kept of {}, {} nodes, {} links",
            plans.len(),
            extract.ways.len(),
            builder.node_count(),
            builder.link_count()
        );
        Ok(builder.build())
    }

    fn plan<'e>(&self, way: &'e OsmWay) -> Option<WayPlan<'e>> {
        let defaults: HighwayDefaults = highway::defaults(way.tag("highway")?)?;
        let modes = highway::bicycle_access(defaults.modes, &way.tags).intersection(self.modes);
        if modes.is_empty() || way.refs.len() < 2 {
            return None;
        }
        let (forward, reverse) = highway::directions(&defaults, &way.tags);
        let contraflow = forward != reverse
            && modes.contains(TransportMode::Bike)
            && highway::bike_contraflow(&way.tags);
        let lanes = highway::lanes_per_direction(&defaults, &way.tags, forward && reverse);

        Some(WayPlan {
            way,
            modes,
            forward,
            reverse,
            contraflow,
            freespeed_mps: highway::freespeed_mps(&defaults, &way.tags),
            lanes,
            capacity: defaults.capacity_per_lane * f64::from(lanes),
            segments: Vec::new(),
        })
    }

    /// Project an OSM coordinate into the working system, if one is set.
    fn place(&self, osm_id: i64, coord: Coord) -> NetworkResult<(Coord, CoordSpace)> {
        match &self.transformation {
            Some(t) => t
                .try_transform(coord)
                .map(|c| (c, CoordSpace::Working))
                .map_err(|source| NetworkError::Transform { osm_id, source }),
            None => Ok((coord, CoordSpace::Source)),
        }
    }

    #[cfg(feature = "parallel")]
    fn materialize_all(
        &self,
        builder: &NetworkBuilder,
        positions: &[Position],
        plans: &[WayPlan<'_>],
    ) -> Vec<Vec<Link>> {
        use rayon::prelude::*;
        plans
            .par_iter()
            .map(|plan| self.materialize(builder, positions, plan))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn materialize_all(
        &self,
        builder: &NetworkBuilder,
        positions: &[Position],
        plans: &[WayPlan<'_>],
    ) -> Vec<Vec<Link>> {
        plans
            .iter()
            .map(|plan| self.materialize(builder, positions, plan))
            .collect()
    }

    /// Links of one way, observer notified after each.
    fn materialize(
        &self,
        builder: &NetworkBuilder,
        positions: &[Position],
        plan: &WayPlan<'_>,
    ) -> Vec<Link> {
        let bike_only = ModeSet::EMPTY.with(TransportMode::Bike);
        let mut links = Vec::with_capacity(plan.segments.len() * 2);

        for &(a, b) in &plan.segments {
            let length_m = segment_length(positions[a.index()], positions[b.index()]);

            let forward_modes = match (plan.forward, plan.contraflow) {
                (true, _)     => Some(plan.modes),
                (false, true) => Some(bike_only),
                (false, false) => None,
            };
            let reverse_modes = match (plan.reverse, plan.contraflow) {
                (true, _)     => Some(plan.modes),
                (false, true) => Some(bike_only),
                (false, false) => None,
            };

            if let Some(modes) = forward_modes {
                links.push(self.emit(builder, plan, a, b, length_m, modes, Direction::Forward));
            }
            if let Some(modes) = reverse_modes {
                links.push(self.emit(builder, plan, b, a, length_m, modes, Direction::Reverse));
            }
        }
        links
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        builder: &NetworkBuilder,
        plan: &WayPlan<'_>,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        modes: ModeSet,
        direction: Direction,
    ) -> Link {
        let mut link = Link::new(from, to, length_m, modes);
        link.freespeed_mps  = plan.freespeed_mps;
        link.capacity_veh_h = plan.capacity;
        link.lanes          = plan.lanes;
        link.osm_way        = Some(plan.way.id);
        link.direction      = direction;

        self.observer.on_link_created(&LinkCreated {
            link: &link,
            from: builder.node_ref(from),
            to:   builder.node_ref(to),
            tags: &plan.way.tags,
        });
        link
    }
}

/// Planar distance between working-system positions, great-circle distance
/// otherwise.
fn segment_length(a: Position, b: Position) -> f64 {
    let working = a.space.resolve(a.coord) == CoordSpace::Working
        && b.space.resolve(b.coord) == CoordSpace::Working;
    if working {
        a.coord.distance(b.coord)
    } else {
        a.coord.haversine_m(b.coord)
    }
}
