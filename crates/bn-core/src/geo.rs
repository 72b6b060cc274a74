//! Coordinates and coordinate-space bookkeeping.
//!
//! A [`Coord`] is a plain `(x, y, z?)` triple; the reference system it lives
//! in is carried next to it, either as a network-wide [`Crs`](crate::Crs) or
//! per node as a [`CoordSpace`] tag.  `f64` throughout: projected systems
//! such as Belgian Lambert 72 put X/Y in the 10⁵–10⁶ range, where `f32`
//! would lose decimetres.

/// Largest |X| and |Y| still considered geographic degrees by
/// [`CoordSpace::detect`].
pub const GEOGRAPHIC_MAGNITUDE_LIMIT: f64 = 1_000.0;

/// Mean Earth radius in metres, used by [`Coord::haversine_m`].
const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ── Coord ─────────────────────────────────────────────────────────────────────

/// A 2-D or 3-D position.  For geographic systems `x` is longitude and `y`
/// latitude, both in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    #[inline]
    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// A copy of `self` with the elevation replaced.
    #[inline]
    pub fn with_z(self, z: f64) -> Self {
        Self { z: Some(z), ..self }
    }

    /// The horizontal part of `self`, elevation dropped.
    #[inline]
    pub fn xy(self) -> Self {
        Self { z: None, ..self }
    }

    /// `true` if X and Y are finite (Z is not inspected).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Planar Euclidean distance of the horizontal components.  Only
    /// meaningful in a projected, metric reference system.
    pub fn distance(self, other: Coord) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Great-circle distance in metres, treating `x`/`y` as lon/lat degrees.
    pub fn haversine_m(self, other: Coord) -> f64 {
        let d_lat = (other.y - self.y).to_radians();
        let d_lon = (other.x - self.x).to_radians();

        let lat1 = self.y.to_radians();
        let lat2 = other.y.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.z {
            Some(z) => write!(f, "({:.6}, {:.6}, {:.3})", self.x, self.y, z),
            None    => write!(f, "({:.6}, {:.6})", self.x, self.y),
        }
    }
}

// ── CoordSpace ────────────────────────────────────────────────────────────────

/// Which reference system a node's coordinate is currently expressed in.
///
/// During construction a network can hold raw geographic coordinates
/// (`Source`) next to projected ones (`Working`).  Producers that know the
/// answer set the tag; `Unknown` defers to [`CoordSpace::detect`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoordSpace {
    #[default]
    Unknown,
    /// Untransformed input system (WGS84 degrees for OSM data).
    Source,
    /// The network's working (projected) system.
    Working,
}

impl CoordSpace {
    /// Magnitude heuristic: degrees never exceed 1 000 in absolute value,
    /// projected metric systems over the supported areas always do.
    ///
    /// Only valid when the two systems are magnitude-separated; prefer an
    /// explicit tag where the producer knows it.
    pub fn detect(coord: Coord) -> CoordSpace {
        if coord.x.abs() < GEOGRAPHIC_MAGNITUDE_LIMIT && coord.y.abs() < GEOGRAPHIC_MAGNITUDE_LIMIT {
            CoordSpace::Source
        } else {
            CoordSpace::Working
        }
    }

    /// Resolve `Unknown` with [`detect`](Self::detect); known tags win.
    #[inline]
    pub fn resolve(self, coord: Coord) -> CoordSpace {
        match self {
            CoordSpace::Unknown => CoordSpace::detect(coord),
            known               => known,
        }
    }
}
