//! Travel modes and mode sets.
//!
//! Links carry a [`ModeSet`]; network cleaning works per mode.  Mode names
//! follow the usual simulation vocabulary (`car`, `bike`, `walk`, `pt`) so
//! that written networks are readable by downstream simulators.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A single means of travel.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportMode {
    Bike,
    Car,
    Pt,
    Walk,
}

impl TransportMode {
    /// Every mode, in bit order (also the order used for display).
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Bike,
        TransportMode::Car,
        TransportMode::Pt,
        TransportMode::Walk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Bike => "bike",
            TransportMode::Car  => "car",
            TransportMode::Pt   => "pt",
            TransportMode::Walk => "walk",
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bike" | "bicycle" => Ok(TransportMode::Bike),
            "car"              => Ok(TransportMode::Car),
            "pt"               => Ok(TransportMode::Pt),
            "walk"             => Ok(TransportMode::Walk),
            other              => Err(CoreError::UnknownMode(other.to_owned())),
        }
    }
}

// ── ModeSet ───────────────────────────────────────────────────────────────────

/// A small copyable set of [`TransportMode`]s stored as a bit mask.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSet(u8);

impl ModeSet {
    pub const EMPTY: ModeSet = ModeSet(0);

    pub fn of(modes: &[TransportMode]) -> Self {
        modes.iter().fold(Self::EMPTY, |set, &m| set.with(m))
    }

    #[inline]
    pub const fn with(self, mode: TransportMode) -> Self {
        Self(self.0 | mode.bit())
    }

    #[inline]
    pub const fn without(self, mode: TransportMode) -> Self {
        Self(self.0 & !mode.bit())
    }

    #[inline]
    pub fn insert(&mut self, mode: TransportMode) {
        *self = self.with(mode);
    }

    #[inline]
    pub fn remove(&mut self, mode: TransportMode) {
        *self = self.without(mode);
    }

    #[inline]
    pub const fn contains(self, mode: TransportMode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[inline]
    pub fn intersects(self, other: ModeSet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn intersection(self, other: ModeSet) -> ModeSet {
        ModeSet(self.0 & other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = TransportMode> {
        TransportMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<TransportMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = TransportMode>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, m| set.with(m))
    }
}

/// Comma-separated, e.g. `bike,car`.
impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for mode in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(mode.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModeSet({self})")
    }
}

impl FromStr for ModeSet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<TransportMode>)
            .collect()
    }
}
