//! `highway=*` defaults and bicycle access.
//!
//! A deliberately small table in the spirit of common simulation network
//! converters: one row per road class giving free speed, lanes per
//! direction, capacity per lane, the modes allowed, and whether the class is
//! one-way by default.  Tags on the way override the defaults:
//!
//! | Tag                           | Effect                                   |
//! |-------------------------------|------------------------------------------|
//! | `maxspeed`                    | free speed (`50`, `30 mph`)              |
//! | `lanes`                       | total lanes, split over both directions  |
//! | `oneway` = `yes`/`1`/`true`   | forward only                             |
//! | `oneway` = `-1`/`reverse`     | reverse only                             |
//! | `oneway` = `no`               | both directions                          |
//! | `junction=roundabout`         | one-way                                  |
//! | `bicycle` = `yes`/`designated`| adds bike                                |
//! | `bicycle` = `no`/`dismount`   | removes bike                             |
//! | `oneway:bicycle=no`, `cycleway=opposite*` | bike-only reverse on one-way roads |

use bn_core::{ModeSet, TransportMode};

const KMH_PER_MPS: f64 = 3.6;
const KMH_PER_MPH: f64 = 1.609_344;

/// Defaults for one road class.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HighwayDefaults {
    pub freespeed_kmh:     f64,
    /// Lanes per direction.
    pub lanes:             f32,
    /// Vehicles per hour per lane.
    pub capacity_per_lane: f64,
    pub modes:             ModeSet,
    pub oneway:            bool,
}

const CAR:      ModeSet = ModeSet::EMPTY.with(TransportMode::Car);
const BIKE:     ModeSet = ModeSet::EMPTY.with(TransportMode::Bike);
const CAR_BIKE: ModeSet = CAR.with(TransportMode::Bike);

/// Defaults for `highway` value `highway`, or `None` for classes that are
/// not part of the road network (buildings, platforms, proposed roads…).
pub fn defaults(highway: &str) -> Option<HighwayDefaults> {
    let row = |freespeed_kmh, lanes, capacity_per_lane, modes, oneway| HighwayDefaults {
        freespeed_kmh,
        lanes,
        capacity_per_lane,
        modes,
        oneway,
    };
    let d = match highway {
        "motorway"                     => row(120.0, 2.0, 2000.0, CAR, true),
        "motorway_link"                => row(80.0, 1.0, 1500.0, CAR, true),
        "trunk"                        => row(80.0, 1.0, 2000.0, CAR, false),
        "trunk_link"                   => row(50.0, 1.0, 1500.0, CAR, false),
        "primary" | "primary_link"     => row(50.0, 1.0, 1500.0, CAR_BIKE, false),
        "secondary" | "secondary_link" => row(50.0, 1.0, 1000.0, CAR_BIKE, false),
        "tertiary" | "tertiary_link"   => row(50.0, 1.0, 600.0, CAR_BIKE, false),
        "unclassified"                 => row(45.0, 1.0, 600.0, CAR_BIKE, false),
        "residential"                  => row(30.0, 1.0, 600.0, CAR_BIKE, false),
        "living_street"                => row(15.0, 1.0, 300.0, CAR_BIKE, false),
        "service"                      => row(15.0, 1.0, 300.0, CAR_BIKE, false),
        "cycleway"                     => row(20.0, 1.0, 600.0, BIKE, false),
        "track"                        => row(15.0, 1.0, 300.0, BIKE, false),
        // Foot infrastructure joins the network only where cycling is
        // signed; see `bicycle_access`.
        "path" | "footway" | "pedestrian" | "bridleway" | "steps"
                                       => row(10.0, 1.0, 300.0, ModeSet::EMPTY, false),
        _                              => return None,
    };
    Some(d)
}

/// Look up `key` in `tags`.
pub fn tag<'t>(tags: &'t [(String, String)], key: &str) -> Option<&'t str> {
    tags.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Apply the `bicycle=*` access tag to `modes`.
pub fn bicycle_access(modes: ModeSet, tags: &[(String, String)]) -> ModeSet {
    match tag(tags, "bicycle") {
        Some("yes" | "designated" | "permissive") => modes.with(TransportMode::Bike),
        Some("no" | "dismount" | "use_sidepath")  => modes.without(TransportMode::Bike),
        _                                         => modes,
    }
}

/// `(forward, reverse)` traffic directions permitted by the oneway tags.
pub fn directions(defaults: &HighwayDefaults, tags: &[(String, String)]) -> (bool, bool) {
    match tag(tags, "oneway") {
        Some("yes" | "1" | "true")  => (true, false),
        Some("-1" | "reverse")      => (false, true),
        Some("no" | "0" | "false")  => (true, true),
        _ if tag(tags, "junction") == Some("roundabout") => (true, false),
        _ if defaults.oneway        => (true, false),
        _                           => (true, true),
    }
}

/// `true` if cyclists may ride against a one-way street.
pub fn bike_contraflow(tags: &[(String, String)]) -> bool {
    tag(tags, "oneway:bicycle") == Some("no")
        || tag(tags, "cycleway").is_some_and(|v| v.starts_with("opposite"))
}

/// Free speed in m/s: the `maxspeed` tag when it parses, else the default.
pub fn freespeed_mps(defaults: &HighwayDefaults, tags: &[(String, String)]) -> f64 {
    let kmh = tag(tags, "maxspeed")
        .and_then(parse_maxspeed_kmh)
        .unwrap_or(defaults.freespeed_kmh);
    kmh / KMH_PER_MPS
}

/// Parse `"50"`, `"50 km/h"` or `"30 mph"`.  Symbolic values (`none`,
/// `walk`, `BE:urban`) yield `None`.
pub fn parse_maxspeed_kmh(value: &str) -> Option<f64> {
    let value = value.trim();
    let digits_end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let number: f64 = value[..digits_end].parse().ok()?;
    if !number.is_finite() || number <= 0.0 {
        return None;
    }
    if value[digits_end..].trim() == "mph" {
        Some(number * KMH_PER_MPH)
    } else {
        Some(number)
    }
}

/// Lanes per direction: the `lanes` tag (total) split over the permitted
/// directions, never below one.
pub fn lanes_per_direction(defaults: &HighwayDefaults, tags: &[(String, String)], both_ways: bool) -> f32 {
    match tag(tags, "lanes")
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
    {
        Some(total) if total > 0.0 => {
            let per = if both_ways { total / 2.0 } else { total };
            per.max(1.0)
        }
        _ => defaults.lanes,
    }
}
