//! Reference-system identifiers.
//!
//! `Crs` only *names* a system; turning a name into a projection lives in
//! `bn-crs`.  Accepted spellings:
//!
//! | Text                          | Value                  |
//! |-------------------------------|------------------------|
//! | `EPSG:31370`, `epsg:31370`    | `Crs::Epsg(31370)`     |
//! | `WGS84`                       | `Crs::Epsg(4326)`      |
//! | `+proj=lcc +lat_1=…`          | `Crs::Proj(..)`        |

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A coordinate reference system, by EPSG code or by proj definition.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crs {
    Epsg(u32),
    Proj(String),
}

impl Crs {
    /// WGS84 geographic, the system OSM coordinates are published in.
    pub const WGS84: Crs = Crs::Epsg(4326);

    /// Belgian Lambert 72.
    pub const BELGIAN_LAMBERT_72: Crs = Crs::Epsg(31370);

    pub fn epsg_code(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Proj(_)    => None,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{code}"),
            Crs::Proj(def)  => f.write_str(def),
        }
    }
}

impl FromStr for Crs {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("WGS84") {
            return Ok(Crs::WGS84);
        }
        if s.starts_with('+') {
            return Ok(Crs::Proj(s.to_owned()));
        }
        let code = s
            .split_once(':')
            .filter(|(authority, _)| authority.eq_ignore_ascii_case("EPSG"))
            .and_then(|(_, code)| code.parse::<u32>().ok())
            .ok_or_else(|| CoreError::InvalidCrs(s.to_owned()))?;
        Ok(Crs::Epsg(code))
    }
}
