//! Built-in proj definitions.
//!
//! Only systems that show up around European OSM extracts and national
//! elevation models are listed.  Anything else is passed as `Crs::Proj`.

use bn_core::Crs;

use crate::{CrsError, CrsResult};

/// `(EPSG code, proj definition)`.
const DEFINITIONS: &[(u32, &str)] = &[
    (4326,  "+proj=longlat +datum=WGS84 +no_defs"),
    (4258,  "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs"),
    // Belgian Lambert 72
    (31370, "+proj=lcc +lat_0=90 +lon_0=4.36748666666667 +lat_1=51.1666672333333 \
             +lat_2=49.8333339 +x_0=150000.013 +y_0=5400088.438 +ellps=intl \
             +towgs84=-106.8686,52.2978,-103.7239,0.3366,-0.457,1.8422,-1.2747 \
             +units=m +no_defs"),
    (3857,  "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 \
             +units=m +no_defs"),
    // Lambert 93
    (2154,  "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 +x_0=700000 \
             +y_0=6600000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"),
    (3035,  "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80 \
             +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"),
    (25831, "+proj=utm +zone=31 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"),
    (25832, "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"),
    (32631, "+proj=utm +zone=31 +datum=WGS84 +units=m +no_defs"),
    (32632, "+proj=utm +zone=32 +datum=WGS84 +units=m +no_defs"),
];

/// Proj definition string for `crs`.
///
/// # Errors
///
/// [`CrsError::UnknownEpsg`] for EPSG codes without a built-in definition.
pub fn proj_definition(crs: &Crs) -> CrsResult<&str> {
    match crs {
        Crs::Proj(def) => Ok(def.as_str()),
        Crs::Epsg(code) => DEFINITIONS
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, def)| *def)
            .ok_or(CrsError::UnknownEpsg(*code)),
    }
}
