use proj4rs::proj::Proj;

use crate::errors::{GeoError, Result};

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// A coordinate reference system, kept as a PROJ.4 definition.
///
/// The definition is validated with `proj4rs` at construction time, so any
/// `SpatialRef` can be handed to [`crate::spatial_ref::CoordTransform::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialRef {
    proj4: String,
    epsg: Option<u32>,
}

impl SpatialRef {
    /// Set a coordinate system from a user supplied definition.
    ///
    /// Accepted forms:
    /// * PROJ.4 strings (`+proj=utm +zone=33 +datum=WGS84`)
    /// * `EPSG:<code>` codes
    /// * well known geographic systems (`WGS84`, `WGS72`, `NAD27`, `NAD83`,
    ///   `OGC:CRS84`)
    /// * WKT (version 1 or 2) carrying an EPSG authority for the root node;
    ///   geographic WKT without authority is taken as WGS84 longitude/latitude.
    pub fn from_definition(definition: &str) -> Result<SpatialRef> {
        let trimmed = definition.trim();
        if trimmed.is_empty() {
            return Err(invalid(definition, "empty definition"));
        }

        if trimmed.starts_with('+') || trimmed.contains("+proj=") {
            return Self::from_proj4(trimmed);
        }

        if let Some(code) = strip_prefix_ignore_case(trimmed, "EPSG:") {
            let code = code
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid(definition, &e.to_string()))?;
            return Self::from_epsg(code);
        }

        if let Ok(srs) = Self::from_well_known_geog_cs(trimmed) {
            return Ok(srs);
        }

        if trimmed.ends_with(']') {
            return Self::from_wkt(trimmed);
        }

        Err(invalid(definition, "unrecognized definition format"))
    }

    pub fn from_proj4(proj4_string: &str) -> Result<SpatialRef> {
        let proj4 = proj4_string.trim();
        Proj::from_proj_string(proj4).map_err(|e| invalid(proj4_string, &format!("{e:?}")))?;
        Ok(SpatialRef {
            proj4: proj4.to_string(),
            epsg: None,
        })
    }

    pub fn from_epsg(epsg_code: u32) -> Result<SpatialRef> {
        let proj4 = u16::try_from(epsg_code)
            .ok()
            .and_then(crs_definitions::from_code)
            .map(|def| def.proj4)
            .ok_or_else(|| {
                invalid(
                    &format!("EPSG:{epsg_code}"),
                    "code is not in the crs-definitions database",
                )
            })?;
        let mut srs = Self::from_proj4(proj4)?;
        srs.epsg = Some(epsg_code);
        Ok(srs)
    }

    /// Resolve a WKT definition through its root EPSG authority.
    pub fn from_wkt(wkt: &str) -> Result<SpatialRef> {
        if let Some(code) = root_epsg_authority(wkt) {
            return Self::from_epsg(code);
        }

        let head = wkt.trim_start().to_ascii_uppercase();
        if ["GEOGCS[", "GEOGCRS[", "GEODCRS[", "GEODETICCRS["]
            .iter()
            .any(|node| head.starts_with(node))
        {
            log::debug!("geographic WKT without EPSG authority, assuming WGS84");
            return Self::wgs84();
        }

        Err(invalid(wkt, "WKT without EPSG authority"))
    }

    /// `SetWellKnownGeogCS` equivalent.
    pub fn from_well_known_geog_cs(name: &str) -> Result<SpatialRef> {
        let code = match name.trim().to_ascii_uppercase().as_str() {
            "WGS84" | "WGS 84" | "EPSG:4326" => return Self::wgs84(),
            "CRS84" | "OGC:CRS84" => return Self::wgs84(),
            "WGS72" | "WGS 72" => 4322,
            "NAD27" => 4267,
            "NAD83" => 4269,
            _ => return Err(invalid(name, "unknown geographic coordinate system")),
        };
        Self::from_epsg(code)
    }

    pub fn wgs84() -> Result<SpatialRef> {
        let mut srs = Self::from_proj4(WGS84_PROJ4)?;
        srs.epsg = Some(4326);
        Ok(srs)
    }

    /// `true` for longitude/latitude systems.
    pub fn is_geographic(&self) -> bool {
        self.proj4
            .split_whitespace()
            .filter_map(|token| token.strip_prefix("+proj="))
            .any(|name| matches!(name, "longlat" | "latlong" | "lonlat" | "latlon"))
    }

    pub fn to_proj4(&self) -> &str {
        &self.proj4
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// `AUTHORITY:CODE` when known, the PROJ.4 definition otherwise.
    pub fn authority(&self) -> String {
        match self.epsg {
            Some(code) => format!("EPSG:{code}"),
            None => self.proj4.clone(),
        }
    }
}

fn invalid(definition: &str, msg: &str) -> GeoError {
    GeoError::InvalidSpatialRef {
        definition: definition.chars().take(80).collect(),
        msg: msg.to_string(),
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

/// EPSG code of the root node: the last `AUTHORITY["EPSG",..]` (WKT1) or
/// `ID["EPSG",..]` (WKT2) in the string.
fn root_epsg_authority(wkt: &str) -> Option<u32> {
    let upper = wkt.to_ascii_uppercase();
    let position = ["AUTHORITY[\"EPSG\",", "ID[\"EPSG\","]
        .iter()
        .filter_map(|key| upper.rfind(key).map(|pos| pos + key.len()))
        .max()?;
    let digits: String = wkt[position..]
        .trim_start_matches(|c: char| c == '"' || c.is_whitespace())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
