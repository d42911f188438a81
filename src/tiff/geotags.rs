//! GeoTIFF tag definitions and utilities
//!
//! This module provides name lookups for GeoTIFF tags, GeoKeys and the
//! code values they carry, backed by an embedded TOML definitions file.

use std::collections::HashMap;
use lazy_static::lazy_static;
use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    // Parse the TOML file at startup
    static ref GEOTIFF_DEFINITIONS: GeoTiffDefinitions = {
        let content = include_str!("../../geotiff_tags.toml");
        GeoTiffDefinitions::from_str(content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse GeoTIFF tag definitions: {}", e);
                GeoTiffDefinitions::default()
            })
    };
}

/// Container for GeoTIFF tag and key definitions
#[derive(Debug, Default)]
pub struct GeoTiffDefinitions {
    // Maps tag IDs to tag names
    pub tag_names: HashMap<u16, String>,
    // Maps GeoKey IDs to key names
    pub key_names: HashMap<u16, String>,
    // Maps model type codes to names
    pub model_type_names: HashMap<u16, String>,
    // Maps raster type codes to names
    pub raster_type_names: HashMap<u16, String>,
    // Maps geographic CS codes to names
    pub geographic_cs_names: HashMap<u16, String>,
    // Maps projected CS codes to names
    pub projected_cs_names: HashMap<u16, String>,
}

impl GeoTiffDefinitions {
    /// Parse GeoTIFF definitions from a TOML string
    pub fn from_str(content: &str) -> TiffResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(TiffError::GenericError(format!("Failed to parse TOML: {}", e))),
        };

        let mut defs = GeoTiffDefinitions::default();

        Self::parse_code_table(&toml_value, "tag_ids", &mut defs.tag_names);
        Self::parse_code_table(&toml_value, "key_ids", &mut defs.key_names);
        Self::parse_code_table(&toml_value, "model_type_codes", &mut defs.model_type_names);
        Self::parse_code_table(&toml_value, "raster_type_codes", &mut defs.raster_type_names);
        Self::parse_code_table(&toml_value, "geographic_cs_codes", &mut defs.geographic_cs_names);
        Self::parse_code_table(&toml_value, "projected_cs_codes", &mut defs.projected_cs_names);

        Ok(defs)
    }

    /// Helper to parse code tables from TOML
    fn parse_code_table(toml_value: &toml::Value, table_name: &str, target: &mut HashMap<u16, String>) {
        if let Some(table) = toml_value.get(table_name).and_then(|v| v.as_table()) {
            for (k, v) in table {
                if let (Ok(id), Some(name)) = (k.parse::<u16>(), v.as_str()) {
                    target.insert(id, name.to_string());
                }
            }
        }
    }

    /// Get a GeoTIFF tag name by ID
    pub fn get_tag_name(&self, tag_id: u16) -> String {
        self.tag_names.get(&tag_id)
            .cloned()
            .unwrap_or_else(|| format!("Unknown-{}", tag_id))
    }

    /// Get a GeoKey name by ID
    pub fn get_key_name(&self, key_id: u16) -> String {
        self.key_names.get(&key_id)
            .cloned()
            .unwrap_or_else(|| format!("Unknown-{}", key_id))
    }

    /// Get a model type code name
    pub fn get_model_type_name(&self, code: u16) -> String {
        self.model_type_names.get(&code)
            .cloned()
            .unwrap_or_else(|| format!("{}", code))
    }

    /// Get a raster type code name
    pub fn get_raster_type_name(&self, code: u16) -> String {
        self.raster_type_names.get(&code)
            .cloned()
            .unwrap_or_else(|| format!("{}", code))
    }

    /// Get a geographic coordinate system name
    pub fn get_geographic_cs_name(&self, code: u16) -> String {
        self.geographic_cs_names.get(&code)
            .cloned()
            .unwrap_or_else(|| format!("EPSG:{}", code))
    }

    pub fn get_projected_cs_description(&self, code: u16) -> String {
        match code {
            // Web Mercator / Google Maps
            3857 => "WGS 84 / Web Mercator (Google Maps, OpenStreetMap)".to_string(),

            // WGS 84 based
            4326 => "WGS 84 (GPS, standard latitude/longitude)".to_string(),
            3395 => "WGS 84 / World Mercator".to_string(),
            4269 => "NAD 83 (North American Datum 1983)".to_string(),
            4267 => "NAD 27 (North American Datum 1927)".to_string(),

            // UTM Zones - WGS84
            32600..=32660 => format!("WGS 84 / UTM Northern Hemisphere zone {}", code - 32600),
            32700..=32760 => format!("WGS 84 / UTM Southern Hemisphere zone {}", code - 32700),

            // UTM Zones - NAD83
            26900..=26923 => format!("NAD 83 / UTM zone {} North", code - 26900),

            // European systems
            3035 => "ETRS89 / LAEA Europe (Lambert Azimuthal Equal Area)".to_string(),
            27700 => "OSGB 1936 / British National Grid".to_string(),
            2154 => "RGF93 / Lambert-93 (France)".to_string(),
            25830..=25838 => format!("ETRS89 / UTM zone {} North (Europe)", code - 25830),

            // Other common systems
            5070 => "NAD 83 / Conus Albers (US)".to_string(),

            // Default to lookup in the definitions table
            _ => self.projected_cs_names.get(&code)
                .cloned()
                .unwrap_or_else(|| format!("EPSG:{}", code))
        }
    }
}

/// Check if a tag is a GeoTIFF tag
pub fn is_geotiff_tag(tag: u16) -> bool {
    use crate::tiff::constants::tags;
    matches!(tag,
        tags::MODEL_PIXEL_SCALE_TAG |
        tags::MODEL_TRANSFORMATION_TAG |
        tags::MODEL_TIEPOINT_TAG |
        tags::GEO_KEY_DIRECTORY_TAG |
        tags::GEO_DOUBLE_PARAMS_TAG |
        tags::GEO_ASCII_PARAMS_TAG)
}

/// Get a GeoTIFF tag name
pub fn get_geotiff_tag_name(tag: u16) -> String {
    GEOTIFF_DEFINITIONS.get_tag_name(tag)
}

/// Get a GeoKey name
pub fn get_key_name(key: u16) -> String {
    GEOTIFF_DEFINITIONS.get_key_name(key)
}

/// Get a model type code name
pub fn get_model_type_name(code: u16) -> String {
    GEOTIFF_DEFINITIONS.get_model_type_name(code)
}

/// Get a raster type code name
pub fn get_raster_type_name(code: u16) -> String {
    GEOTIFF_DEFINITIONS.get_raster_type_name(code)
}

/// Get a geographic coordinate system name
pub fn get_geographic_cs_name(code: u16) -> String {
    GEOTIFF_DEFINITIONS.get_geographic_cs_name(code)
}

/// Get a projected coordinate system description
pub fn get_projected_cs_description(code: u16) -> String {
    GEOTIFF_DEFINITIONS.get_projected_cs_description(code)
}
