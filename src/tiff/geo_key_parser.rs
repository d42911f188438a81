//! GeoKey directory parsing
//!
//! GeoTIFF stores its georeferencing keys in a packed SHORT array
//! (the GeoKey directory). This module unpacks that structure so the
//! inspection output can present keys by name with resolved values.

use log::{debug, warn};

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{geo_keys, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geotags;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Represents a GeoKey entry in a GeoKey directory
#[derive(Debug, Clone)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

impl GeoKeyEntry {
    /// Get the name of this key
    pub fn get_name(&self) -> String {
        geotags::get_key_name(self.key_id)
    }
}

/// Parser for GeoKey directories
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parse the GeoKey directory of an IFD
    ///
    /// The directory is a SHORT array: a four-value header
    /// (version, revision, minor revision, key count) followed by
    /// one four-value record per key.
    pub fn parse_directory(
        ifd: &IFD,
        reader: &TiffReader,
        file_reader: &mut dyn SeekableReader
    ) -> TiffResult<Vec<GeoKeyEntry>> {
        let values = reader.read_tag_values(file_reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;

        if values.len() < 4 {
            return Err(TiffError::GenericError(
                "GeoKey directory too short".to_string()));
        }

        let key_count = values[3] as usize;
        debug!("GeoKey directory version {}.{}.{}, {} keys",
               values[0], values[1], values[2], key_count);

        let mut entries = Vec::with_capacity(key_count);

        for i in 0..key_count {
            let base = 4 + i * 4;
            if base + 3 >= values.len() {
                warn!("GeoKey directory truncated at key {}", i);
                break;
            }

            entries.push(GeoKeyEntry {
                key_id: values[base] as u16,
                tiff_tag_location: values[base + 1] as u16,
                count: values[base + 2] as u16,
                value_offset: values[base + 3] as u16,
            });
        }

        Ok(entries)
    }

    /// Read the GeoAsciiParams string, if present
    ///
    /// Keys whose location field points at the ASCII params tag index
    /// into this string by offset and length.
    pub fn read_ascii_params(ifd: &IFD, reader: &TiffReader) -> Option<String> {
        let entry = ifd.get_entry(tags::GEO_ASCII_PARAMS_TAG)?;
        reader.read_ascii_string_at_offset(entry.value_offset, entry.count).ok()
    }

    /// Produce a human-readable value for a GeoKey
    pub fn describe_value(entry: &GeoKeyEntry, ascii_params: Option<&str>) -> String {
        // Location 0 means the value is stored directly in the entry
        if entry.tiff_tag_location == 0 {
            return match entry.key_id {
                geo_keys::MODEL_TYPE =>
                    format!("{} ({})", entry.value_offset,
                            geotags::get_model_type_name(entry.value_offset)),
                geo_keys::RASTER_TYPE =>
                    format!("{} ({})", entry.value_offset,
                            geotags::get_raster_type_name(entry.value_offset)),
                geo_keys::GEOGRAPHIC_TYPE =>
                    format!("{} ({})", entry.value_offset,
                            geotags::get_geographic_cs_name(entry.value_offset)),
                geo_keys::PROJECTED_CS_TYPE =>
                    format!("{} ({})", entry.value_offset,
                            geotags::get_projected_cs_description(entry.value_offset)),
                _ => entry.value_offset.to_string(),
            };
        }

        // Values stored in the ASCII params string
        if entry.tiff_tag_location == tags::GEO_ASCII_PARAMS_TAG {
            if let Some(params) = ascii_params {
                let start = entry.value_offset as usize;
                let end = (start + entry.count as usize).min(params.len());
                if start < end {
                    return params[start..end]
                        .trim_end_matches('|')
                        .to_string();
                }
            }
            return "(unreadable ASCII value)".to_string();
        }

        // Doubles and anything else are reported by reference only
        format!("(in tag {}, {} values at offset {})",
                entry.tiff_tag_location, entry.count, entry.value_offset)
    }
}
