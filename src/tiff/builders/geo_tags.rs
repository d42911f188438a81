//! GeoTIFF tag strategies
//!
//! This module handles the specialized tags that turn a regular TIFF into a
//! GeoTIFF, plus ancillary metadata worth preserving when deriving a new file
//! from an existing one. Since a band split always covers the full image
//! extent, the geospatial reference is carried over verbatim.

use crate::tiff::ifd::IFD;
use crate::tiff::errors::TiffResult;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::reader::TiffReader;
use crate::io::byte_order::ByteOrder;
use log::{debug, info, warn};
use crate::utils::tiff_utils;
use std::collections::HashMap;

/// Handles GeoTIFF and ancillary tag copying
pub struct GeoTagsBuilder;

/// Tags that anchor the raster to the real world
const GEOTIFF_TAGS: [u16; 6] = [
    tags::GEO_KEY_DIRECTORY_TAG,  // Contains the GeoTIFF keys structure
    tags::GEO_DOUBLE_PARAMS_TAG,  // Double-precision parameters referenced by the directory
    tags::GEO_ASCII_PARAMS_TAG,   // ASCII parameters referenced by the directory
    tags::MODEL_PIXEL_SCALE_TAG,  // Pixel size in map units
    tags::MODEL_TIEPOINT_TAG,     // Links raster coordinates to map coordinates
    tags::MODEL_TRANSFORMATION_TAG, // Full transformation matrix
];

/// Ancillary tags preserved so outputs read like the source
const ANCILLARY_TAGS: [u16; 7] = [
    tags::RESOLUTION_UNIT,
    tags::X_RESOLUTION,
    tags::Y_RESOLUTION,
    tags::ORIENTATION,
    tags::COLOR_MAP,              // Palette for single-band indexed sources
    tags::GDAL_METADATA,          // GDAL XML metadata, carried as-is
    tags::GDAL_NODATA,            // NoData marker value
];

impl GeoTagsBuilder {
    /// Copy geospatial and ancillary tags from a source IFD
    ///
    /// Inline values are cloned directly. Externally stored values are
    /// re-read from the source file and registered as external data, so the
    /// new file never carries offsets that point into the old one.
    pub fn copy_reference_tags(
        dest_ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        source_ifd: &IFD,
        reader: &TiffReader
    ) -> TiffResult<()> {
        info!("Copying geospatial and ancillary tags");

        for &tag in GEOTIFF_TAGS.iter().chain(ANCILLARY_TAGS.iter()) {
            // Skip tags that don't exist in the source
            let entry = match source_ifd.get_entry(tag) {
                Some(e) => e,
                None => continue,
            };

            debug!("Copying tag {} (count: {})", tag, entry.count);

            // Small values live in the tag itself and can be cloned as-is
            if entry.is_value_inline(reader.is_big_tiff()) {
                tiff_utils::update_ifd_tag(dest_ifd, tag, entry.clone());
                continue;
            }

            // For externally stored data, read the actual bytes from the file
            let mut data = match reader.read_entry_raw_bytes(entry) {
                Ok(d) => d,
                Err(e) => {
                    // If this tag can't be read, log it but continue with others
                    warn!("Failed to read data for tag {}: {:?}", tag, e);
                    continue;
                }
            };

            // The output file is always little-endian; multi-byte values
            // coming from a big-endian source have to be swapped
            if let Some(handler) = reader.get_byte_order_handler() {
                if handler.order() == ByteOrder::BigEndian {
                    swap_value_bytes(&mut data, entry.field_type);
                }
            }

            tiff_utils::create_external_tag(
                dest_ifd,
                external_data,
                ifd_index,
                tag,
                entry.field_type,
                entry.count,
                data
            );
        }

        Ok(())
    }
}

/// Reverse the byte order of every value in a tag data block
///
/// Rationals are pairs of 4-byte integers, so they swap at element
/// size 4 rather than their 8-byte field size.
fn swap_value_bytes(data: &mut [u8], field_type: u16) {
    let element_size = match field_type {
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL => 4,
        field_types::DOUBLE | field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    };

    if element_size > 1 {
        for chunk in data.chunks_exact_mut(element_size) {
            chunk.reverse();
        }
    }
}
