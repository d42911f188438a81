//! Basic TIFF tag strategies
//!
//! This module provides functionality for adding the structural tags
//! of a single-band image: dimensions, sample layout, and strip setup.

use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::constants::{tags, field_types, planar_config, sample_format};
use log::{debug, info};

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the structural tags for a single-band image
    ///
    /// Sets up dimensions, bit depth, photometric interpretation,
    /// compression, sample count and planar configuration for an image
    /// holding exactly one band.
    pub fn add_single_band_tags(
        ifd: &mut IFD,
        width: u32,
        height: u32,
        bits_per_sample: u16,
        photometric: u16,
        compression: u16,
        format: u16
    ) {
        info!("Adding single-band tags for {}x{} image, {} bits", width, height, bits_per_sample);

        ifd.add_entry(IFDEntry::new(
            tags::IMAGE_WIDTH,
            field_types::LONG,
            1,
            width as u64)
        );

        ifd.add_entry(IFDEntry::new(
            tags::IMAGE_LENGTH,
            field_types::LONG,
            1,
            height as u64)
        );

        // One channel, one bit-depth value stored inline
        ifd.add_entry(IFDEntry::new(
            tags::BITS_PER_SAMPLE,
            field_types::SHORT,
            1,
            bits_per_sample as u64)
        );

        ifd.add_entry(IFDEntry::new(
            tags::COMPRESSION,
            field_types::SHORT,
            1,
            compression as u64)
        );

        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            field_types::SHORT,
            1,
            photometric as u64)
        );

        ifd.add_entry(IFDEntry::new(
            tags::SAMPLES_PER_PIXEL,
            field_types::SHORT,
            1,
            1)
        );

        // With one sample per pixel chunky and planar are equivalent;
        // chunky is what writers conventionally record
        ifd.add_entry(IFDEntry::new(
            tags::PLANAR_CONFIGURATION,
            field_types::SHORT,
            1,
            planar_config::CHUNKY as u64)
        );

        // SampleFormat defaults to unsigned; only written when it carries
        // information beyond the default
        if format != sample_format::UNSIGNED {
            debug!("Recording non-default sample format {}", format);
            ifd.add_entry(IFDEntry::new(
                tags::SAMPLE_FORMAT,
                field_types::SHORT,
                1,
                format as u64)
            );
        }
    }

    /// Setup single strip for an IFD
    ///
    /// TIFF files store image data in strips. This function sets up a basic
    /// single-strip configuration covering the whole image, which keeps the
    /// output layout simple and deterministic.
    pub fn setup_single_strip(
        ifd: &mut IFD,
        image_data: &mut std::collections::HashMap<usize, Vec<u8>>,
        ifd_index: usize,
        strip_data: Vec<u8>,
        rows: u32
    ) {
        info!("Setting up single strip: {} bytes, {} rows", strip_data.len(), rows);

        // StripOffsets tells where in the file the strip data starts.
        // The actual value is patched in during write - for now it's a placeholder.
        ifd.add_entry(IFDEntry::new(
            tags::STRIP_OFFSETS,
            field_types::LONG,
            1,
            0)
        );

        // StripByteCounts tells how many bytes are in each strip,
        // which for compressed data is the stored (compressed) size
        ifd.add_entry(IFDEntry::new(
            tags::STRIP_BYTE_COUNTS,
            field_types::LONG,
            1,
            strip_data.len() as u64)
        );

        // For a single-strip image, RowsPerStrip equals the image height
        ifd.add_entry(IFDEntry::new(
            tags::ROWS_PER_STRIP,
            field_types::LONG,
            1,
            rows as u64)
        );

        // Store the actual pixel data for later writing
        image_data.insert(ifd_index, strip_data);
    }
}
