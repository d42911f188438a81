//! Band extraction from multi-band rasters
//!
//! This module provides the extraction pipeline that turns one multi-band
//! TIFF into a set of single-band files: load the structure, read and
//! decode the sample data into per-band planes, then write each plane into
//! a fresh file carrying the source's metadata profile with the band count
//! set to one.

mod band_data;
mod strip_reader;
mod tile_reader;

// Public exports
pub use band_data::{BandSet, RasterLayout};
pub use strip_reader::StripReader;
pub use tile_reader::TileReader;

use log::{info, warn};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compression::CompressionFactory;
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::photometric;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::{TiffBuilder, TiffReader};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Extracts every band of a raster into its own single-band file
pub struct BandExtractor<'a> {
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> BandExtractor<'a> {
    /// Create a new band extractor
    pub fn new(logger: &'a Logger) -> Self {
        BandExtractor { logger }
    }

    /// Split a raster into per-band files inside the output directory
    ///
    /// Writes `band_<N>.tif` for N = 1..band_count and returns the paths
    /// in band order. Existing files of the same name are overwritten, so
    /// repeated runs on the same input are idempotent.
    ///
    /// # Arguments
    /// * `input_path` - Path to the multi-band raster to split
    /// * `output_dir` - Directory receiving the single-band files
    ///
    /// # Returns
    /// The paths of the files written, one per band
    pub fn extract_to_directory(
        &mut self,
        input_path: &str,
        output_dir: &Path
    ) -> TiffResult<Vec<PathBuf>> {
        info!("Splitting {} into {}", input_path, output_dir.display());

        let mut reader = TiffReader::new();
        let tiff = reader.load(input_path)?;

        let ifd = tiff.main_ifd()
            .ok_or_else(|| TiffError::GenericError(
                "File contains no full-resolution image".to_string()))?;

        let band_set = self.read_band_set(ifd, &reader)?;
        info!("Read {} band(s) of {}x{} pixels",
              band_set.band_count(), band_set.layout.width, band_set.layout.height);

        let progress = ProgressTracker::new(band_set.band_count() as u64, "Splitting bands");
        let mut written = Vec::with_capacity(band_set.band_count());

        for band in 0..band_set.band_count() {
            let output_path = output_dir.join(format!("band_{}.tif", band + 1));

            if output_path.exists() {
                warn!("Overwriting existing output file {}", output_path.display());
            }

            progress.set_message(&format!("band_{}.tif", band + 1));
            self.write_band(&band_set, band, ifd, &reader, tiff.is_big_tiff, &output_path)?;

            progress.increment(1);
            written.push(output_path);
        }

        progress.finish();

        self.logger.log(&format!(
            "Split {} into {} band file(s)", input_path, written.len()))?;

        Ok(written)
    }

    /// Read and decode the raster's sample data into per-band planes
    fn read_band_set(&self, ifd: &IFD, reader: &TiffReader) -> TiffResult<BandSet> {
        let file = reader.create_reader()?;
        let mut file_reader = BufReader::with_capacity(1024 * 1024, file);

        let layout = RasterLayout::from_ifd(ifd, reader, &mut file_reader)?;

        let mut band_set = if ifd.is_tiled() {
            TileReader::new(file_reader, ifd, reader).read_bands(&layout)?
        } else {
            StripReader::new(file_reader, ifd, reader).read_bands(&layout)?
        };

        // Outputs are always little-endian
        if let Some(handler) = reader.get_byte_order_handler() {
            if handler.order() == ByteOrder::BigEndian {
                band_set.normalize_endianness();
            }
        }

        Ok(band_set)
    }

    /// Write one band's plane into a single-band file
    ///
    /// The output carries the source's metadata profile with the band
    /// count set to one: same dimensions, bit depth, sample format and
    /// compression, plus the geospatial reference copied verbatim.
    fn write_band(
        &self,
        band_set: &BandSet,
        band: usize,
        source_ifd: &IFD,
        reader: &TiffReader,
        is_big_tiff: bool,
        output_path: &Path
    ) -> TiffResult<()> {
        let layout = &band_set.layout;

        let mut builder = TiffBuilder::new(self.logger, is_big_tiff);
        let ifd_index = builder.add_ifd(IFD::new(0, 0));

        // A lone band from a color image is grayscale; a single-band
        // source keeps whatever interpretation it already had
        let photometric_value = if layout.bands == 1 {
            layout.photometric
        } else {
            photometric::BLACK_IS_ZERO
        };

        builder.add_single_band_tags(
            ifd_index,
            layout.width,
            layout.height,
            layout.bits_per_sample,
            photometric_value,
            layout.compression as u16,
            layout.sample_format(band)
        );

        builder.copy_reference_tags(ifd_index, source_ifd, reader)?;

        // Recompress the plane with the source's compression code
        let handler = CompressionFactory::create_handler(layout.compression)?;
        let strip_data = handler.compress(band_set.plane(band))?;

        builder.setup_single_strip(ifd_index, strip_data, layout.height);

        builder.write(&output_path.to_string_lossy())
    }
}
