use std::path::{Path, PathBuf};
use log::info;

use crate::extractor::BandExtractor;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Main interface to the bandsplit library
pub struct BandSplit {
    logger: Logger,
}

impl BandSplit {
    /// Create a new BandSplit instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "bandsplit.log"
    ///
    /// # Returns
    /// A BandSplit instance or an error if initialization fails
    pub fn new(log_file: Option<&str>) -> TiffResult<Self> {
        let log_path = log_file.unwrap_or("bandsplit.log");
        let logger = Logger::new(log_path)?;
        Ok(BandSplit { logger })
    }

    /// Split a raster into one single-band file per band
    ///
    /// Writes `band_<N>.tif` for every band of the input into the output
    /// directory, creating the directory if needed. Existing files of the
    /// same name are overwritten.
    ///
    /// # Arguments
    /// * `input_path` - Path to the multi-band raster to split
    /// * `output_dir` - Directory receiving the single-band files
    ///
    /// # Returns
    /// The paths of the files written, in band order
    pub fn split(&self, input_path: &str, output_dir: &Path) -> TiffResult<Vec<PathBuf>> {
        info!("Splitting {} into {}", input_path, output_dir.display());

        std::fs::create_dir_all(output_dir)?;

        let mut extractor = BandExtractor::new(&self.logger);
        extractor.extract_to_directory(input_path, output_dir)
    }

    /// Return the number of bands in a raster
    ///
    /// # Arguments
    /// * `input_path` - Path to the raster to examine
    pub fn band_count(&self, input_path: &str) -> TiffResult<usize> {
        let mut reader = crate::tiff::TiffReader::new();
        let tiff = reader.load(input_path)?;

        let ifd = tiff.main_ifd()
            .ok_or_else(|| TiffError::GenericError(
                "File contains no full-resolution image".to_string()))?;

        Ok(ifd.get_samples_per_pixel() as usize)
    }

    /// Summarize a raster's structure
    ///
    /// # Arguments
    /// * `input_path` - Path to the raster to examine
    ///
    /// # Returns
    /// String containing structure information or an error
    pub fn describe(&self, input_path: &str) -> TiffResult<String> {
        let mut reader = crate::tiff::TiffReader::new();
        let tiff = reader.load(input_path)?;

        let mut result = String::from("Raster structure:\n");
        result.push_str(&format!("  Format: {}\n", if tiff.is_big_tiff { "BigTIFF" } else { "TIFF" }));
        result.push_str(&format!("  Number of IFDs: {}\n", tiff.ifd_count()));

        if let Some(ifd) = tiff.main_ifd() {
            if let Some((width, height)) = ifd.get_dimensions() {
                result.push_str(&format!("  Dimensions: {}x{}\n", width, height));
            }

            result.push_str(&format!("  Bands: {}\n", ifd.get_samples_per_pixel()));

            if let Some(compression) = ifd.get_tag_value(tags::COMPRESSION) {
                result.push_str(&format!("  Compression: {}\n",
                                         tag_utils::get_compression_name(compression)));
            }

            result.push_str(&format!("  Data organization: {}\n",
                                     if ifd.is_tiled() { "tiles" } else { "strips" }));
        }

        Ok(result)
    }
}
