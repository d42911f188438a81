//! Raster structure inspection command
//!
//! This module implements the command for displaying the structure of a
//! TIFF/GeoTIFF file: format, dimensions, band layout and georeferencing.

use clap::ArgMatches;
use log::info;
use std::io::BufReader;

use crate::commands::command_traits::Command;
use crate::extractor::RasterLayout;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::ifd::IFD;
use crate::tiff::types::TIFF;
use crate::tiff::TiffReader;
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Command for inspecting raster file structure
pub struct InfoCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Whether to list every tag of the main IFD
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> InfoCommand<'a> {
    /// Create a new info command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new InfoCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| TiffError::GenericError("Missing input file".to_string()))?
            .clone();

        let verbose = args.get_flag("verbose");

        Ok(InfoCommand {
            input_file,
            verbose,
            logger,
        })
    }

    /// Display format and band layout information
    fn display_summary(&self, tiff: &TIFF, ifd: &IFD, reader: &TiffReader) -> TiffResult<()> {
        info!("File: {}", self.input_file);
        info!("  Format: {}", if tiff.is_big_tiff { "BigTIFF" } else { "TIFF" });
        info!("  Number of IFDs: {} ({} overview(s))",
              tiff.ifd_count(), tiff.overviews().len());

        let file = reader.create_reader()?;
        let mut file_reader = BufReader::new(file);

        match RasterLayout::from_ifd(ifd, reader, &mut file_reader) {
            Ok(layout) => {
                info!("  Dimensions: {}x{}", layout.width, layout.height);
                info!("  Bands: {}", layout.bands);
                info!("  Bits per sample: {}", layout.bits_per_sample);
                info!("  Sample format: {}",
                      tag_utils::get_sample_format_name(layout.sample_format(0) as u64));
                info!("  Compression: {}",
                      tag_utils::get_compression_name(layout.compression));
                info!("  Photometric: {}",
                      tag_utils::get_photometric_name(layout.photometric as u64));
                info!("  Planar configuration: {}",
                      tag_utils::get_planar_config_name(layout.planar));
                info!("  Data organization: {}",
                      if ifd.is_tiled() { "tiles" } else { "strips" });
            },
            Err(e) => {
                // Still useful for files the split path can't handle
                info!("  (layout not fully readable: {})", e);
                if let Some((width, height)) = ifd.get_dimensions() {
                    info!("  Dimensions: {}x{}", width, height);
                }
                info!("  Bands: {}", ifd.get_samples_per_pixel());
            }
        }

        Ok(())
    }

    /// Display the GeoKey directory, if the file has one
    fn display_geo_keys(&self, ifd: &IFD, reader: &TiffReader) -> TiffResult<()> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            info!("  No GeoKey directory (not a GeoTIFF)");
            return Ok(());
        }

        let file = reader.create_reader()?;
        let mut file_reader = BufReader::new(file);

        let entries = GeoKeyParser::parse_directory(ifd, reader, &mut file_reader)?;
        let ascii_params = GeoKeyParser::read_ascii_params(ifd, reader);

        info!("  GeoKeys:");
        for entry in &entries {
            info!("    {}: {}",
                  entry.get_name(),
                  GeoKeyParser::describe_value(entry, ascii_params.as_deref()));
        }

        Ok(())
    }
}

impl<'a> Command for InfoCommand<'a> {
    fn execute(&self) -> TiffResult<()> {
        let mut reader = TiffReader::new();
        let tiff = reader.load(&self.input_file)?;

        let ifd = tiff.main_ifd()
            .ok_or_else(|| TiffError::GenericError(
                "File contains no full-resolution image".to_string()))?;

        self.display_summary(&tiff, ifd, &reader)?;
        self.display_geo_keys(ifd, &reader)?;

        if self.verbose {
            info!("{}", ifd);
        }

        self.logger.log(&format!("Inspected {}", self.input_file))?;

        Ok(())
    }
}
