//! Band splitting command
//!
//! This module implements the command that splits a multi-band raster
//! into one single-band file per band.

use clap::ArgMatches;
use log::{error, info};
use std::fs;
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::extractor::BandExtractor;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::logger::Logger;

/// Command for splitting a raster into per-band files
pub struct SplitCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Directory receiving the single-band outputs
    output_dir: PathBuf,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> SplitCommand<'a> {
    /// Create a new split command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new SplitCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| TiffError::GenericError("Missing input file".to_string()))?
            .clone();
        info!("Input file: {}", input_file);

        let output_dir = args.get_one::<String>("output-dir")
            .map(PathBuf::from)
            .ok_or_else(|| TiffError::GenericError("Missing output directory".to_string()))?;
        info!("Output directory: {}", output_dir.display());

        Ok(SplitCommand {
            input_file,
            output_dir,
            logger,
        })
    }
}

impl<'a> Command for SplitCommand<'a> {
    fn execute(&self) -> TiffResult<()> {
        // The extractor expects the directory to exist
        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            error!("Cannot create output directory {}: {}", self.output_dir.display(), e);
            return Err(TiffError::IoError(e));
        }

        let mut extractor = BandExtractor::new(self.logger);
        let written = extractor.extract_to_directory(&self.input_file, &self.output_dir)?;

        for path in &written {
            info!("Wrote {}", path.display());
        }
        info!("Split complete: {} band file(s)", written.len());

        Ok(())
    }
}
