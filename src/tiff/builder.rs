//! TIFF file construction utilities
//!
//! This module provides functionality for constructing TIFF files
//! while preserving metadata and structure from a source file.

use std::collections::HashMap;
use log::{error, info};

use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::logger::Logger;

use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::writer::WriterBuilder;

/// Builder for creating TIFF files
pub struct TiffBuilder<'a> {
    logger: &'a Logger,
    is_big_tiff: bool,
    pub ifds: Vec<IFD>,
    image_data: HashMap<usize, Vec<u8>>,
    external_data: HashMap<(usize, u16), Vec<u8>>,
}

impl<'a> TiffBuilder<'a> {
    /// Create a new TIFF builder
    pub fn new(logger: &'a Logger, is_big_tiff: bool) -> Self {
        info!("Creating new TiffBuilder (is_big_tiff: {})", is_big_tiff);
        TiffBuilder {
            logger,
            is_big_tiff,
            ifds: Vec::new(),
            image_data: HashMap::new(),
            external_data: HashMap::new(),
        }
    }

    /// Add an IFD to the TIFF
    pub fn add_ifd(&mut self, ifd: IFD) -> usize {
        let ifd_index = self.ifds.len();
        info!("Adding IFD #{} to TiffBuilder", ifd_index);
        self.ifds.push(ifd);
        ifd_index
    }

    /// Add the structural tags for a single-band image
    pub fn add_single_band_tags(
        &mut self,
        ifd_index: usize,
        width: u32,
        height: u32,
        bits_per_sample: u16,
        photometric: u16,
        compression: u16,
        sample_format: u16
    ) {
        if ifd_index >= self.ifds.len() {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len());
            return;
        }

        BasicTagsBuilder::add_single_band_tags(
            &mut self.ifds[ifd_index],
            width,
            height,
            bits_per_sample,
            photometric,
            compression,
            sample_format
        );
    }

    /// Set up a single strip for image data
    pub fn setup_single_strip(&mut self, ifd_index: usize, strip_data: Vec<u8>, rows: u32) {
        if ifd_index >= self.ifds.len() {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len());
            return;
        }

        BasicTagsBuilder::setup_single_strip(
            &mut self.ifds[ifd_index],
            &mut self.image_data,
            ifd_index,
            strip_data,
            rows
        );
    }

    /// Copy geospatial and ancillary tags from a source IFD
    ///
    /// Externally stored tag data is re-read from the source file so the
    /// new file carries its own copy rather than stale offsets.
    pub fn copy_reference_tags(
        &mut self,
        ifd_index: usize,
        source_ifd: &IFD,
        reader: &TiffReader
    ) -> TiffResult<()> {
        if ifd_index >= self.ifds.len() {
            return Err(TiffError::GenericError(format!(
                "Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len())));
        }

        GeoTagsBuilder::copy_reference_tags(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            source_ifd,
            reader
        )
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &str) -> TiffResult<()> {
        info!("Writing TIFF to {}", output_path);
        self.logger.log(&format!("Writing TIFF to {}", output_path))?;

        WriterBuilder::write(
            self.is_big_tiff,
            &self.ifds,
            &self.image_data,
            &self.external_data,
            output_path
        )
    }
}
