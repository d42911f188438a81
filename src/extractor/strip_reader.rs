//! Strip-based raster data reading
//!
//! This module implements a reader for extracting raw sample data from
//! stripped TIFF files. Stripped TIFFs organize image data in horizontal
//! strips across the entire width of the image, which is the traditional
//! TIFF organization and well-suited for whole-image reads.

use log::{debug, info};
use std::io::SeekFrom;

use crate::io::seekable::SeekableReader;
use crate::tiff::{TiffReader, TiffError};
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;
use crate::tiff::constants::{predictor, tags};
use crate::compression::{CompressionFactory, CompressionHandler};

use super::band_data::{self, BandSet, RasterLayout};

/// Reads raw sample data from stripped TIFF files
///
/// Handles decompression, predictor decoding and the assembly of strips
/// into either one interleaved buffer (chunky sources) or per-band planes
/// (planar sources).
pub struct StripReader<'a, R: SeekableReader> {
    /// Reader for accessing the TIFF file
    reader: R,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
}

impl<'a, R: SeekableReader> StripReader<'a, R> {
    /// Create a new strip reader
    pub fn new(reader: R, ifd: &'a IFD, tiff_reader: &'a TiffReader) -> Self {
        StripReader {
            reader,
            ifd,
            tiff_reader
        }
    }

    /// Read the full image into a band set
    pub fn read_bands(&mut self, layout: &RasterLayout) -> TiffResult<BandSet> {
        // Rows per strip defaults to the whole image in a single strip
        let rows_per_strip = self.ifd.get_tag_value(tags::ROWS_PER_STRIP)
            .unwrap_or(layout.height as u64) as u32;
        if rows_per_strip == 0 {
            return Err(TiffError::GenericError("RowsPerStrip is zero".to_string()));
        }

        let compression_handler = CompressionFactory::create_handler(layout.compression)?;
        info!("Using compression: {}", compression_handler.name());

        let strip_offsets = self.tiff_reader.read_tag_values(
            &mut self.reader, self.ifd, tags::STRIP_OFFSETS)?;
        let strip_byte_counts = self.tiff_reader.read_tag_values(
            &mut self.reader, self.ifd, tags::STRIP_BYTE_COUNTS)?;

        if strip_offsets.len() != strip_byte_counts.len() {
            return Err(TiffError::GenericError(format!(
                "Strip offset/byte count mismatch: {} vs {}",
                strip_offsets.len(), strip_byte_counts.len())));
        }

        let strips_per_band =
            (layout.height + rows_per_strip - 1) / rows_per_strip;

        info!("Rows per strip: {}", rows_per_strip);
        info!("Total strips: {}", strip_offsets.len());

        if layout.is_planar() {
            self.read_planar(layout, rows_per_strip, strips_per_band,
                             &strip_offsets, &strip_byte_counts, &*compression_handler)
        } else {
            self.read_chunky(layout, rows_per_strip, strips_per_band,
                             &strip_offsets, &strip_byte_counts, &*compression_handler)
        }
    }

    /// Assemble interleaved strips into one buffer and de-interleave
    fn read_chunky(
        &mut self,
        layout: &RasterLayout,
        rows_per_strip: u32,
        strip_count: u32,
        strip_offsets: &[u64],
        strip_byte_counts: &[u64],
        compression_handler: &dyn CompressionHandler
    ) -> TiffResult<BandSet> {
        if (strip_count as usize) > strip_offsets.len() {
            return Err(TiffError::GenericError(format!(
                "Need {} strips but file has {}", strip_count, strip_offsets.len())));
        }

        let row_bytes = layout.chunky_row_bytes();
        let mut buffer = vec![0u8; row_bytes * layout.height as usize];

        for strip_idx in 0..strip_count {
            let rows_in_strip = rows_per_strip
                .min(layout.height - strip_idx * rows_per_strip);

            let strip_data = self.read_strip(
                strip_offsets[strip_idx as usize],
                strip_byte_counts[strip_idx as usize],
                compression_handler,
                layout,
                row_bytes,
                layout.bands as usize
            )?;

            let expected = rows_in_strip as usize * row_bytes;
            if strip_data.len() < expected {
                return Err(TiffError::GenericError(format!(
                    "Strip {} has {} bytes, expected at least {}",
                    strip_idx, strip_data.len(), expected)));
            }

            let dest_start = strip_idx as usize * rows_per_strip as usize * row_bytes;
            buffer[dest_start..dest_start + expected]
                .copy_from_slice(&strip_data[..expected]);
        }

        BandSet::from_chunky(layout.clone(), buffer)
    }

    /// Read band-grouped strips directly into per-band planes
    ///
    /// With PlanarConfiguration 2 the strips come in band order: all of
    /// band 1's strips, then all of band 2's, and so on.
    fn read_planar(
        &mut self,
        layout: &RasterLayout,
        rows_per_strip: u32,
        strips_per_band: u32,
        strip_offsets: &[u64],
        strip_byte_counts: &[u64],
        compression_handler: &dyn CompressionHandler
    ) -> TiffResult<BandSet> {
        let needed = strips_per_band as usize * layout.bands as usize;
        if needed > strip_offsets.len() {
            return Err(TiffError::GenericError(format!(
                "Need {} strips but file has {}", needed, strip_offsets.len())));
        }

        let row_bytes = layout.plane_row_bytes();
        let mut planes = Vec::with_capacity(layout.bands as usize);

        for band in 0..layout.bands as u32 {
            let mut plane = vec![0u8; layout.plane_bytes()];

            for strip_idx in 0..strips_per_band {
                let index = (band * strips_per_band + strip_idx) as usize;
                let rows_in_strip = rows_per_strip
                    .min(layout.height - strip_idx * rows_per_strip);

                debug!("Reading band {} strip {} (file strip {})", band + 1, strip_idx, index);

                let strip_data = self.read_strip(
                    strip_offsets[index],
                    strip_byte_counts[index],
                    compression_handler,
                    layout,
                    row_bytes,
                    1
                )?;

                let expected = rows_in_strip as usize * row_bytes;
                if strip_data.len() < expected {
                    return Err(TiffError::GenericError(format!(
                        "Strip {} has {} bytes, expected at least {}",
                        index, strip_data.len(), expected)));
                }

                let dest_start = strip_idx as usize * rows_per_strip as usize * row_bytes;
                plane[dest_start..dest_start + expected]
                    .copy_from_slice(&strip_data[..expected]);
            }

            planes.push(plane);
        }

        BandSet::from_planes(layout.clone(), planes)
    }

    /// Read and decode a single strip
    ///
    /// Reads the compressed bytes, decompresses them and undoes the
    /// predictor if one was applied.
    fn read_strip(
        &mut self,
        offset: u64,
        byte_count: u64,
        compression_handler: &dyn CompressionHandler,
        layout: &RasterLayout,
        row_bytes: usize,
        channels: usize
    ) -> TiffResult<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let mut compressed_data = vec![0u8; byte_count as usize];
        self.reader.read_exact(&mut compressed_data)?;

        let mut strip_data = compression_handler.decompress(&compressed_data)?;

        if layout.predictor == predictor::HORIZONTAL_DIFFERENCING as u64 {
            band_data::undo_horizontal_predictor(&mut strip_data, row_bytes, channels);
        }

        Ok(strip_data)
    }
}
