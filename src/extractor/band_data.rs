//! Band data structures
//!
//! This module models the raw sample data of a raster as a set of
//! per-band planes, together with the layout facts needed to read and
//! rewrite them: dimensions, bit depth, sample formats, compression,
//! predictor and planar configuration.

use log::{debug, info};

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{photometric, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Describes how a raster's sample data is laid out
#[derive(Debug, Clone)]
pub struct RasterLayout {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of bands (samples per pixel)
    pub bands: u16,
    /// Bits per sample, common to all bands
    pub bits_per_sample: u16,
    /// TIFF compression code of the source data
    pub compression: u64,
    /// Predictor applied before compression
    pub predictor: u64,
    /// Planar configuration (chunky or planar)
    pub planar: u64,
    /// Photometric interpretation of the source
    pub photometric: u16,
    /// Sample format per band
    pub sample_formats: Vec<u16>,
}

impl RasterLayout {
    /// Derive the layout from an IFD
    ///
    /// Validates up front everything the split path depends on, so the
    /// readers can assume a well-formed layout.
    pub fn from_ifd(
        ifd: &IFD,
        reader: &TiffReader,
        file_reader: &mut dyn SeekableReader
    ) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions()
            .ok_or(TiffError::MissingDimensions)?;
        let bands = ifd.get_samples_per_pixel() as u16;

        // Bit depth: one value per band, which must agree and be whole bytes
        let bits_values = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
            reader.read_tag_values(file_reader, ifd, tags::BITS_PER_SAMPLE)?
        } else {
            vec![8]
        };

        let bits_per_sample = bits_values.first().copied().unwrap_or(8) as u16;
        if bits_values.iter().any(|&b| b as u16 != bits_per_sample) {
            return Err(TiffError::MixedBitDepths);
        }
        if bits_per_sample == 0 || bits_per_sample % 8 != 0 || bits_per_sample > 64 {
            return Err(TiffError::UnsupportedBitDepth(bits_per_sample));
        }

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);

        let predictor_value = ifd.get_tag_value(tags::PREDICTOR)
            .unwrap_or(predictor::NONE as u64);
        match predictor_value {
            p if p == predictor::NONE as u64 => {},
            p if p == predictor::HORIZONTAL_DIFFERENCING as u64 => {
                // Differencing is only undone for byte-sized samples
                if bits_per_sample != 8 {
                    return Err(TiffError::UnsupportedPredictor(predictor_value));
                }
            },
            _ => return Err(TiffError::UnsupportedPredictor(predictor_value)),
        }

        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION)
            .unwrap_or(planar_config::CHUNKY as u64);
        if planar != planar_config::CHUNKY as u64 && planar != planar_config::PLANAR as u64 {
            return Err(TiffError::UnsupportedPlanarConfig(planar));
        }

        let photometric_value = ifd.get_tag_value(tags::PHOTOMETRIC_INTERPRETATION)
            .unwrap_or(photometric::BLACK_IS_ZERO as u64) as u16;

        // Sample format: absent means unsigned; a single value covers all bands
        let sample_formats = if ifd.has_tag(tags::SAMPLE_FORMAT) {
            let values = reader.read_tag_values(file_reader, ifd, tags::SAMPLE_FORMAT)?;
            if values.len() == 1 {
                vec![values[0] as u16; bands as usize]
            } else {
                values.iter().map(|&v| v as u16).collect()
            }
        } else {
            vec![sample_format::UNSIGNED; bands as usize]
        };

        info!("Raster layout: {}x{}, {} band(s), {} bits, compression {}, planar {}",
              width, height, bands, bits_per_sample, compression, planar);

        Ok(RasterLayout {
            width: width as u32,
            height: height as u32,
            bands,
            bits_per_sample,
            compression,
            predictor: predictor_value,
            planar,
            photometric: photometric_value,
            sample_formats,
        })
    }

    /// Bytes per sample
    pub fn sample_size(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Bytes per image row in a single band's plane
    pub fn plane_row_bytes(&self) -> usize {
        self.width as usize * self.sample_size()
    }

    /// Bytes per image row with all bands interleaved
    pub fn chunky_row_bytes(&self) -> usize {
        self.plane_row_bytes() * self.bands as usize
    }

    /// Total bytes in a single band's plane
    pub fn plane_bytes(&self) -> usize {
        self.plane_row_bytes() * self.height as usize
    }

    /// Whether the bands are stored as separate planes in the source
    pub fn is_planar(&self) -> bool {
        self.planar == planar_config::PLANAR as u64 && self.bands > 1
    }

    /// Sample format for one band
    pub fn sample_format(&self, band: usize) -> u16 {
        self.sample_formats.get(band)
            .copied()
            .unwrap_or(sample_format::UNSIGNED)
    }
}

/// The complete pixel data of a raster, one plane per band
pub struct BandSet {
    /// Layout facts describing the planes
    pub layout: RasterLayout,
    /// Raw sample bytes per band, row-major
    planes: Vec<Vec<u8>>,
}

impl BandSet {
    /// Build a band set from already-separate planes
    pub fn from_planes(layout: RasterLayout, planes: Vec<Vec<u8>>) -> TiffResult<Self> {
        if planes.len() != layout.bands as usize {
            return Err(TiffError::GenericError(format!(
                "Expected {} planes, got {}", layout.bands, planes.len())));
        }

        let expected = layout.plane_bytes();
        for (i, plane) in planes.iter().enumerate() {
            if plane.len() != expected {
                return Err(TiffError::GenericError(format!(
                    "Band {} plane has {} bytes, expected {}", i + 1, plane.len(), expected)));
            }
        }

        Ok(BandSet { layout, planes })
    }

    /// Build a band set by de-interleaving a chunky buffer
    ///
    /// The buffer holds whole pixels (all bands of pixel 0, then all bands
    /// of pixel 1, and so on); each band's samples are pulled out into a
    /// contiguous plane.
    pub fn from_chunky(layout: RasterLayout, buffer: Vec<u8>) -> TiffResult<Self> {
        let bands = layout.bands as usize;
        let sample_size = layout.sample_size();
        let pixel_count = layout.width as usize * layout.height as usize;

        let expected = pixel_count * bands * sample_size;
        if buffer.len() != expected {
            return Err(TiffError::GenericError(format!(
                "Interleaved buffer has {} bytes, expected {}", buffer.len(), expected)));
        }

        debug!("De-interleaving {} pixels into {} planes", pixel_count, bands);

        let mut planes = vec![vec![0u8; pixel_count * sample_size]; bands];

        for pixel in 0..pixel_count {
            let src_base = pixel * bands * sample_size;
            let dst_base = pixel * sample_size;
            for (band, plane) in planes.iter_mut().enumerate() {
                let src = src_base + band * sample_size;
                plane[dst_base..dst_base + sample_size]
                    .copy_from_slice(&buffer[src..src + sample_size]);
            }
        }

        Ok(BandSet { layout, planes })
    }

    /// Number of bands in this set
    pub fn band_count(&self) -> usize {
        self.planes.len()
    }

    /// Raw plane bytes for one band (0-based)
    pub fn plane(&self, band: usize) -> &[u8] {
        &self.planes[band]
    }

    /// Reverse the byte order of every sample in every plane
    ///
    /// Output files are always little-endian, so planes read from a
    /// big-endian source are swapped once here.
    pub fn normalize_endianness(&mut self) {
        let sample_size = self.layout.sample_size();
        if sample_size <= 1 {
            return;
        }

        debug!("Swapping sample bytes for {} planes", self.planes.len());
        for plane in &mut self.planes {
            for sample in plane.chunks_exact_mut(sample_size) {
                sample.reverse();
            }
        }
    }
}

/// Undo horizontal-differencing prediction in place
///
/// Each sample after the first in a row stores the delta to its left
/// neighbour in the same channel; accumulating restores the original
/// values. Only valid for 8-bit samples.
pub(crate) fn undo_horizontal_predictor(data: &mut [u8], row_bytes: usize, channels: usize) {
    if row_bytes == 0 || channels == 0 {
        return;
    }

    for row in data.chunks_mut(row_bytes) {
        for i in channels..row.len() {
            row[i] = row[i].wrapping_add(row[i - channels]);
        }
    }
}
