//! Tile-based raster data reading
//!
//! This module implements a reader for extracting raw sample data from
//! tiled TIFF files. Tiled TIFFs organize image data in rectangular tiles
//! of equal size; edge tiles are padded out to the full tile dimensions,
//! so rows have to be cropped when assembling the image.

use log::{debug, info};
use std::io::SeekFrom;

use crate::io::seekable::SeekableReader;
use crate::tiff::{TiffReader, TiffError};
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;
use crate::tiff::constants::{predictor, tags};
use crate::compression::{CompressionFactory, CompressionHandler};

use super::band_data::{self, BandSet, RasterLayout};

/// Reads raw sample data from tiled TIFF files
pub struct TileReader<'a, R: SeekableReader> {
    /// Reader for accessing the TIFF file
    reader: R,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
}

impl<'a, R: SeekableReader> TileReader<'a, R> {
    /// Create a new tile reader
    pub fn new(reader: R, ifd: &'a IFD, tiff_reader: &'a TiffReader) -> Self {
        TileReader {
            reader,
            ifd,
            tiff_reader
        }
    }

    /// Get tile dimensions from the IFD
    ///
    /// Defaults to 256x256 if the tags are not present.
    fn get_tile_dimensions(&self) -> (u32, u32) {
        let tile_width = self.ifd.get_tag_value(tags::TILE_WIDTH)
            .unwrap_or(256) as u32;
        let tile_height = self.ifd.get_tag_value(tags::TILE_LENGTH)
            .unwrap_or(256) as u32;

        (tile_width, tile_height)
    }

    /// Read the full image into a band set
    pub fn read_bands(&mut self, layout: &RasterLayout) -> TiffResult<BandSet> {
        let (tile_width, tile_height) = self.get_tile_dimensions();
        if tile_width == 0 || tile_height == 0 {
            return Err(TiffError::GenericError("Tile dimensions are zero".to_string()));
        }
        info!("Tile dimensions: {}x{}", tile_width, tile_height);

        let compression_handler = CompressionFactory::create_handler(layout.compression)?;
        info!("Using compression: {}", compression_handler.name());

        let tile_offsets = self.tiff_reader.read_tag_values(
            &mut self.reader, self.ifd, tags::TILE_OFFSETS)?;
        let tile_byte_counts = self.tiff_reader.read_tag_values(
            &mut self.reader, self.ifd, tags::TILE_BYTE_COUNTS)?;

        if tile_offsets.len() != tile_byte_counts.len() {
            return Err(TiffError::GenericError(format!(
                "Tile offset/byte count mismatch: {} vs {}",
                tile_offsets.len(), tile_byte_counts.len())));
        }

        let tiles_across = (layout.width + tile_width - 1) / tile_width;
        let tiles_down = (layout.height + tile_height - 1) / tile_height;
        let tiles_per_band = (tiles_across * tiles_down) as usize;

        info!("Tile grid: {}x{} ({} tiles per band)", tiles_across, tiles_down, tiles_per_band);

        if layout.is_planar() {
            self.read_planar(layout, tile_width, tile_height, tiles_across, tiles_per_band,
                             &tile_offsets, &tile_byte_counts, &*compression_handler)
        } else {
            self.read_chunky(layout, tile_width, tile_height, tiles_across, tiles_per_band,
                             &tile_offsets, &tile_byte_counts, &*compression_handler)
        }
    }

    /// Assemble interleaved tiles into one buffer and de-interleave
    fn read_chunky(
        &mut self,
        layout: &RasterLayout,
        tile_width: u32,
        tile_height: u32,
        tiles_across: u32,
        tile_count: usize,
        tile_offsets: &[u64],
        tile_byte_counts: &[u64],
        compression_handler: &dyn CompressionHandler
    ) -> TiffResult<BandSet> {
        if tile_count > tile_offsets.len() {
            return Err(TiffError::GenericError(format!(
                "Need {} tiles but file has {}", tile_count, tile_offsets.len())));
        }

        let pixel_bytes = layout.bands as usize * layout.sample_size();
        let image_row_bytes = layout.chunky_row_bytes();
        let tile_row_bytes = tile_width as usize * pixel_bytes;

        let mut buffer = vec![0u8; image_row_bytes * layout.height as usize];

        for tile_index in 0..tile_count {
            let tile_data = self.read_tile(
                tile_offsets[tile_index],
                tile_byte_counts[tile_index],
                compression_handler,
                layout,
                tile_row_bytes,
                layout.bands as usize
            )?;

            let expected = tile_row_bytes * tile_height as usize;
            if tile_data.len() < expected {
                return Err(TiffError::GenericError(format!(
                    "Tile {} has {} bytes, expected at least {}",
                    tile_index, tile_data.len(), expected)));
            }

            self.copy_tile_rows(
                &tile_data,
                &mut buffer,
                tile_index as u32,
                tiles_across,
                tile_width,
                tile_height,
                layout.width,
                layout.height,
                pixel_bytes,
                image_row_bytes,
                tile_row_bytes
            );
        }

        BandSet::from_chunky(layout.clone(), buffer)
    }

    /// Read band-grouped tiles directly into per-band planes
    ///
    /// With PlanarConfiguration 2 the tiles come in band order: the full
    /// tile grid for band 1, then the grid for band 2, and so on.
    fn read_planar(
        &mut self,
        layout: &RasterLayout,
        tile_width: u32,
        tile_height: u32,
        tiles_across: u32,
        tiles_per_band: usize,
        tile_offsets: &[u64],
        tile_byte_counts: &[u64],
        compression_handler: &dyn CompressionHandler
    ) -> TiffResult<BandSet> {
        let needed = tiles_per_band * layout.bands as usize;
        if needed > tile_offsets.len() {
            return Err(TiffError::GenericError(format!(
                "Need {} tiles but file has {}", needed, tile_offsets.len())));
        }

        let sample_size = layout.sample_size();
        let plane_row_bytes = layout.plane_row_bytes();
        let tile_row_bytes = tile_width as usize * sample_size;

        let mut planes = Vec::with_capacity(layout.bands as usize);

        for band in 0..layout.bands as usize {
            let mut plane = vec![0u8; layout.plane_bytes()];

            for grid_index in 0..tiles_per_band {
                let index = band * tiles_per_band + grid_index;

                debug!("Reading band {} tile {} (file tile {})", band + 1, grid_index, index);

                let tile_data = self.read_tile(
                    tile_offsets[index],
                    tile_byte_counts[index],
                    compression_handler,
                    layout,
                    tile_row_bytes,
                    1
                )?;

                let expected = tile_row_bytes * tile_height as usize;
                if tile_data.len() < expected {
                    return Err(TiffError::GenericError(format!(
                        "Tile {} has {} bytes, expected at least {}",
                        index, tile_data.len(), expected)));
                }

                self.copy_tile_rows(
                    &tile_data,
                    &mut plane,
                    grid_index as u32,
                    tiles_across,
                    tile_width,
                    tile_height,
                    layout.width,
                    layout.height,
                    sample_size,
                    plane_row_bytes,
                    tile_row_bytes
                );
            }

            planes.push(plane);
        }

        BandSet::from_planes(layout.clone(), planes)
    }

    /// Copy the in-bounds rows of a tile into the destination buffer
    ///
    /// Maps the tile's grid position to pixel coordinates and crops
    /// both the right-edge columns and bottom-edge rows of edge tiles.
    fn copy_tile_rows(
        &self,
        tile_data: &[u8],
        dest: &mut [u8],
        grid_index: u32,
        tiles_across: u32,
        tile_width: u32,
        tile_height: u32,
        image_width: u32,
        image_height: u32,
        pixel_bytes: usize,
        dest_row_bytes: usize,
        tile_row_bytes: usize
    ) {
        let tile_x = grid_index % tiles_across;
        let tile_y = grid_index / tiles_across;

        let start_x = tile_x * tile_width;
        let start_y = tile_y * tile_height;

        // Edge tiles are padded; only the in-bounds part is copied
        let copy_cols = tile_width.min(image_width - start_x) as usize;
        let copy_rows = tile_height.min(image_height - start_y) as usize;
        let copy_bytes = copy_cols * pixel_bytes;

        for row in 0..copy_rows {
            let src_start = row * tile_row_bytes;
            let dest_start = (start_y as usize + row) * dest_row_bytes
                + start_x as usize * pixel_bytes;

            dest[dest_start..dest_start + copy_bytes]
                .copy_from_slice(&tile_data[src_start..src_start + copy_bytes]);
        }
    }

    /// Read and decode a single tile
    fn read_tile(
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

        let mut tile_data = compression_handler.decompress(&compressed_data)?;

        if layout.predictor == predictor::HORIZONTAL_DIFFERENCING as u64 {
            band_data::undo_horizontal_predictor(&mut tile_data, row_bytes, channels);
        }

        Ok(tile_data)
    }
}
