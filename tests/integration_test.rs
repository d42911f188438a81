//! Integration tests for band splitting
//!
//! Each test hand-assembles a little-endian TIFF fixture on disk, runs the
//! split through the public API, and re-reads the outputs to check band
//! count, metadata and bit-for-bit pixel equality against the source.

use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use bandsplit::compression::{AdobeDeflateHandler, CompressionHandler};
use bandsplit::tiff::TiffReader;
use bandsplit::BandSplit;

// ---------------------------------------------------------------------------
// Fixture assembly
// ---------------------------------------------------------------------------

/// Tag payloads the fixture writer knows how to encode
enum Val {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Double(Vec<f64>),
    Ascii(Vec<u8>),
    /// A LONG array whose values are the offsets of the given data blobs
    BlobOffsets(Vec<usize>),
}

struct TagSpec {
    tag: u16,
    val: Val,
}

impl TagSpec {
    fn new(tag: u16, val: Val) -> Self {
        TagSpec { tag, val }
    }

    fn field_type(&self) -> u16 {
        match self.val {
            Val::Short(_) => 3,
            Val::Long(_) | Val::BlobOffsets(_) => 4,
            Val::Double(_) => 12,
            Val::Ascii(_) => 2,
        }
    }

    fn count(&self) -> u32 {
        match &self.val {
            Val::Short(v) => v.len() as u32,
            Val::Long(v) => v.len() as u32,
            Val::Double(v) => v.len() as u32,
            Val::Ascii(v) => v.len() as u32,
            Val::BlobOffsets(v) => v.len() as u32,
        }
    }

    fn payload_size(&self) -> usize {
        match &self.val {
            Val::Short(v) => v.len() * 2,
            Val::Long(v) => v.len() * 4,
            Val::Double(v) => v.len() * 8,
            Val::Ascii(v) => v.len(),
            Val::BlobOffsets(v) => v.len() * 4,
        }
    }

    fn encode(&self, blob_offsets: &[usize]) -> Vec<u8> {
        let mut bytes = Vec::new();
        match &self.val {
            Val::Short(v) => {
                for x in v {
                    bytes.extend_from_slice(&x.to_le_bytes());
                }
            }
            Val::Long(v) => {
                for x in v {
                    bytes.extend_from_slice(&x.to_le_bytes());
                }
            }
            Val::Double(v) => {
                for x in v {
                    bytes.extend_from_slice(&x.to_le_bytes());
                }
            }
            Val::Ascii(v) => bytes.extend_from_slice(v),
            Val::BlobOffsets(v) => {
                for i in v {
                    bytes.extend_from_slice(&(blob_offsets[*i] as u32).to_le_bytes());
                }
            }
        }
        bytes
    }
}

fn align4(offset: usize) -> usize {
    (offset + 3) & !3
}

/// Write a standard little-endian TIFF with one IFD, the given tags, and
/// the given data blobs placed after the tag payloads
fn write_fixture(path: &Path, mut specs: Vec<TagSpec>, blobs: Vec<Vec<u8>>) {
    specs.sort_by_key(|s| s.tag);
    let n = specs.len();
    let ifd_end = 8 + 2 + 12 * n + 4;

    // Lay out external tag payloads, then data blobs
    let mut next_offset = align4(ifd_end);
    let mut payload_offsets = vec![0usize; n];
    for (i, spec) in specs.iter().enumerate() {
        if spec.payload_size() > 4 {
            payload_offsets[i] = next_offset;
            next_offset = align4(next_offset + spec.payload_size());
        }
    }

    let mut blob_offsets = Vec::with_capacity(blobs.len());
    for blob in &blobs {
        blob_offsets.push(next_offset);
        next_offset = align4(next_offset + blob.len());
    }

    let mut out = vec![0u8; next_offset];

    // Header
    out[0..2].copy_from_slice(b"II");
    out[2..4].copy_from_slice(&42u16.to_le_bytes());
    out[4..8].copy_from_slice(&8u32.to_le_bytes());

    // IFD
    out[8..10].copy_from_slice(&(n as u16).to_le_bytes());
    for (i, spec) in specs.iter().enumerate() {
        let base = 10 + 12 * i;
        out[base..base + 2].copy_from_slice(&spec.tag.to_le_bytes());
        out[base + 2..base + 4].copy_from_slice(&spec.field_type().to_le_bytes());
        out[base + 4..base + 8].copy_from_slice(&spec.count().to_le_bytes());

        if spec.payload_size() > 4 {
            out[base + 8..base + 12]
                .copy_from_slice(&(payload_offsets[i] as u32).to_le_bytes());
        } else {
            let payload = spec.encode(&blob_offsets);
            out[base + 8..base + 8 + payload.len()].copy_from_slice(&payload);
        }
    }
    // Next IFD offset is already zero

    // External tag payloads
    for (i, spec) in specs.iter().enumerate() {
        if spec.payload_size() > 4 {
            let payload = spec.encode(&blob_offsets);
            out[payload_offsets[i]..payload_offsets[i] + payload.len()]
                .copy_from_slice(&payload);
        }
    }

    // Data blobs
    for (blob, offset) in blobs.iter().zip(&blob_offsets) {
        out[*offset..*offset + blob.len()].copy_from_slice(blob);
    }

    fs::write(path, out).unwrap();
}

/// Deterministic 8-bit sample value for band `band`, pixel `i`
fn px(band: usize, i: usize) -> u8 {
    (17 + band * 40 + i * 3) as u8
}

/// Tag set for an uncompressed chunky stripped image
fn chunky_specs(width: u32, height: u32, bands: u16, bits: u16, compression: u16, strip_len: usize) -> Vec<TagSpec> {
    let photometric = if bands >= 3 { 2 } else { 1 };
    vec![
        TagSpec::new(256, Val::Long(vec![width])),
        TagSpec::new(257, Val::Long(vec![height])),
        TagSpec::new(258, Val::Short(vec![bits; bands as usize])),
        TagSpec::new(259, Val::Short(vec![compression])),
        TagSpec::new(262, Val::Short(vec![photometric])),
        TagSpec::new(273, Val::BlobOffsets(vec![0])),
        TagSpec::new(277, Val::Short(vec![bands])),
        TagSpec::new(278, Val::Long(vec![height])),
        TagSpec::new(279, Val::Long(vec![strip_len as u32])),
        TagSpec::new(284, Val::Short(vec![1])),
    ]
}

/// Fresh working directory for one test
fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bandsplit_it_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn api_for(dir: &Path) -> BandSplit {
    let log_path = dir.join("test.log");
    BandSplit::new(Some(log_path.to_str().unwrap())).unwrap()
}

// ---------------------------------------------------------------------------
// Output verification
// ---------------------------------------------------------------------------

struct BandFile {
    width: u64,
    height: u64,
    samples: u64,
    bits: u64,
    compression: u64,
    photometric: Option<u64>,
    pixels: Vec<u8>,
}

/// Load a written band file and decode its pixel data
fn read_band_file(path: &Path) -> BandFile {
    let mut reader = TiffReader::new();
    let tiff = reader.load(path.to_str().unwrap()).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let (width, height) = ifd.get_dimensions().unwrap();
    let samples = ifd.get_samples_per_pixel();

    let mut file = File::open(path).unwrap();
    let bits = reader.read_tag_values(&mut file, ifd, 258).unwrap();
    let offsets = reader.read_tag_values(&mut file, ifd, 273).unwrap();
    let counts = reader.read_tag_values(&mut file, ifd, 279).unwrap();
    assert_eq!(offsets.len(), counts.len());

    let raw = fs::read(path).unwrap();
    let mut stored = Vec::new();
    for (offset, count) in offsets.iter().zip(&counts) {
        stored.extend_from_slice(&raw[*offset as usize..(*offset + *count) as usize]);
    }

    let compression = ifd.get_tag_value(259).unwrap_or(1);
    let pixels = match compression {
        1 => stored,
        8 => AdobeDeflateHandler.decompress(&stored).unwrap(),
        other => panic!("unexpected output compression {}", other),
    };

    BandFile {
        width,
        height,
        samples,
        bits: bits[0],
        compression,
        photometric: ifd.get_tag_value(262),
        pixels,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_three_band_split() {
    let dir = test_dir("three_band");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    // 3-band 4x4 interleaved uint8
    let mut interleaved = Vec::new();
    for i in 0..16 {
        for band in 0..3 {
            interleaved.push(px(band, i));
        }
    }
    write_fixture(&input, chunky_specs(4, 4, 3, 8, 1, interleaved.len()), vec![interleaved]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();

    assert_eq!(written.len(), 3);
    for (band, path) in written.iter().enumerate() {
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("band_{}.tif", band + 1)
        );

        let band_file = read_band_file(path);
        assert_eq!(band_file.width, 4);
        assert_eq!(band_file.height, 4);
        assert_eq!(band_file.samples, 1);
        assert_eq!(band_file.bits, 8);
        assert_eq!(band_file.compression, 1);
        // A lone band of an RGB image comes out grayscale
        assert_eq!(band_file.photometric, Some(1));

        let expected: Vec<u8> = (0..16).map(|i| px(band, i)).collect();
        assert_eq!(band_file.pixels, expected);
    }
}

#[test]
fn test_single_band_passthrough() {
    let dir = test_dir("single_band");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    let data: Vec<u8> = (0..16).map(|i| px(0, i)).collect();
    write_fixture(&input, chunky_specs(4, 4, 1, 8, 1, data.len()), vec![data.clone()]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(written[0].file_name().unwrap().to_str().unwrap(), "band_1.tif");

    let band_file = read_band_file(&written[0]);
    assert_eq!(band_file.samples, 1);
    // Single-band sources keep their own photometric interpretation
    assert_eq!(band_file.photometric, Some(1));
    assert_eq!(band_file.pixels, data);
}

#[test]
fn test_two_band_inline_bit_depths() {
    let dir = test_dir("two_band");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    // Two bands: BitsPerSample [8, 8] fits in the inline value field
    let mut interleaved = Vec::new();
    for i in 0..16 {
        for band in 0..2 {
            interleaved.push(px(band, i));
        }
    }
    write_fixture(&input, chunky_specs(4, 4, 2, 8, 1, interleaved.len()), vec![interleaved]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(written.len(), 2);

    for (band, path) in written.iter().enumerate() {
        let band_file = read_band_file(path);
        let expected: Vec<u8> = (0..16).map(|i| px(band, i)).collect();
        assert_eq!(band_file.pixels, expected);
    }
}

#[test]
fn test_sixteen_bit_samples() {
    let dir = test_dir("sixteen_bit");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    // 2-band 3x3 uint16
    let sample = |band: usize, i: usize| (1000 + band * 2000 + i * 17) as u16;
    let mut interleaved = Vec::new();
    for i in 0..9 {
        for band in 0..2 {
            interleaved.extend_from_slice(&sample(band, i).to_le_bytes());
        }
    }
    write_fixture(&input, chunky_specs(3, 3, 2, 16, 1, interleaved.len()), vec![interleaved]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(written.len(), 2);

    for (band, path) in written.iter().enumerate() {
        let band_file = read_band_file(path);
        assert_eq!(band_file.bits, 16);

        let mut expected = Vec::new();
        for i in 0..9 {
            expected.extend_from_slice(&sample(band, i).to_le_bytes());
        }
        assert_eq!(band_file.pixels, expected);
    }
}

#[test]
fn test_deflate_compressed_source() {
    let dir = test_dir("deflate");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    let mut interleaved = Vec::new();
    for i in 0..16 {
        for band in 0..3 {
            interleaved.push(px(band, i));
        }
    }
    let compressed = AdobeDeflateHandler.compress(&interleaved).unwrap();
    write_fixture(&input, chunky_specs(4, 4, 3, 8, 8, compressed.len()), vec![compressed]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(written.len(), 3);

    for (band, path) in written.iter().enumerate() {
        let band_file = read_band_file(path);
        // Source compression is carried into the outputs
        assert_eq!(band_file.compression, 8);

        let expected: Vec<u8> = (0..16).map(|i| px(band, i)).collect();
        assert_eq!(band_file.pixels, expected);
    }
}

#[test]
fn test_planar_source() {
    let dir = test_dir("planar");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    // PlanarConfiguration 2: one strip per band
    let plane_0: Vec<u8> = (0..16).map(|i| px(0, i)).collect();
    let plane_1: Vec<u8> = (0..16).map(|i| px(1, i)).collect();

    let specs = vec![
        TagSpec::new(256, Val::Long(vec![4])),
        TagSpec::new(257, Val::Long(vec![4])),
        TagSpec::new(258, Val::Short(vec![8, 8])),
        TagSpec::new(259, Val::Short(vec![1])),
        TagSpec::new(262, Val::Short(vec![1])),
        TagSpec::new(273, Val::BlobOffsets(vec![0, 1])),
        TagSpec::new(277, Val::Short(vec![2])),
        TagSpec::new(278, Val::Long(vec![4])),
        TagSpec::new(279, Val::Long(vec![16, 16])),
        TagSpec::new(284, Val::Short(vec![2])),
    ];
    write_fixture(&input, specs, vec![plane_0.clone(), plane_1.clone()]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(written.len(), 2);

    assert_eq!(read_band_file(&written[0]).pixels, plane_0);
    assert_eq!(read_band_file(&written[1]).pixels, plane_1);
}

#[test]
fn test_tiled_source() {
    let dir = test_dir("tiled");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    // One 16x16 tile holding a 4x4 2-band image; edge padding is zeros
    let mut tile = vec![0u8; 16 * 16 * 2];
    for y in 0..4 {
        for x in 0..4 {
            let i = y * 4 + x;
            for band in 0..2 {
                tile[(y * 16 + x) * 2 + band] = px(band, i);
            }
        }
    }

    let specs = vec![
        TagSpec::new(256, Val::Long(vec![4])),
        TagSpec::new(257, Val::Long(vec![4])),
        TagSpec::new(258, Val::Short(vec![8, 8])),
        TagSpec::new(259, Val::Short(vec![1])),
        TagSpec::new(262, Val::Short(vec![1])),
        TagSpec::new(277, Val::Short(vec![2])),
        TagSpec::new(284, Val::Short(vec![1])),
        TagSpec::new(322, Val::Long(vec![16])),
        TagSpec::new(323, Val::Long(vec![16])),
        TagSpec::new(324, Val::BlobOffsets(vec![0])),
        TagSpec::new(325, Val::Long(vec![(16 * 16 * 2) as u32])),
    ];
    write_fixture(&input, specs, vec![tile]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(written.len(), 2);

    for (band, path) in written.iter().enumerate() {
        let band_file = read_band_file(path);
        assert_eq!(band_file.width, 4);
        assert_eq!(band_file.height, 4);

        let expected: Vec<u8> = (0..16).map(|i| px(band, i)).collect();
        assert_eq!(band_file.pixels, expected);
    }
}

#[test]
fn test_geotiff_metadata_carried() {
    let dir = test_dir("geotiff");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    let pixel_scale = [10.0f64, -10.0, 0.0];
    let tiepoint = [0.0f64, 0.0, 0.0, 500000.0, 4649776.0, 0.0];
    // Version header plus two keys: geographic model, pixel-is-area raster
    let geo_keys: Vec<u16> = vec![1, 1, 0, 2, 1024, 0, 1, 2, 1025, 0, 1, 1];

    let mut interleaved = Vec::new();
    for i in 0..16 {
        for band in 0..3 {
            interleaved.push(px(band, i));
        }
    }

    let mut specs = chunky_specs(4, 4, 3, 8, 1, interleaved.len());
    specs.push(TagSpec::new(33550, Val::Double(pixel_scale.to_vec())));
    specs.push(TagSpec::new(33922, Val::Double(tiepoint.to_vec())));
    specs.push(TagSpec::new(34735, Val::Short(geo_keys.clone())));
    specs.push(TagSpec::new(42113, Val::Ascii(b"255\0".to_vec())));
    write_fixture(&input, specs, vec![interleaved]);

    let api = api_for(&dir);
    let written = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(written.len(), 3);

    // Every band file carries the source georeferencing verbatim
    for path in &written {
        let mut reader = TiffReader::new();
        let tiff = reader.load(path.to_str().unwrap()).unwrap();
        let ifd = tiff.main_ifd().unwrap();

        let scale_entry = ifd.get_entry(33550).expect("pixel scale missing");
        let mut expected_scale = Vec::new();
        for v in &pixel_scale {
            expected_scale.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(reader.read_entry_raw_bytes(scale_entry).unwrap(), expected_scale);

        let tie_entry = ifd.get_entry(33922).expect("tiepoint missing");
        let mut expected_tie = Vec::new();
        for v in &tiepoint {
            expected_tie.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(reader.read_entry_raw_bytes(tie_entry).unwrap(), expected_tie);

        let mut file = File::open(path).unwrap();
        let keys = reader.read_tag_values(&mut file, ifd, 34735).unwrap();
        let expected_keys: Vec<u64> = geo_keys.iter().map(|&v| v as u64).collect();
        assert_eq!(keys, expected_keys);

        let nodata = ifd.get_entry(42113).expect("nodata missing");
        assert_eq!(nodata.count, 4);
        assert_eq!(nodata.value_offset, u32::from_le_bytes(*b"255\0") as u64);
    }
}

#[test]
fn test_rerun_overwrites_identically() {
    let dir = test_dir("idempotent");
    let input = dir.join("input.tif");
    let out_dir = dir.join("bands");

    let mut interleaved = Vec::new();
    for i in 0..16 {
        for band in 0..3 {
            interleaved.push(px(band, i));
        }
    }
    write_fixture(&input, chunky_specs(4, 4, 3, 8, 1, interleaved.len()), vec![interleaved]);

    let api = api_for(&dir);
    let first = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    let first_bytes: Vec<Vec<u8>> = first.iter().map(|p| fs::read(p).unwrap()).collect();

    let second = api.split(input.to_str().unwrap(), &out_dir).unwrap();
    assert_eq!(first, second);

    for (path, bytes) in second.iter().zip(&first_bytes) {
        assert_eq!(&fs::read(path).unwrap(), bytes);
    }
}

#[test]
fn test_band_count_and_describe() {
    let dir = test_dir("api");
    let input = dir.join("input.tif");

    let mut interleaved = Vec::new();
    for i in 0..16 {
        for band in 0..3 {
            interleaved.push(px(band, i));
        }
    }
    write_fixture(&input, chunky_specs(4, 4, 3, 8, 1, interleaved.len()), vec![interleaved]);

    let api = api_for(&dir);
    assert_eq!(api.band_count(input.to_str().unwrap()).unwrap(), 3);

    let description = api.describe(input.to_str().unwrap()).unwrap();
    assert!(description.contains("Bands: 3"));
    assert!(description.contains("4x4"));
    assert!(description.contains("strips"));
}

#[test]
fn test_missing_input_fails() {
    let dir = test_dir("missing_input");
    let out_dir = dir.join("bands");

    let api = api_for(&dir);
    let missing = dir.join("does_not_exist.tif");
    assert!(api.split(missing.to_str().unwrap(), &out_dir).is_err());
}
