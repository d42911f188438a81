//! Tests for the TIFF reader

use std::io::Cursor;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::tiff::constants::tags;
use crate::tiff::reader::TiffReader;
use crate::tiff::tests::test_utils;

#[test]
fn test_read_standard_tiff_structure() {
    let mut cursor = test_utils::create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifds.len(), 1);

    let ifd = &tiff.ifds[0];
    assert_eq!(ifd.entry_count(), 4);
    assert_eq!(ifd.get_dimensions(), Some((800, 600)));
    assert_eq!(ifd.get_samples_per_pixel(), 3);
}

#[test]
fn test_read_bigtiff_structure() {
    let mut cursor = test_utils::create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    assert!(tiff.is_big_tiff);
    assert_eq!(tiff.ifds.len(), 1);
    assert_eq!(tiff.ifds[0].get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_read_external_tag_values() {
    let mut cursor = test_utils::create_test_tiff_buffer();
    let mut reader = TiffReader::new();

    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = &tiff.ifds[0];

    // BitsPerSample has three SHORTs stored past the IFD
    let bits = reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap();
    assert_eq!(bits, vec![8, 8, 8]);
}

#[test]
fn test_read_inline_multi_value_tag() {
    // A two-band BitsPerSample array fits in the four inline bytes
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(1).unwrap();      // Entry count

    // BitsPerSample (tag 258): two SHORTs [8, 16] packed inline
    buffer.write_u16::<LittleEndian>(258).unwrap();
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (SHORT)
    buffer.write_u32::<LittleEndian>(2).unwrap();      // Count
    buffer.write_u16::<LittleEndian>(8).unwrap();      // First value
    buffer.write_u16::<LittleEndian>(16).unwrap();     // Second value

    buffer.write_u32::<LittleEndian>(0).unwrap();      // Next IFD offset

    let mut cursor = Cursor::new(buffer);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let bits = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::BITS_PER_SAMPLE).unwrap();
    assert_eq!(bits, vec![8, 16]);
}

#[test]
fn test_invalid_version_rejected() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(99).unwrap();     // Not 42 or 43
    buffer.write_u32::<LittleEndian>(8).unwrap();

    let mut cursor = Cursor::new(buffer);
    let mut reader = TiffReader::new();

    assert!(reader.read(&mut cursor).is_err());
}
