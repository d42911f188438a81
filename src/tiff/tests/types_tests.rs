//! Tests for the TIFF types module

use crate::tiff::types::TIFF;
use crate::tiff::ifd::{IFD, IFDEntry};

#[test]
fn test_tiff_creation() {
    let tiff = TIFF::new(false);
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 0);
    assert!(tiff.main_ifd().is_none());
}

#[test]
fn test_tiff_with_ifds() {
    let mut tiff = TIFF::new(true);

    // Create main IFD
    let mut main_ifd = IFD::new(0, 16);
    main_ifd.add_entry(IFDEntry::new(256, 4, 1, 1024));
    main_ifd.add_entry(IFDEntry::new(257, 4, 1, 768));
    tiff.ifds.push(main_ifd);

    // Create an overview IFD (subfile type 1)
    let mut overview_ifd = IFD::new(1, 100);
    overview_ifd.add_entry(IFDEntry::new(254, 4, 1, 1)); // Subfile type = 1 (reduced resolution)
    overview_ifd.add_entry(IFDEntry::new(256, 4, 1, 512));
    overview_ifd.add_entry(IFDEntry::new(257, 4, 1, 384));
    tiff.ifds.push(overview_ifd);

    // Test TIFF properties
    assert!(tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 2);
    assert!(tiff.main_ifd().is_some());

    // Test overviews
    let overviews = tiff.overviews();
    assert_eq!(overviews.len(), 1);
    assert_eq!(overviews[0].get_dimensions(), Some((512, 384)));
}

#[test]
fn test_main_ifd_skips_leading_overview() {
    let mut tiff = TIFF::new(false);

    // Overview listed first
    let mut overview_ifd = IFD::new(0, 8);
    overview_ifd.add_entry(IFDEntry::new(254, 4, 1, 1));
    overview_ifd.add_entry(IFDEntry::new(256, 4, 1, 100));
    tiff.ifds.push(overview_ifd);

    // Full-resolution image second
    let mut main_ifd = IFD::new(1, 200);
    main_ifd.add_entry(IFDEntry::new(256, 4, 1, 400));
    main_ifd.add_entry(IFDEntry::new(257, 4, 1, 300));
    tiff.ifds.push(main_ifd);

    let main = tiff.main_ifd().unwrap();
    assert_eq!(main.get_dimensions(), Some((400, 300)));
}

#[test]
fn test_ifd_samples_per_pixel_default() {
    let ifd = IFD::new(0, 8);
    assert_eq!(ifd.get_samples_per_pixel(), 1);
}

#[test]
fn test_ifd_tiled_detection() {
    let mut ifd = IFD::new(0, 8);
    assert!(!ifd.is_tiled());

    ifd.add_entry(IFDEntry::new(324, 4, 1, 1000)); // TileOffsets
    assert!(ifd.is_tiled());
}
