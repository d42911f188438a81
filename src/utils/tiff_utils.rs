//! TIFF utility functions
//!
//! Common operations for working with TIFF files that are used
//! across different modules. This module provides utilities for
//! tag manipulation and tag copying between IFDs.

use crate::tiff::ifd::{IFD, IFDEntry};
use log::trace;
use std::collections::HashMap;

/// Update an IFD tag, replacing it if it already exists
///
/// This helper function simplifies the common pattern of removing an existing
/// tag and adding a new one with the same ID. This is frequently needed when
/// deriving a new IFD from an existing file's metadata.
pub fn update_ifd_tag(ifd: &mut IFD, tag: u16, entry: IFDEntry) {
    // Remove any existing entry with this tag
    ifd.entries.retain(|e| e.tag != tag);
    // Add the new entry
    ifd.add_entry(entry);
}

/// Create and store external tag data
///
/// In TIFF files, tag data that's too large to fit in the IFD entry itself
/// is stored externally in the file. This function handles the pattern of
/// creating a tag entry and associating it with external data that will be
/// written elsewhere in the file.
///
/// # Parameters
/// * `ifd` - The IFD where the tag will be added
/// * `external_data` - A map that stores external data by (IFD index, tag ID)
/// * `ifd_index` - The index of the current IFD
/// * `tag` - The tag ID
/// * `field_type` - The data type code
/// * `count` - The number of values
/// * `data` - The actual tag data as a byte vector
pub fn create_external_tag(
    ifd: &mut IFD,
    external_data: &mut HashMap<(usize, u16), Vec<u8>>,
    ifd_index: usize,
    tag: u16,
    field_type: u16,
    count: u64,
    data: Vec<u8>
) {
    update_ifd_tag(ifd, tag, IFDEntry::new(tag, field_type, count, 0));
    external_data.insert((ifd_index, tag), data);
}

/// Copy specific tags from source IFD to destination IFD
///
/// Copies the specified list of tags from the source IFD to the destination
/// IFD, handling duplicate resolution by replacing any existing tags.
/// Only the entries themselves are copied; callers must handle externally
/// stored tag data separately.
pub fn copy_tags(
    dest_ifd: &mut IFD,
    source_ifd: &IFD,
    tags: &[u16]
) {
    for &tag in tags {
        if let Some(entry) = source_ifd.get_entry(tag) {
            trace!("Copying tag {} from source IFD to destination", tag);
            update_ifd_tag(dest_ifd, tag, entry.clone());
        }
    }
}
