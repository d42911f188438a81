//! TIFF construction strategies
//!
//! Tag-group builders used by `TiffBuilder` to assemble new files.

pub(crate) mod basic_tags;
pub(crate) mod geo_tags;
pub(crate) mod writer;
