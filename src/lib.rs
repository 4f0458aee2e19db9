//! Structural inspection of JPEG-family files.
//!
//! This crate does not decode any pixel data. It provides three independent tools that operate
//! on an in-memory buffer:
//!
//! - [`walk`] steps through the marker segments of a JPEG stream, skipping entropy-coded scan
//!   data, and identifies well-known `APPn` payloads.
//! - [`decode_xmp`] and [`decode_gainmap`] decode XMP packets and ISO 21496-1 gain-map metadata
//!   from `APP1`/`APP2` segments.
//! - [`extract`] recovers the (possibly nested) JPEG streams stored in a single buffer, such as
//!   a main image with an embedded thumbnail and an appended gain map.
//!
//! All results borrow from or index into the caller's buffer. Advisory conditions are returned
//! as warnings alongside the results and logged through the [`log`] crate; only structural
//! failures produce an [`Error`].

mod error;
mod file;
mod metadata;
mod reader;
mod streams;

pub use error::{Error, ErrorKind};
pub use file::{
    walk, AppKind, DensityUnit, Dri, Jfif, Marker, Segment, SegmentKind, SegmentStatus,
    SegmentWalker, Sof, Walk, WalkWarning,
};
pub use metadata::{
    decode_gainmap, decode_xmp, encode_xmp_segment, Channel, ChannelRecord, DecodedGainMap,
    GainMapMetadata, GainMapWarning, HdrHeadroom, Numerator, Rational, SRational, URational,
    ISO21496_URN, XMP_IDENTIFIER,
};
pub use streams::{extract, ExtractWarning, Extraction, JpegStream, StreamRole};
