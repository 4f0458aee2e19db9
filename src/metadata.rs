//! Decoders for extension payloads carried in `APP1`/`APP2` segments.
//!
//! Two formats are understood:
//!
//! - XMP packets in `APP1`, identified by the Adobe namespace prefix ([`decode_xmp`]).
//! - ISO 21496-1 gain-map metadata in `APP2`, a fixed big-endian structure of rational numbers
//!   ([`decode_gainmap`]).
//!
//! Neither decoder depends on the segment walker; payloads may come from [`crate::walk`] or be
//! sliced out of a buffer by the caller.

#[cfg(test)]
mod tests;

mod gainmap;
mod xmp;

pub use gainmap::{
    decode_gainmap, Channel, ChannelRecord, DecodedGainMap, GainMapMetadata, GainMapWarning,
    HdrHeadroom, Numerator, Rational, SRational, URational, ISO21496_URN,
};
pub(crate) use gainmap::is_gainmap_payload;
pub use xmp::{decode_xmp, encode_xmp_segment, XMP_IDENTIFIER};
