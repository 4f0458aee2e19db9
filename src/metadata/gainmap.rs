//! ISO 21496-1 gain-map metadata.
//!
//! The metadata is stored in an `APP2` segment of the gain map image. After the usual marker and
//! length field, the payload is laid out as follows (all integers big-endian):
//!
//! | Size   | Field                                                        |
//! |--------|--------------------------------------------------------------|
//! | 28     | URN, null-padded                                             |
//! | 2 + 2  | minimum version, writer version                              |
//! | 1      | flags (bit 7: multichannel, bit 6: use base colour space)    |
//! | 8 + 8  | baseline and alternate HDR headroom (unsigned rationals)     |
//! | 40 × n | channel records, `n` = 3 if multichannel, 1 otherwise        |
//!
//! Each channel record holds five rationals: gain map min, gain map max, gamma, base offset and
//! alternate offset. Only gamma has an unsigned numerator.

use std::fmt;

use bytemuck::AnyBitPattern;

use crate::error::{Error, Repr, Result};
use crate::reader::Reader;

/// The URN identifying an ISO 21496-1 payload.
pub const ISO21496_URN: &str = "urn:iso:std:iso:ts:21496:-1";

const APP2: u16 = 0xFFE2;
const HEADER_LEN: usize = 4;
const URN_FIELD_LEN: usize = 28;
const FIXED_LEN: usize = HEADER_LEN + URN_FIELD_LEN + 4 + 1 + 16;
const CHANNEL_RECORD_LEN: usize = 40;

const FLAG_MULTICHANNEL: u8 = 0x80;
const FLAG_USE_BASE_COLOUR_SPACE: u8 = 0x40;
const FLAGS_RESERVED: u8 = 0x3F;

/// Numerator types a [`Rational`] can carry.
pub trait Numerator: Copy + sealed::Sealed {
    #[doc(hidden)]
    fn from_be_bytes(bytes: [u8; 4]) -> Self;
    #[doc(hidden)]
    fn to_be_bytes(self) -> [u8; 4];
    #[doc(hidden)]
    fn to_f64(self) -> f64;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
}

impl Numerator for i32 {
    fn from_be_bytes(bytes: [u8; 4]) -> Self {
        i32::from_be_bytes(bytes)
    }
    fn to_be_bytes(self) -> [u8; 4] {
        i32::to_be_bytes(self)
    }
    fn to_f64(self) -> f64 {
        self.into()
    }
}

impl Numerator for u32 {
    fn from_be_bytes(bytes: [u8; 4]) -> Self {
        u32::from_be_bytes(bytes)
    }
    fn to_be_bytes(self) -> [u8; 4] {
        u32::to_be_bytes(self)
    }
    fn to_f64(self) -> f64 {
        self.into()
    }
}

/// A fraction stored as a 32-bit numerator and an unsigned 32-bit denominator.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational<N> {
    pub numerator: N,
    pub denominator: u32,
}

/// Rational with a signed numerator.
pub type SRational = Rational<i32>;
/// Rational with an unsigned numerator.
pub type URational = Rational<u32>;

impl<N: Numerator> Rational<N> {
    #[inline]
    pub fn new(numerator: N, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Evaluates the fraction.
    ///
    /// A zero denominator is not allowed by ISO 21496-1 but is tolerated here: the result is
    /// `+∞`, `-∞` or `0` depending on the sign of the numerator.
    pub fn value(&self) -> f64 {
        let numerator = self.numerator.to_f64();
        if self.denominator == 0 {
            if numerator > 0.0 {
                f64::INFINITY
            } else if numerator < 0.0 {
                f64::NEG_INFINITY
            } else {
                0.0
            }
        } else {
            numerator / f64::from(self.denominator)
        }
    }

    fn from_raw(raw: &RawRational) -> Self {
        Self::new(
            N::from_be_bytes(raw.numerator),
            u32::from_be_bytes(raw.denominator),
        )
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.numerator.to_be_bytes());
        out.extend_from_slice(&self.denominator.to_be_bytes());
    }
}

impl<N: Numerator + fmt::Display> fmt::Debug for Rational<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct RawRational {
    numerator: [u8; 4],
    denominator: [u8; 4],
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct RawHeadroom {
    baseline: RawRational,
    alternate: RawRational,
}

#[derive(Clone, Copy, AnyBitPattern)]
#[repr(C)]
struct RawChannel {
    gain_map_min: RawRational,
    gain_map_max: RawRational,
    gamma: RawRational,
    base_offset: RawRational,
    alternate_offset: RawRational,
}

/// Headroom of the base and alternate renditions, in log2 stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdrHeadroom {
    pub baseline: URational,
    pub alternate: URational,
}

/// Per-channel gain map parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRecord {
    pub gain_map_min: SRational,
    pub gain_map_max: SRational,
    pub gamma: URational,
    pub base_offset: SRational,
    pub alternate_offset: SRational,
}

impl ChannelRecord {
    fn from_raw(raw: &RawChannel) -> Self {
        Self {
            gain_map_min: Rational::from_raw(&raw.gain_map_min),
            gain_map_max: Rational::from_raw(&raw.gain_map_max),
            gamma: Rational::from_raw(&raw.gamma),
            base_offset: Rational::from_raw(&raw.base_offset),
            alternate_offset: Rational::from_raw(&raw.alternate_offset),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        self.gain_map_min.write(out);
        self.gain_map_max.write(out);
        self.gamma.write(out);
        self.base_offset.write(out);
        self.alternate_offset.write(out);
    }
}

/// The colour channel a [`ChannelRecord`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Achromatic,
    Red,
    Green,
    Blue,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Achromatic => "Achromatic",
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
        })
    }
}

/// Decoded ISO 21496-1 gain-map metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainMapMetadata {
    pub minimum_version: u16,
    pub writer_version: u16,
    pub is_multichannel: bool,
    pub use_base_colour_space: bool,
    /// The low 6 bits of the flags byte. Reserved by the standard and kept as-is.
    pub reserved_flags: u8,
    pub hdr_headroom: HdrHeadroom,
    /// One achromatic record, or red, green and blue records when [`Self::is_multichannel`] is set.
    pub channels: Vec<ChannelRecord>,
}

impl GainMapMetadata {
    /// Returns the number of channel records implied by the multichannel flag.
    #[inline]
    pub fn channel_count(&self) -> usize {
        if self.is_multichannel {
            3
        } else {
            1
        }
    }

    /// Returns the size of the complete `APP2` segment holding this metadata, including the
    /// marker and length field.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + CHANNEL_RECORD_LEN * self.channel_count()
    }

    /// Iterates over the channel records along with the channel each one applies to.
    pub fn named_channels(&self) -> impl Iterator<Item = (Channel, &ChannelRecord)> {
        let names: &[Channel] = if self.is_multichannel {
            &[Channel::Red, Channel::Green, Channel::Blue]
        } else {
            &[Channel::Achromatic]
        };
        names.iter().copied().zip(&self.channels)
    }

    fn flags(&self) -> u8 {
        let mut flags = self.reserved_flags & FLAGS_RESERVED;
        if self.is_multichannel {
            flags |= FLAG_MULTICHANNEL;
        }
        if self.use_base_colour_space {
            flags |= FLAG_USE_BASE_COLOUR_SPACE;
        }
        flags
    }

    /// Serializes the metadata into a complete `APP2` segment, starting with the `FF E2` marker.
    ///
    /// Fails if the number of channel records does not match the multichannel flag.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        if self.channels.len() != self.channel_count() {
            return Err(Error::from(format!(
                "gain map has {} channel records, but its flags call for {}",
                self.channels.len(),
                self.channel_count()
            )));
        }

        let len = self.encoded_len();
        let length = u16::try_from(len - 2)
            .map_err(|_| Error::from("gain map metadata does not fit into one segment"))?;

        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&APP2.to_be_bytes());
        out.extend_from_slice(&length.to_be_bytes());

        let mut urn = [0; URN_FIELD_LEN];
        urn[..ISO21496_URN.len()].copy_from_slice(ISO21496_URN.as_bytes());
        out.extend_from_slice(&urn);

        out.extend_from_slice(&self.minimum_version.to_be_bytes());
        out.extend_from_slice(&self.writer_version.to_be_bytes());
        out.push(self.flags());
        self.hdr_headroom.baseline.write(&mut out);
        self.hdr_headroom.alternate.write(&mut out);
        for channel in &self.channels {
            channel.write(&mut out);
        }

        debug_assert_eq!(out.len(), len);
        Ok(out)
    }
}

/// Returns whether an `APP2` payload (without marker and length) identifies itself as ISO 21496-1.
pub(crate) fn is_gainmap_payload(payload: &[u8]) -> bool {
    payload
        .get(..URN_FIELD_LEN)
        .map_or(false, |urn| trim_nulls(urn) == ISO21496_URN.as_bytes())
}

fn trim_nulls(field: &[u8]) -> &[u8] {
    let len = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &field[..len]
}

/// Non-fatal irregularities found while decoding gain-map metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GainMapWarning {
    /// The segment's length field disagrees with the number of bytes actually supplied.
    LengthMismatch { declared: u16, actual: usize },
    /// Bytes follow the last channel record.
    TrailingBytes { count: usize },
}

impl fmt::Display for GainMapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GainMapWarning::LengthMismatch { declared, actual } => write!(
                f,
                "APP2 length field says {declared} bytes, but {actual} bytes follow the marker"
            ),
            GainMapWarning::TrailingBytes { count } => {
                write!(f, "ignoring {count} trailing bytes after gain map channel records")
            }
        }
    }
}

/// The result of [`decode_gainmap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedGainMap {
    /// The value of the segment's length field.
    pub declared_length: u16,
    pub metadata: GainMapMetadata,
    pub warnings: Vec<GainMapWarning>,
}

/// Decodes an ISO 21496-1 `APP2` segment.
///
/// Unlike [`crate::decode_xmp`], `segment` must contain the *complete* segment including the
/// `FF E2` marker and the length field, as returned by [`Segment::bytes`][crate::Segment::bytes].
/// The length field is only checked for consistency; decoding always uses the bounds of
/// `segment` itself.
pub fn decode_gainmap(segment: &[u8]) -> Result<DecodedGainMap> {
    if segment.len() < HEADER_LEN {
        return Err(Error::from(format!(
            "gain map segment of {} bytes is too short for a marker and length",
            segment.len()
        )));
    }

    let mut reader = Reader::new(segment);
    let marker = reader.read_u16()?;
    if marker != APP2 {
        return Err(Error::from(Repr::BadMarker { found: marker }));
    }

    let mut warnings = Vec::new();
    let mut warn = |warning: GainMapWarning| {
        log::warn!("{warning}");
        warnings.push(warning);
    };

    let declared_length = reader.read_u16()?;
    let actual = segment.len() - 2;
    if usize::from(declared_length) != actual {
        warn(GainMapWarning::LengthMismatch {
            declared: declared_length,
            actual,
        });
    }

    let urn = reader
        .read_slice(URN_FIELD_LEN)
        .map_err(|e| Error::from(format!("gain map URN field: {e}")))?;
    let urn = trim_nulls(urn);
    if urn != ISO21496_URN.as_bytes() {
        return Err(Error::from(Repr::InvalidUrn {
            found: String::from_utf8_lossy(urn).into_owned(),
        }));
    }

    let malformed = |field: &str, e: Error| Error::from(format!("gain map {field}: {e}"));

    let minimum_version = reader.read_u16().map_err(|e| malformed("version", e))?;
    let writer_version = reader.read_u16().map_err(|e| malformed("version", e))?;
    let flags = reader.read_u8().map_err(|e| malformed("flags", e))?;
    let headroom: &RawHeadroom = reader
        .read_obj()
        .map_err(|e| malformed("HDR headroom", e))?;

    let mut metadata = GainMapMetadata {
        minimum_version,
        writer_version,
        is_multichannel: flags & FLAG_MULTICHANNEL != 0,
        use_base_colour_space: flags & FLAG_USE_BASE_COLOUR_SPACE != 0,
        reserved_flags: flags & FLAGS_RESERVED,
        hdr_headroom: HdrHeadroom {
            baseline: Rational::from_raw(&headroom.baseline),
            alternate: Rational::from_raw(&headroom.alternate),
        },
        channels: Vec::new(),
    };

    let count = metadata.channel_count();
    for i in 0..count {
        let raw: &RawChannel = reader.read_obj().map_err(|e| {
            malformed(&format!("channel record {} of {}", i + 1, count), e)
        })?;
        metadata.channels.push(ChannelRecord::from_raw(raw));
    }

    debug_assert_eq!(reader.position(), metadata.encoded_len());
    let trailing = reader.remaining().len();
    if trailing != 0 {
        warn(GainMapWarning::TrailingBytes { count: trailing });
    }

    log::trace!("decoded gain map metadata: {:?}", metadata);

    Ok(DecodedGainMap {
        declared_length,
        metadata,
        warnings,
    })
}
