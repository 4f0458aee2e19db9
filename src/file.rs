//! JPEG/JFIF segment walker.
//!
//! The walker steps through the marker segments of a JPEG byte stream without decoding any image
//! data. Entropy-coded scan data following an `SOS` header is skipped by looking at the bytes
//! themselves (byte stuffing and `RST` markers), since its length is not declared anywhere.
//!
//! Walking does not stop at `EOI`: files that concatenate several JPEG streams (multi-picture
//! files, gain maps, appended previews) are reported as one sequence of segments.

#![allow(non_snake_case)]


use std::fmt;

use crate::error::{Error, Repr, Result};
use crate::metadata;
use crate::reader::Reader;

/// Walks all segments of a JPEG byte stream.
///
/// Fails only if `buf` does not start with an `SOI` marker. Everything else (unknown markers,
/// stray bytes, a truncated or oversized final segment) is recorded in [`Walk::warnings`] and the
/// walk returns whatever it found up to that point.
pub fn walk(buf: &[u8]) -> Result<Walk<'_>> {
    let mut walker = SegmentWalker::new(buf)?;
    let mut segments = Vec::new();
    while let Some(segment) = walker.next_segment() {
        segments.push(segment);
    }
    Ok(Walk {
        segments,
        warnings: walker.warnings,
    })
}

/// Incremental segment walker over an in-memory JPEG stream.
pub struct SegmentWalker<'a> {
    buf: &'a [u8],
    position: usize,
    finished: bool,
    warnings: Vec<WalkWarning>,
}

impl<'a> SegmentWalker<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        if !buf.starts_with(&[0xFF, Marker::SOI.byte()]) {
            return Err(Error::from(Repr::NotAContainer));
        }
        Ok(Self {
            buf,
            position: 0,
            finished: false,
            warnings: Vec::new(),
        })
    }

    /// Returns the warnings recorded so far.
    #[inline]
    pub fn warnings(&self) -> &[WalkWarning] {
        &self.warnings
    }

    fn warn(&mut self, warning: WalkWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Reads the next [`Segment`].
    ///
    /// Standalone markers (`SOI`, `EOI`, and `RSTn` outside of scan data) are returned as segments
    /// without a payload. Returns `None` once the end of the data is reached, or after a
    /// [`SegmentStatus::Truncated`] or [`SegmentStatus::Oversized`] segment has been returned.
    pub fn next_segment(&mut self) -> Option<Segment<'a>> {
        if self.finished {
            return None;
        }

        let buf = self.buf;
        loop {
            let offset = self.position;
            if offset + 1 >= buf.len() {
                if offset < buf.len() {
                    self.warn(WalkWarning::StrayBytes { offset, len: 1 });
                }
                self.finished = true;
                return None;
            }

            if buf[offset] != 0xFF {
                // Not a marker. Skip ahead to the next 0xFF and try to resynchronize there.
                let len = buf[offset..]
                    .iter()
                    .position(|&b| b == 0xFF)
                    .unwrap_or(buf.len() - offset);
                self.warn(WalkWarning::StrayBytes { offset, len });
                self.position += len;
                continue;
            }

            let marker = Marker(buf[offset + 1]);
            match marker.0 {
                0x00 => {
                    self.warn(WalkWarning::StuffedByte { offset });
                    self.position += 2;
                    continue;
                }
                0xFF => {
                    // Fill byte preceding a marker.
                    self.position += 1;
                    continue;
                }
                _ if !marker.is_recognized() => {
                    self.warn(WalkWarning::UnknownMarker { offset, marker });
                    self.position += 1;
                    continue;
                }
                _ => {}
            }

            if !marker.has_length() {
                self.position += 2;
                return Some(Segment {
                    offset,
                    marker,
                    declared_length: 0,
                    bytes: &buf[offset..offset + 2],
                    payload: &[],
                    status: SegmentStatus::Ok,
                    kind: None,
                });
            }

            return Some(self.read_segment(offset, marker));
        }
    }

    fn read_segment(&mut self, offset: usize, marker: Marker) -> Segment<'a> {
        let buf = self.buf;

        if buf.len() - offset < 4 {
            self.warn(WalkWarning::Truncated { offset, marker });
            self.finished = true;
            return Segment {
                offset,
                marker,
                declared_length: 0,
                bytes: &buf[offset..],
                payload: &[],
                status: SegmentStatus::Truncated,
                kind: None,
            };
        }

        // The length includes the length field itself, but not the `FF xx` marker.
        let declared_length = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]);
        let end = offset + 2 + usize::from(declared_length);
        if end > buf.len() {
            self.warn(WalkWarning::Oversized {
                offset,
                marker,
                declared: declared_length,
                available: buf.len() - offset - 2,
            });
            self.finished = true;
            return Segment {
                offset,
                marker,
                declared_length,
                bytes: &buf[offset..],
                payload: &buf[offset + 4..],
                status: SegmentStatus::Oversized,
                kind: None,
            };
        }

        let (end, payload) = if declared_length < 2 {
            self.warn(WalkWarning::InvalidLength {
                offset,
                marker,
                declared: declared_length,
            });
            (offset + 4, &buf[offset + 4..offset + 4])
        } else {
            (end, &buf[offset + 4..end])
        };

        let kind = match interpret(marker, payload) {
            Ok(kind) => kind,
            Err(e) => {
                log::debug!("{marker} segment at {offset:#x}: {e}");
                self.warn(WalkWarning::Incomplete { offset, marker });
                Some(SegmentKind::Incomplete)
            }
        };
        log::trace!("{marker} at {offset:#x}, length {declared_length}: {kind:?}");

        self.position = end;
        if marker == Marker::SOS {
            self.skip_scan_data();
        }

        Segment {
            offset,
            marker,
            declared_length,
            bytes: &buf[offset..end],
            payload,
            status: SegmentStatus::Ok,
            kind,
        }
    }

    /// Advances past the entropy-coded data following an `SOS` header.
    ///
    /// Stops at the first `FF xx` pair that is neither byte stuffing (`FF 00`) nor a restart
    /// marker (`FF D0`-`FF D7`), leaving the position on that marker. `FF` fill bytes before the
    /// `xx` byte are skipped.
    fn skip_scan_data(&mut self) {
        let buf = self.buf;
        let start = self.position;
        let mut i = start;

        while i + 1 < buf.len() {
            if buf[i] != 0xFF {
                i += 1;
                continue;
            }

            // Any number of fill bytes may precede the marker byte.
            let Some(j) = buf[i + 1..].iter().position(|&b| b != 0xFF) else {
                break;
            };
            let j = i + 1 + j;
            match buf[j] {
                0x00 | 0xD0..=0xD7 => i = j + 1,
                _ => {
                    log::trace!("{} bytes of scan data at {start:#x}", j - 1 - start);
                    self.position = j - 1;
                    return;
                }
            }
        }

        self.warn(WalkWarning::UnterminatedScan { offset: start });
        self.position = buf.len();
    }
}

fn interpret<'a>(marker: Marker, payload: &'a [u8]) -> Result<Option<SegmentKind<'a>>> {
    let mut reader = Reader::new(payload);
    let kind = match marker {
        _ if marker.is_sof() => Some(SegmentKind::Sof(read_sof(marker, &mut reader)?)),
        Marker::DRI => Some(SegmentKind::Dri(Dri {
            Ri: reader.read_u16()?,
        })),
        _ if marker.is_app() => read_app(marker, &mut reader)?.map(SegmentKind::App),
        _ => None,
    };
    Ok(kind)
}

fn read_sof(marker: Marker, reader: &mut Reader<'_>) -> Result<Sof> {
    let P = reader.read_u8()?;
    let Y = reader.read_u16()?;
    let X = reader.read_u16()?;
    // The component count is not needed to locate the frame; tolerate headers that end early.
    let Nf = reader.read_u8().ok();
    Ok(Sof {
        marker,
        P,
        Y,
        X,
        Nf,
    })
}

fn read_app<'a>(marker: Marker, reader: &mut Reader<'a>) -> Result<Option<AppKind<'a>>> {
    const JFIF: &[u8] = b"JFIF\0";
    const EXIF: &[u8] = b"Exif\0\0";
    const ICC_PROFILE: &[u8] = b"ICC_PROFILE\0";
    const MPF: &[u8] = b"MPF\0";

    let payload = reader.remaining();
    let kind = match marker {
        Marker::APP0 if payload.starts_with(JFIF) => {
            reader.read_slice(JFIF.len())?;
            Some(AppKind::Jfif(read_jfif(reader)?))
        }
        Marker::APP1 => match metadata::decode_xmp(payload) {
            Some(packet) => Some(AppKind::Xmp(packet)),
            None => payload.strip_prefix(EXIF).map(AppKind::Exif),
        },
        Marker::APP2 if payload.starts_with(ICC_PROFILE) => {
            reader.read_slice(ICC_PROFILE.len())?;
            let [sequence, count] = reader.read_array()?;
            Some(AppKind::IccProfile { sequence, count })
        }
        Marker::APP2 if payload.starts_with(MPF) => Some(AppKind::Mpf(&payload[MPF.len()..])),
        Marker::APP2 if metadata::is_gainmap_payload(payload) => Some(AppKind::GainMap),
        _ => None,
    };
    Ok(kind)
}

fn read_jfif(reader: &mut Reader<'_>) -> Result<Jfif> {
    let [major_version, minor_version, unit] = reader.read_array()?;
    let xdensity = reader.read_u16()?;
    let ydensity = reader.read_u16()?;
    let [xthumbnail, ythumbnail] = reader.read_array()?;
    Ok(Jfif {
        major_version,
        minor_version,
        unit,
        xdensity,
        ydensity,
        xthumbnail,
        ythumbnail,
    })
}

/// The result of [`walk`]: all segments found, in file order, plus advisory warnings.
#[derive(Debug)]
pub struct Walk<'a> {
    segments: Vec<Segment<'a>>,
    warnings: Vec<WalkWarning>,
}

impl<'a> Walk<'a> {
    /// Returns the segments, ordered by strictly increasing offset. The first one is always `SOI`.
    #[inline]
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    #[inline]
    pub fn warnings(&self) -> &[WalkWarning] {
        &self.warnings
    }

    /// Returns the segment that ended the walk early, if any.
    ///
    /// This is the last segment, if its status is [`SegmentStatus::Truncated`] or
    /// [`SegmentStatus::Oversized`].
    pub fn terminal(&self) -> Option<&Segment<'a>> {
        self.segments
            .last()
            .filter(|segment| segment.status != SegmentStatus::Ok)
    }

    /// Turns a walk that ended on an unreadable length field into an error.
    ///
    /// An oversized final segment is still considered a successful walk.
    pub fn into_strict(self) -> Result<Self> {
        let truncated = self
            .terminal()
            .filter(|segment| segment.status == SegmentStatus::Truncated)
            .map(|segment| (segment.offset, segment.marker.byte()));
        match truncated {
            Some((offset, marker)) => Err(Error::from(Repr::TruncatedLength { offset, marker })),
            None => Ok(self),
        }
    }

    /// Returns the first frame header.
    pub fn frame(&self) -> Option<&Sof> {
        self.segments.iter().find_map(|s| match s.kind {
            Some(SegmentKind::Sof(ref sof)) => Some(sof),
            _ => None,
        })
    }

    /// Returns the restart interval set by the first `DRI` segment.
    pub fn restart_interval(&self) -> Option<u16> {
        self.segments.iter().find_map(|s| match s.kind {
            Some(SegmentKind::Dri(dri)) => Some(dri.Ri()),
            _ => None,
        })
    }

    /// Iterates over all XMP packets, paired with the offset of the `APP1` segment holding them.
    pub fn xmp_packets(&self) -> impl Iterator<Item = (usize, &'a [u8])> + '_ {
        self.segments.iter().filter_map(|s| match s.kind {
            Some(SegmentKind::App(AppKind::Xmp(packet))) => Some((s.offset, packet)),
            _ => None,
        })
    }

    /// Iterates over the `APP2` segments carrying ISO 21496-1 gain-map metadata.
    ///
    /// Pass [`Segment::bytes`] to [`crate::decode_gainmap`] to decode them.
    pub fn gain_map_segments(&self) -> impl Iterator<Item = &Segment<'a>> {
        self.segments
            .iter()
            .filter(|s| matches!(s.kind, Some(SegmentKind::App(AppKind::GainMap))))
    }
}

/// Whether a segment could be read in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    Ok,
    /// The data ends before the segment's length field.
    Truncated,
    /// The segment's length field points past the end of the data.
    Oversized,
}

/// A segment of a JPEG file, introduced by a `0xFF 0xXX` marker.
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    offset: usize,
    marker: Marker,
    declared_length: u16,
    bytes: &'a [u8],
    payload: &'a [u8],
    status: SegmentStatus,
    kind: Option<SegmentKind<'a>>,
}

impl<'a> Segment<'a> {
    /// Returns the offset of the segment's `0xFF 0xXX` marker in the input buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Returns the value of the length field, or 0 for standalone markers and truncated segments.
    #[inline]
    pub fn declared_length(&self) -> u16 {
        self.declared_length
    }

    /// The segment parameters, excluding the `0xFF 0xXX` marker and the length field.
    ///
    /// For an `SOS` segment this does not include any of the entropy-coded data following it. For
    /// an oversized segment, this holds the bytes up to the end of the data.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// The segment as it appears in the input, starting with the `0xFF 0xXX` marker.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn status(&self) -> SegmentStatus {
        self.status
    }

    #[inline]
    pub fn as_segment_kind(&self) -> Option<&SegmentKind<'a>> {
        self.kind.as_ref()
    }
}

/// A 1-byte marker code, the `xx` in `0xFF 0xXX`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(u8);

impl Marker {
    pub const SOI: Self = Self(0xD8);
    pub const EOI: Self = Self(0xD9);
    pub const SOS: Self = Self(0xDA);
    pub const DQT: Self = Self(0xDB);
    pub const DRI: Self = Self(0xDD);
    pub const DHT: Self = Self(0xC4);
    pub const COM: Self = Self(0xFE);
    /// Baseline DCT.
    pub const SOF0: Self = Self(0xC0);
    /// Progressive DCT.
    pub const SOF2: Self = Self(0xC2);
    pub const APP0: Self = Self(0xE0);
    pub const APP1: Self = Self(0xE1);
    pub const APP2: Self = Self(0xE2);

    /// Returns the second byte of the marker.
    #[inline]
    pub fn byte(self) -> u8 {
        self.0
    }

    /// Returns the full 16-bit marker code, `0xFFxx`.
    #[inline]
    pub fn code(self) -> u16 {
        0xFF00 | u16::from(self.0)
    }

    #[inline]
    pub fn is_rst(self) -> bool {
        matches!(self.0, 0xD0..=0xD7)
    }

    #[inline]
    pub fn is_app(self) -> bool {
        matches!(self.0, 0xE0..=0xEF)
    }

    /// `SOF0` through `SOF15`. `C4`, `C8` and `CC` share the range but are not frame headers.
    #[inline]
    pub fn is_sof(self) -> bool {
        matches!(self.0, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF)
    }

    /// Returns whether a length field follows the marker.
    ///
    /// `SOI`, `EOI`, `TEM` and `RSTn` stand alone.
    #[inline]
    pub fn has_length(self) -> bool {
        !matches!(self.0, 0xD8 | 0xD9 | 0x01 | 0xD0..=0xD7)
    }

    fn is_recognized(self) -> bool {
        self.is_sof()
            || self.is_rst()
            || self.is_app()
            || matches!(self.0, 0xC4 | 0xD8..=0xDB | 0xDD | 0xFE)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Marker::SOI => f.write_str("SOI"),
            Marker::EOI => f.write_str("EOI"),
            Marker::SOS => f.write_str("SOS"),
            Marker::DQT => f.write_str("DQT"),
            Marker::DRI => f.write_str("DRI"),
            Marker::DHT => f.write_str("DHT"),
            Marker::COM => f.write_str("COM"),
            Marker(n @ 0xD0..=0xD7) => write!(f, "RST{}", n - 0xD0),
            Marker(n @ 0xE0..=0xEF) => write!(f, "APP{}", n - 0xE0),
            Marker(n) if self.is_sof() => write!(f, "SOF{}", n - 0xC0),
            Marker(n) => write!(f, "FF{n:02X}"),
        }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Enumeration of segment kinds understood by this parser.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SegmentKind<'a> {
    Sof(Sof),
    Dri(Dri),
    App(AppKind<'a>),
    /// The payload is too short for the fixed fields of this segment type.
    Incomplete,
}

impl fmt::Display for SegmentKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Sof(sof) => {
                write!(f, "{}x{}, {}-bit", sof.X, sof.Y, sof.P)?;
                if let Some(n) = sof.Nf {
                    write!(f, ", {n} components")?;
                }
                Ok(())
            }
            SegmentKind::Dri(dri) => write!(f, "restart interval {} MCUs", dri.Ri),
            SegmentKind::App(app) => fmt::Display::fmt(app, f),
            SegmentKind::Incomplete => f.write_str("incomplete"),
        }
    }
}

/// Enumeration of the known `APPn` payloads, identified by their signature.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AppKind<'a> {
    Jfif(Jfif),
    /// Exif data; holds the TIFF structure following the `Exif\0\0` signature.
    Exif(&'a [u8]),
    /// An XMP packet, without the namespace prefix.
    Xmp(&'a [u8]),
    /// One chunk of an ICC profile split over several `APP2` segments.
    IccProfile { sequence: u8, count: u8 },
    /// A multi-picture format index; holds the data following the `MPF\0` signature.
    Mpf(&'a [u8]),
    /// ISO 21496-1 gain-map metadata, see [`crate::decode_gainmap`].
    GainMap,
}

impl fmt::Display for AppKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppKind::Jfif(jfif) => write!(
                f,
                "JFIF {}.{:02}",
                jfif.major_version, jfif.minor_version
            ),
            AppKind::Exif(data) => write!(f, "Exif ({} bytes)", data.len()),
            AppKind::Xmp(packet) => write!(f, "XMP ({} bytes)", packet.len()),
            AppKind::IccProfile { sequence, count } => {
                write!(f, "ICC profile chunk {sequence}/{count}")
            }
            AppKind::Mpf(data) => write!(f, "MPF ({} bytes)", data.len()),
            AppKind::GainMap => f.write_str("ISO 21496-1 gain map"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Jfif {
    major_version: u8,
    minor_version: u8,
    unit: u8,
    xdensity: u16,
    ydensity: u16,
    xthumbnail: u8,
    ythumbnail: u8,
}

impl Jfif {
    #[inline]
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    #[inline]
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    /// Returns the density unit, or `None` if the header uses an undefined value.
    #[inline]
    pub fn unit(&self) -> Option<DensityUnit> {
        match self.unit {
            0 => Some(DensityUnit::None),
            1 => Some(DensityUnit::DotsPerInch),
            2 => Some(DensityUnit::DotsPerCm),
            _ => None,
        }
    }

    #[inline]
    pub fn density_x(&self) -> u16 {
        self.xdensity
    }

    #[inline]
    pub fn density_y(&self) -> u16 {
        self.ydensity
    }

    #[inline]
    pub fn thumbnail_width(&self) -> u8 {
        self.xthumbnail
    }

    #[inline]
    pub fn thumbnail_height(&self) -> u8 {
        self.ythumbnail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DensityUnit {
    None,
    DotsPerInch,
    DotsPerCm,
}

/// **D**efine **R**estart **I**nterval.
///
/// Sets the number of MCUs between two `RSTn` markers in the scan data.
#[derive(Debug, Clone, Copy)]
pub struct Dri {
    Ri: u16,
}

impl Dri {
    /// Returns the number of MCUs contained in each restart interval.
    #[inline]
    pub fn Ri(&self) -> u16 {
        self.Ri
    }
}

/// **SOF** Start Of Frame
#[derive(Debug, Clone, Copy)]
pub struct Sof {
    marker: Marker,
    /// Sample precision in bits.
    P: u8,
    Y: u16,
    X: u16,
    Nf: Option<u8>,
}

impl Sof {
    #[inline]
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Returns the sample precision in bits.
    #[inline]
    pub fn precision(&self) -> u8 {
        self.P
    }

    /// Returns the number of lines in the image (the height of the frame).
    #[inline]
    pub fn height(&self) -> u16 {
        self.Y
    }

    /// Returns the number of samples per line (the width of the frame).
    #[inline]
    pub fn width(&self) -> u16 {
        self.X
    }

    /// Returns the number of image components, if the header is long enough to hold it.
    #[inline]
    pub fn num_components(&self) -> Option<u8> {
        self.Nf
    }
}

/// Advisory conditions found while walking.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WalkWarning {
    /// Bytes between segments that do not start a marker.
    StrayBytes { offset: usize, len: usize },
    /// A stuffed `FF 00` pair outside of scan data.
    StuffedByte { offset: usize },
    /// An unrecognized marker; the walker skipped one byte and resynchronized.
    UnknownMarker { offset: usize, marker: Marker },
    /// A length field smaller than 2.
    InvalidLength {
        offset: usize,
        marker: Marker,
        declared: u16,
    },
    /// The payload is too short for the segment's fixed fields.
    Incomplete { offset: usize, marker: Marker },
    /// Scan data starting at `offset` runs until the end of the data.
    UnterminatedScan { offset: usize },
    /// The data ends inside the segment header; the walk stopped here.
    Truncated { offset: usize, marker: Marker },
    /// The length field points past the end of the data; the walk stopped here.
    Oversized {
        offset: usize,
        marker: Marker,
        declared: u16,
        available: usize,
    },
}

impl fmt::Display for WalkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            WalkWarning::StrayBytes { offset, len } => {
                write!(f, "skipped {len} stray byte(s) at {offset:#x}")
            }
            WalkWarning::StuffedByte { offset } => {
                write!(f, "skipped stuffed ff 00 outside of scan data at {offset:#x}")
            }
            WalkWarning::UnknownMarker { offset, marker } => {
                write!(f, "skipped unknown marker {marker} at {offset:#x}")
            }
            WalkWarning::InvalidLength {
                offset,
                marker,
                declared,
            } => write!(f, "{marker} at {offset:#x} has invalid length {declared}"),
            WalkWarning::Incomplete { offset, marker } => {
                write!(f, "{marker} at {offset:#x} is too short for its fields")
            }
            WalkWarning::UnterminatedScan { offset } => {
                write!(f, "scan data at {offset:#x} runs to the end of the data")
            }
            WalkWarning::Truncated { offset, marker } => {
                write!(f, "{marker} at {offset:#x}: data ends before the length field")
            }
            WalkWarning::Oversized {
                offset,
                marker,
                declared,
                available,
            } => write!(
                f,
                "{marker} at {offset:#x} declares length {declared}, but only {available} bytes remain"
            ),
        }
    }
}
