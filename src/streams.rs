//! Recovery of complete JPEG streams embedded in a buffer.
//!
//! Multi-picture files, Exif thumbnails and gain-map containers store several JPEG streams in one
//! file, sometimes nested inside each other (an Exif thumbnail lives inside the main image's
//! `APP1` segment). The extractor finds every `SOI` and `EOI` byte pair and matches them like
//! brackets to recover the streams.
//!
//! The search is a plain byte-pattern search. It does not know about byte stuffing or scan data,
//! so an `FF D8` or `FF D9` pair occurring in entropy-coded data is taken as a stream boundary.


use std::{fmt, ops::Range};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Classification of a recovered stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    /// The first top-level stream in the buffer.
    MainImage,
    /// A stream nested inside another one.
    Thumbnail,
    /// Any other top-level stream, for example a gain map appended after the main image.
    AuxiliaryImage,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamRole::MainImage => "Main Image",
            StreamRole::Thumbnail => "Thumbnail",
            StreamRole::AuxiliaryImage => "Auxiliary Image",
        })
    }
}

/// A JPEG stream found in the buffer, spanning `start..end` (from `SOI` through `EOI`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegStream {
    start: usize,
    end: usize,
    role: StreamRole,
    nested: bool,
}

impl JpegStream {
    /// Returns the offset of the stream's `SOI` marker.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the offset just past the stream's `EOI` marker.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn role(&self) -> StreamRole {
        self.role
    }

    /// Returns whether the stream lies strictly inside another stream.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// Returns the bytes of this stream.
    ///
    /// Returns `None` if `buf` is shorter than the buffer the stream was found in.
    #[inline]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.range())
    }

    /// Copies the bytes of this stream out of `buf`.
    pub fn to_vec(&self, buf: &[u8]) -> Option<Vec<u8>> {
        self.slice(buf).map(<[u8]>::to_vec)
    }

    fn contains(&self, other: &JpegStream) -> bool {
        other.start > self.start && other.end < self.end
    }
}

/// Advisory conditions found during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtractWarning {
    /// The number of `SOI` and `EOI` patterns differ.
    CountMismatch { soi: usize, eoi: usize },
    /// An `EOI` pattern with no open `SOI` before it.
    UnmatchedEoi { offset: usize },
    /// An `SOI` pattern that was never closed.
    UnmatchedSoi { offset: usize },
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ExtractWarning::CountMismatch { soi, eoi } => write!(
                f,
                "found {soi} SOI markers but {eoi} EOI markers, streams may be misidentified"
            ),
            ExtractWarning::UnmatchedEoi { offset } => {
                write!(f, "EOI at {offset:#x} has no matching SOI")
            }
            ExtractWarning::UnmatchedSoi { offset } => {
                write!(f, "SOI at {offset:#x} has no matching EOI")
            }
        }
    }
}

/// The result of [`extract`].
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    streams: Vec<JpegStream>,
    warnings: Vec<ExtractWarning>,
}

impl Extraction {
    /// Returns all streams ordered by start offset.
    #[inline]
    pub fn streams(&self) -> &[JpegStream] {
        &self.streams
    }

    #[inline]
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn main_image(&self) -> Option<&JpegStream> {
        self.streams
            .iter()
            .find(|s| s.role == StreamRole::MainImage)
    }

    pub fn thumbnails(&self) -> impl Iterator<Item = &JpegStream> {
        self.with_role(StreamRole::Thumbnail)
    }

    pub fn auxiliary_images(&self) -> impl Iterator<Item = &JpegStream> {
        self.with_role(StreamRole::AuxiliaryImage)
    }

    fn with_role(&self, role: StreamRole) -> impl Iterator<Item = &JpegStream> {
        self.streams.iter().filter(move |s| s.role == role)
    }
}

fn find_all(buf: &[u8], pattern: [u8; 2]) -> Vec<usize> {
    buf.windows(2)
        .enumerate()
        .filter(|(_, window)| **window == pattern)
        .map(|(i, _)| i)
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Event {
    Soi,
    Eoi,
}

/// Finds and classifies all JPEG streams in `buf`.
///
/// Returns an empty [`Extraction`] if no `SOI`/`EOI` pair could be matched.
pub fn extract(buf: &[u8]) -> Extraction {
    let soi = find_all(buf, SOI);
    let eoi = find_all(buf, EOI);

    let mut out = Extraction::default();
    let mut warn = |warning: ExtractWarning| {
        log::warn!("{warning}");
        out.warnings.push(warning);
    };

    if soi.len() != eoi.len() {
        warn(ExtractWarning::CountMismatch {
            soi: soi.len(),
            eoi: eoi.len(),
        });
    }

    // The two patterns can never start at the same offset.
    let mut events = soi
        .iter()
        .map(|&pos| (pos, Event::Soi))
        .chain(eoi.iter().map(|&pos| (pos, Event::Eoi)))
        .collect::<Vec<_>>();
    events.sort_unstable();

    let mut open = Vec::new();
    let mut ranges = Vec::new();
    for (pos, event) in events {
        match event {
            Event::Soi => open.push(pos),
            Event::Eoi => match open.pop() {
                Some(start) => ranges.push((start, pos + EOI.len())),
                None => warn(ExtractWarning::UnmatchedEoi { offset: pos }),
            },
        }
    }
    for offset in open {
        warn(ExtractWarning::UnmatchedSoi { offset });
    }

    let mut streams = ranges
        .into_iter()
        .map(|(start, end)| JpegStream {
            start,
            end,
            role: StreamRole::AuxiliaryImage,
            nested: false,
        })
        .collect::<Vec<_>>();
    streams.sort_unstable_by_key(|s| s.start);
    classify(&mut streams);

    log::debug!("extracted {} JPEG streams", streams.len());
    out.streams = streams;
    out
}

/// Marks nested streams as thumbnails and picks the main image.
///
/// `streams` must be sorted by start offset.
fn classify(streams: &mut [JpegStream]) {
    for i in 0..streams.len() {
        let inner = streams[i];
        streams[i].nested = streams.iter().any(|outer| outer.contains(&inner));
    }

    let mut main_found = false;
    for stream in streams.iter_mut() {
        stream.role = if stream.nested {
            StreamRole::Thumbnail
        } else if !main_found {
            main_found = true;
            StreamRole::MainImage
        } else {
            StreamRole::AuxiliaryImage
        };
    }
}
