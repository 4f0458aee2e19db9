use core::fmt;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// The reason a decode call gave up.
///
/// Advisory conditions are never reported through this type; they are attached to the successful
/// result as warnings instead.
pub struct Error {
    repr: Repr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The buffer does not start with an `SOI` marker.
    NotAContainer,
    /// A length-bearing marker sits at the very end of the buffer and its length cannot be read.
    TruncatedLength,
    /// The gain-map segment header does not carry the `APP2` marker.
    BadMarker,
    /// The gain-map payload does not identify itself as ISO 21496-1.
    InvalidUrn,
    /// A fixed-layout field could not be read from the payload.
    MalformedRecord,
}

pub(crate) enum Repr {
    NotAContainer,
    TruncatedLength { offset: usize, marker: u8 },
    BadMarker { found: u16 },
    InvalidUrn { found: String },
    MalformedRecord(String),
}

impl From<String> for Repr {
    fn from(value: String) -> Self {
        Self::MalformedRecord(value)
    }
}
impl<'a> From<&'a str> for Repr {
    fn from(value: &'a str) -> Self {
        Self::MalformedRecord(value.into())
    }
}

impl Error {
    pub(crate) fn from(e: impl Into<Repr>) -> Self {
        Self { repr: e.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            Repr::NotAContainer => ErrorKind::NotAContainer,
            Repr::TruncatedLength { .. } => ErrorKind::TruncatedLength,
            Repr::BadMarker { .. } => ErrorKind::BadMarker,
            Repr::InvalidUrn { .. } => ErrorKind::InvalidUrn,
            Repr::MalformedRecord(_) => ErrorKind::MalformedRecord,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind(), self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::NotAContainer => f.write_str("data does not start with SOI marker"),
            Repr::TruncatedLength { offset, marker } => write!(
                f,
                "ff {marker:02x} marker at offset {offset:#x} is cut off before its length field"
            ),
            Repr::BadMarker { found } => {
                write!(f, "expected APP2 marker 0xFFE2, found {found:#06X}")
            }
            Repr::InvalidUrn { found } => write!(
                f,
                "invalid URN: expected '{}', found '{}'",
                crate::metadata::ISO21496_URN,
                found.escape_debug()
            ),
            Repr::MalformedRecord(s) => f.write_str(s),
        }
    }
}

impl std::error::Error for Error {}
