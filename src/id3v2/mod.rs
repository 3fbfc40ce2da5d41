//! ID3v2 tag reading and writing.
//!
//! An ID3v2 tag is a self-describing metadata container prepended to an audio
//! file: a 10-byte header announcing the version and the size of the frame
//! area, followed by the frames themselves. [`Tag`] models the whole
//! container; [`frames`] contains the individual frame implementations.

pub mod frames;
pub mod lrc;

mod collections;
mod ids;
mod syncdata;
mod tag;

pub use tag::{Options, Tag};

use crate::string::Encoding;
use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::result;

/// A specialized result for tag operations.
pub type Result<T> = result::Result<T, Error>;

/// The ways reading or writing a tag can fail.
///
/// Two conditions are deliberately *not* errors: a stream without a tag
/// parses into an empty [`Tag`], and text that does not decode under its
/// declared encoding is recovered locally.
#[derive(Debug)]
pub enum Error {
    /// The tag declares an ID3v2 version below 3 or above 4.
    UnsupportedVersion(u8),
    /// A synch-safe size field had the top bit of one of its bytes set.
    InvalidSizeFormat,
    /// A size does not fit the 28 bits of a synch-safe field, or the 32 bits
    /// of a raw one.
    SizeOverflow,
    /// A frame body extended past the frame area the tag header declared.
    BodyOverflow,
    /// A language code was not exactly three bytes, as ISO-639-2 requires.
    InvalidLanguageLength,
    /// The tag has no backing file to save to or close.
    NoFile,
    /// An I/O error from the underlying source or sink.
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Error::UnsupportedVersion(version) => {
                write![f, "unsupported ID3v2 version {}", version]
            }
            Error::InvalidSizeFormat => write![f, "invalid format of tag/frame size"],
            Error::SizeOverflow => write![f, "size is greater than the field allows"],
            Error::BodyOverflow => write![f, "frame went over the tag area"],
            Error::InvalidLanguageLength => {
                write![f, "language code must consist of three letters according to ISO 639-2"]
            }
            Error::NoFile => write![f, "tag was not initialized with a file"],
            Error::Io(err) => write![f, "{}", err],
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// A supported ID3v2 tag version.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Version {
    /// ID3v2.3. Frame sizes are raw 32-bit integers and the default text
    /// encoding is Latin1.
    V3,
    /// ID3v2.4. Frame sizes are synch-safe and the default text encoding is
    /// UTF-8.
    V4,
}

impl Version {
    /// Whether frame sizes under this version are synch-safe.
    pub(crate) fn synch_safe(self) -> bool {
        self == Version::V4
    }

    /// The version byte written to the tag header.
    pub(crate) fn byte(self) -> u8 {
        match self {
            Version::V3 => 3,
            Version::V4 => 4,
        }
    }

    /// The text encoding a tag of this version uses unless told otherwise.
    pub(crate) fn default_encoding(self) -> Encoding {
        match self {
            Version::V3 => Encoding::Latin1,
            Version::V4 => Encoding::Utf8,
        }
    }
}
