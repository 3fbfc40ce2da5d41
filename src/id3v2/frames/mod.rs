//! Frame parsing and implementations.
//!
//! An ID3v2 tag is primarily made up of chunks of data, called "Frames" by
//! the spec. Frames are highly structured and heterogenous, ranging from
//! plain text through attached pictures to nested chapter markers.
//!
//! Frames are represented as a closed enum with one case per recognized
//! kind. Every kind knows three things about itself: the exact size of its
//! encoded body, how to write that body to a sink, and the identity key that
//! deduplicates it among frames sharing the same id. Anything the dispatch
//! table does not recognize becomes an [`UnknownFrame`], which carries its
//! body verbatim so that nothing is lost on a rewrite.

pub mod bin;
pub mod chapters;
pub mod comments;
pub mod file;
pub mod lyrics;
pub mod owner;
pub mod stats;
pub mod text;
pub mod url;

pub use bin::UnknownFrame;
pub use chapters::ChapterFrame;
pub use comments::CommentsFrame;
pub use file::{AttachedPictureFrame, PictureType};
pub use lyrics::{
    SyncedContentType, SyncedLyricsFrame, SyncedText, TimestampFormat, UnsyncLyricsFrame,
};
pub use owner::FileIdFrame;
pub use stats::PopularimeterFrame;
pub use text::{TextFrame, UserTextFrame};
pub use url::LinkFrame;

use crate::core::io::BufStream;
use crate::id3v2::{syncdata, Error, Result, Version};
use log::info;
use std::io::Write;

/// The id of the user-defined text frame, which escapes the text-frame
/// prefix rule in both parser dispatch and sequence routing.
pub(crate) const USER_TEXT_ID: &str = "TXXX";

/// The identity key shared by frame kinds that have no distinguishing
/// fields of their own.
pub(crate) const SHARED_KEY: &str = "ID";

/// The size of an encoded frame header.
pub(crate) const FRAME_HEADER_LEN: usize = 10;

/// One metadata record inside a tag.
#[derive(Clone, Debug)]
pub enum Frame {
    Text(TextFrame),
    UserText(UserTextFrame),
    Comments(CommentsFrame),
    Picture(AttachedPictureFrame),
    Popularimeter(PopularimeterFrame),
    FileId(FileIdFrame),
    Link(LinkFrame),
    SyncedLyrics(SyncedLyricsFrame),
    UnsyncLyrics(UnsyncLyricsFrame),
    Chapter(ChapterFrame),
    Unknown(UnknownFrame),
}

impl Frame {
    /// The encoded size of this frame's body in bytes. This is always exactly
    /// the amount of bytes [`write_to`](Frame::write_to) will produce, which
    /// is what lets a frame header be written before its body.
    pub fn size(&self) -> usize {
        match self {
            Frame::Text(frame) => frame.size(),
            Frame::UserText(frame) => frame.size(),
            Frame::Comments(frame) => frame.size(),
            Frame::Picture(frame) => frame.size(),
            Frame::Popularimeter(frame) => frame.size(),
            Frame::FileId(frame) => frame.size(),
            Frame::Link(frame) => frame.size(),
            Frame::SyncedLyrics(frame) => frame.size(),
            Frame::UnsyncLyrics(frame) => frame.size(),
            Frame::Chapter(frame) => frame.size(),
            Frame::Unknown(frame) => frame.size(),
        }
    }

    /// Writes this frame's body to `w`, returning the amount of bytes
    /// written.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        match self {
            Frame::Text(frame) => frame.write_to(w),
            Frame::UserText(frame) => frame.write_to(w),
            Frame::Comments(frame) => frame.write_to(w),
            Frame::Picture(frame) => frame.write_to(w),
            Frame::Popularimeter(frame) => frame.write_to(w),
            Frame::FileId(frame) => frame.write_to(w),
            Frame::Link(frame) => frame.write_to(w),
            Frame::SyncedLyrics(frame) => frame.write_to(w),
            Frame::UnsyncLyrics(frame) => frame.write_to(w),
            Frame::Chapter(frame) => frame.write_to(w),
            Frame::Unknown(frame) => frame.write_to(w),
        }
    }

    /// The identity key of this frame. Two frames under the same id with
    /// equal keys represent the same logical record, and adding the second
    /// to a tag replaces the first.
    pub fn key(&self) -> String {
        match self {
            Frame::Text(frame) => frame.key(),
            Frame::UserText(frame) => frame.key(),
            Frame::Comments(frame) => frame.key(),
            Frame::Picture(frame) => frame.key(),
            Frame::Popularimeter(frame) => frame.key(),
            Frame::FileId(frame) => frame.key(),
            Frame::Link(frame) => frame.key(),
            Frame::SyncedLyrics(frame) => frame.key(),
            Frame::UnsyncLyrics(frame) => frame.key(),
            Frame::Chapter(frame) => frame.key(),
            Frame::Unknown(frame) => frame.key(),
        }
    }
}

macro_rules! frame_from {
    ($($variant:ident => $from:ty,)+) => {
        $(impl From<$from> for Frame {
            fn from(frame: $from) -> Self {
                Frame::$variant(frame)
            }
        })+
    }
}

frame_from! {
    Text => TextFrame,
    UserText => UserTextFrame,
    Comments => CommentsFrame,
    Picture => AttachedPictureFrame,
    Popularimeter => PopularimeterFrame,
    FileId => FileIdFrame,
    Link => LinkFrame,
    SyncedLyrics => SyncedLyricsFrame,
    UnsyncLyrics => UnsyncLyricsFrame,
    Chapter => ChapterFrame,
    Unknown => UnknownFrame,
}

/// A parsed frame header.
#[derive(Debug)]
pub(crate) struct FrameHeader {
    pub id: String,
    pub body_size: usize,
}

impl FrameHeader {
    /// Parses a 10-byte frame header: 4 id bytes, a 4-byte body size, and
    /// two flag bytes nothing here ever looks at.
    ///
    /// Returns `None` whenever the frame scan should stop: too few bytes
    /// left for a header, a blank (all-zero) id, a zero body size, or a size
    /// field that fails to decode.
    pub(crate) fn parse(stream: &mut BufStream, synch_safe: bool) -> Option<Self> {
        if stream.remaining() < FRAME_HEADER_LEN {
            return None;
        }

        let id: [u8; 4] = stream.read_array().ok()?;
        let size: [u8; 4] = stream.read_array().ok()?;
        stream.skip(2).ok()?;

        let body_size = match syncdata::to_size(size, synch_safe) {
            Ok(size) => size as usize,
            Err(_) => {
                info!("stopping frame scan on a malformed size field");
                return None;
            }
        };

        if id == [0; 4] || body_size == 0 {
            return None;
        }

        Some(FrameHeader {
            id: String::from_utf8_lossy(&id).into_owned(),
            body_size,
        })
    }
}

/// Parses a frame body according to its id. Unmatched ids produce an
/// [`UnknownFrame`] holding the raw body.
pub(crate) fn parse_body(id: &str, stream: &mut BufStream, version: Version) -> Result<Frame> {
    // Text frames share one parser, keyed off the id prefix rather than the
    // dispatch table, since there are several dozen of them.
    if id.starts_with('T') && id != USER_TEXT_ID {
        return Ok(Frame::Text(TextFrame::parse(stream)?));
    }

    let frame = match id {
        "APIC" => Frame::Picture(AttachedPictureFrame::parse(stream)?),
        "CHAP" => Frame::Chapter(ChapterFrame::parse(stream, version)?),
        "COMM" => Frame::Comments(CommentsFrame::parse(stream)?),
        "POPM" => Frame::Popularimeter(PopularimeterFrame::parse(stream)?),
        "SYLT" => Frame::SyncedLyrics(SyncedLyricsFrame::parse(stream)?),
        "TXXX" => Frame::UserText(UserTextFrame::parse(stream)?),
        "UFID" => Frame::FileId(FileIdFrame::parse(stream)?),
        "USLT" => Frame::UnsyncLyrics(UnsyncLyricsFrame::parse(stream)?),
        "WXXX" => Frame::Link(LinkFrame::parse(stream)?),
        _ => Frame::Unknown(UnknownFrame::parse(stream)),
    };

    Ok(frame)
}

/// Writes a frame header for `id` with the given body size.
pub(crate) fn write_frame_header<W: Write>(
    w: &mut W,
    id: &str,
    body_size: usize,
    synch_safe: bool,
) -> Result<u64> {
    let mut n = write_all(w, id.as_bytes())?;
    n += write_all(w, &syncdata::from_size(body_size as u64, synch_safe)?)?;
    n += write_all(w, &[0, 0])?;

    Ok(n)
}

/// Writes `frame` preceded by its header.
pub(crate) fn write_frame<W: Write>(
    w: &mut W,
    id: &str,
    frame: &Frame,
    synch_safe: bool,
) -> Result<u64> {
    let mut n = write_frame_header(w, id, frame.size(), synch_safe)?;
    n += frame.write_to(w)?;

    Ok(n)
}

/// Writes `bytes` to `w` whole, returning how many bytes that was.
pub(crate) fn write_all<W: Write>(w: &mut W, bytes: &[u8]) -> Result<u64> {
    w.write_all(bytes)?;

    Ok(bytes.len() as u64)
}

/// Reads the 3-byte ISO-639-2 language code used by comments and lyrics.
/// A field shorter than 3 bytes is a [`Error::InvalidLanguageLength`].
pub(crate) fn parse_lang(stream: &mut BufStream) -> Result<String> {
    let code: [u8; 3] = stream
        .read_array()
        .map_err(|_| Error::InvalidLanguageLength)?;

    Ok(code.iter().map(|&byte| char::from(byte)).collect())
}

/// Checks that a language code can be written as the 3 bytes the format
/// demands.
pub(crate) fn check_lang(lang: &str) -> Result<()> {
    if lang.len() != 3 {
        return Err(Error::InvalidLanguageLength);
    }

    Ok(())
}
