//! Chapter frames.

use crate::core::io::BufStream;
use crate::id3v2::frames::{
    self, AttachedPictureFrame, FrameHeader, LinkFrame, TextFrame, FRAME_HEADER_LEN,
};
use crate::id3v2::{Result, Version};
use crate::string::{self, Encoding};
use std::io::Write;
use std::time::Duration;

/// The byte offset value that tells readers to ignore the offsets and use
/// the timestamps instead.
pub const IGNORED_OFFSET: u32 = 0xFFFF_FFFF;

/// A chapter frame, `CHAP`, splitting the audio into named sections. A tag
/// can hold several as long as each has a different element id.
///
/// A chapter positions itself with either millisecond timestamps or byte
/// offsets; when an offset is [`IGNORED_OFFSET`] the matching timestamp is
/// authoritative. The body can also embed a handful of frames describing
/// the chapter. The title and description travel through a rewrite; a link
/// or artwork subframe is only captured when reading.
#[derive(Clone, Debug)]
pub struct ChapterFrame {
    pub element_id: String,
    pub start_time: Duration,
    pub end_time: Duration,
    pub start_offset: u32,
    pub end_offset: u32,
    pub title: Option<TextFrame>,
    pub description: Option<TextFrame>,
    pub link: Option<LinkFrame>,
    pub artwork: Option<AttachedPictureFrame>,
}

impl ChapterFrame {
    pub(crate) fn parse(stream: &mut BufStream, version: Version) -> Result<Self> {
        let element_id = string::read_terminated(Encoding::Latin1, stream);

        let start_time = Duration::from_millis(u64::from(stream.read_u32()?));
        let end_time = Duration::from_millis(u64::from(stream.read_u32()?));
        let start_offset = stream.read_u32()?;
        let end_offset = stream.read_u32()?;

        let mut title = None;
        let mut description = None;
        let mut link = None;
        let mut artwork = None;

        // The rest of the body is a nested frame area. The stream is already
        // bounded to this frame, so the subframe scan ends wherever the
        // outer body does.
        let synch_safe = version.synch_safe();

        while let Some(header) = FrameHeader::parse(stream, synch_safe) {
            let mut body = match stream.slice_stream(header.body_size) {
                Ok(body) => body,
                Err(_) => break,
            };

            match header.id.as_str() {
                "TIT2" => title = Some(TextFrame::parse(&mut body)?),
                "TIT3" => description = Some(TextFrame::parse(&mut body)?),
                "WXXX" => link = Some(LinkFrame::parse(&mut body)?),
                "APIC" => artwork = Some(AttachedPictureFrame::parse(&mut body)?),
                // Anything else was consumed by the slice above, which keeps
                // the scan aligned on the next subframe header.
                _ => {}
            }
        }

        Ok(Self {
            element_id,
            start_time,
            end_time,
            start_offset,
            end_offset,
            title,
            description,
            link,
            artwork,
        })
    }

    pub fn size(&self) -> usize {
        let mut size = string::encoded_len(Encoding::Latin1, &self.element_id) + 1 + 16;

        if let Some(title) = &self.title {
            size += FRAME_HEADER_LEN + title.size();
        }

        if let Some(description) = &self.description {
            size += FRAME_HEADER_LEN + description.size();
        }

        size
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(
            w,
            &string::render_terminated(Encoding::Latin1, &self.element_id),
        )?;

        n += frames::write_all(w, &duration_millis(self.start_time).to_be_bytes())?;
        n += frames::write_all(w, &duration_millis(self.end_time).to_be_bytes())?;
        n += frames::write_all(w, &self.start_offset.to_be_bytes())?;
        n += frames::write_all(w, &self.end_offset.to_be_bytes())?;

        // Subframe sizes are always written synch-safe.
        if let Some(title) = &self.title {
            n += frames::write_frame_header(w, "TIT2", title.size(), true)?;
            n += title.write_to(w)?;
        }

        if let Some(description) = &self.description {
            n += frames::write_frame_header(w, "TIT3", description.size(), true)?;
            n += description.write_to(w)?;
        }

        Ok(n)
    }

    pub fn key(&self) -> String {
        self.element_id.clone()
    }
}

impl Default for ChapterFrame {
    fn default() -> Self {
        Self {
            element_id: String::new(),
            start_time: Duration::default(),
            end_time: Duration::default(),
            start_offset: IGNORED_OFFSET,
            end_offset: IGNORED_OFFSET,
            title: None,
            description: None,
            link: None,
            artwork: None,
        }
    }
}

fn duration_millis(duration: Duration) -> u32 {
    // The wire format only has 4 bytes for a timestamp.
    u128::min(duration.as_millis(), i32::MAX as u128) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAP_TITLE_ONLY: &[u8] = b"chp1\0\
                                     \x00\x00\x00\x00\
                                     \x00\x0A\xBC\xDE\
                                     \x16\x16\x16\x16\
                                     \xFF\xFF\xFF\xFF\
                                     TIT2\x00\x00\x00\x0A\x00\x00\
                                     \x00Chapter 1";

    #[test]
    fn parse_chap_with_title_only() {
        let frame =
            ChapterFrame::parse(&mut BufStream::new(CHAP_TITLE_ONLY), Version::V4).unwrap();

        assert_eq!(frame.element_id, "chp1");
        assert_eq!(frame.start_time, Duration::from_millis(0));
        assert_eq!(frame.end_time, Duration::from_millis(0xABCDE));
        assert_eq!(frame.start_offset, 0x16161616);
        assert_eq!(frame.end_offset, IGNORED_OFFSET);

        assert_eq!(frame.title.unwrap().text, "Chapter 1");
        assert!(frame.description.is_none());
        assert!(frame.link.is_none());
        assert!(frame.artwork.is_none());
    }

    #[test]
    fn parse_chap_skips_unrecognized_subframes() {
        let data = b"chp1\0\
                     \x00\x00\x00\x00\
                     \x00\x00\x00\x10\
                     \xFF\xFF\xFF\xFF\
                     \xFF\xFF\xFF\xFF\
                     PRIV\x00\x00\x00\x04\x00\x00\
                     \x16\x16\x16\x16\
                     TIT2\x00\x00\x00\x0A\x00\x00\
                     \x00Chapter 1";

        let frame = ChapterFrame::parse(&mut BufStream::new(data), Version::V4).unwrap();

        assert_eq!(frame.title.unwrap().text, "Chapter 1");
    }

    #[test]
    fn parse_chap_with_link_and_artwork() {
        let data = b"chp1\0\
                     \x00\x00\x00\x00\
                     \x00\x00\x00\x10\
                     \xFF\xFF\xFF\xFF\
                     \xFF\xFF\xFF\xFF\
                     WXXX\x00\x00\x00\x12\x00\x00\
                     \x00https://test.com\0\
                     APIC\x00\x00\x00\x11\x00\x00\
                     \x00image/png\0\x03\0\x89PNG";

        let frame = ChapterFrame::parse(&mut BufStream::new(data), Version::V4).unwrap();

        assert_eq!(frame.link.unwrap().url, "https://test.com");
        assert_eq!(frame.artwork.unwrap().picture, b"\x89PNG");
    }

    #[test]
    fn round_trip_chap() {
        let frame = ChapterFrame {
            element_id: String::from("chp1"),
            start_time: Duration::from_millis(0),
            end_time: Duration::from_millis(0xABCDE),
            start_offset: 0x16161616,
            end_offset: IGNORED_OFFSET,
            title: Some(TextFrame::new(Encoding::Latin1, "Chapter 1")),
            description: Some(TextFrame::new(Encoding::Latin1, "The one where it begins")),
            ..ChapterFrame::default()
        };

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();
        assert_eq!(n as usize, frame.size());

        let parsed = ChapterFrame::parse(&mut BufStream::new(&out), Version::V4).unwrap();

        assert_eq!(parsed.element_id, frame.element_id);
        assert_eq!(parsed.end_time, frame.end_time);
        assert_eq!(parsed.title.unwrap().text, "Chapter 1");
        assert_eq!(parsed.description.unwrap().text, "The one where it begins");
        assert!(parsed.link.is_none());
        assert!(parsed.artwork.is_none());
    }
}
