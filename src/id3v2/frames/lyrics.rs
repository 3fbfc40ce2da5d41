//! Synchronised and unsynchronised lyrics frames.

use crate::core::io::BufStream;
use crate::id3v2::frames;
use crate::id3v2::lrc::LrcImport;
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

byte_enum! {
    /// What the timestamps of a synchronised lyrics frame count in.
    pub enum TimestampFormat {
        Unknown = 0x00,
        MpegFrames = 0x01,
        Millis = 0x02,
    };
    TimestampFormat::Unknown
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Millis
    }
}

byte_enum! {
    /// What kind of text a synchronised lyrics frame carries.
    pub enum SyncedContentType {
        Other = 0x00,
        Lyrics = 0x01,
        TextTranscription = 0x02,
        Movement = 0x03,
        Events = 0x04,
        Chord = 0x05,
        Trivia = 0x06,
        WebpageUrls = 0x07,
        ImageUrls = 0x08,
    };
    SyncedContentType::Other
}

impl Default for SyncedContentType {
    fn default() -> Self {
        SyncedContentType::Lyrics
    }
}

/// One entry of a synchronised lyrics frame: a line of text and the point
/// in the audio it belongs to, in the frame's timestamp format.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SyncedText {
    pub text: String,
    pub timestamp: u32,
}

/// A synchronised lyrics frame, `SYLT`. A tag can hold several as long as
/// each has a different language and descriptor pair.
#[derive(Clone, Debug, Default)]
pub struct SyncedLyricsFrame {
    pub encoding: Encoding,
    pub language: String,
    pub format: TimestampFormat,
    pub content_type: SyncedContentType,
    pub desc: String,
    pub lyrics: Vec<SyncedText>,
}

impl SyncedLyricsFrame {
    /// Builds a frame from the result of an LRC import.
    pub fn from_import(
        language: impl Into<String>,
        desc: impl Into<String>,
        import: LrcImport,
    ) -> Self {
        Self {
            encoding: Encoding::default(),
            language: language.into(),
            format: import.timestamp_format,
            content_type: SyncedContentType::Lyrics,
            desc: desc.into(),
            lyrics: import.texts,
        }
    }

    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let language = frames::parse_lang(stream)?;
        let format = TimestampFormat::parse(stream.read_u8()?);
        let content_type = SyncedContentType::parse(stream.read_u8()?);
        let desc = string::read_terminated(encoding, stream);

        let mut lyrics = Vec::new();

        while !stream.is_empty() {
            let text = string::read_terminated(encoding, stream);

            let timestamp = match stream.read_u32() {
                Ok(timestamp) => timestamp,
                // A lyric without its timestamp is a truncated frame. Keep
                // what was read so far.
                Err(_) => break,
            };

            lyrics.push(SyncedText { text, timestamp });
        }

        Ok(Self {
            encoding,
            language,
            format,
            content_type,
            desc,
            lyrics,
        })
    }

    pub fn size(&self) -> usize {
        let entries: usize = self
            .lyrics
            .iter()
            .map(|entry| string::encoded_len(self.encoding, &entry.text) + self.encoding.nul_size() + 4)
            .sum();

        1 + self.language.len()
            + 1
            + 1
            + string::encoded_len(self.encoding, &self.desc)
            + self.encoding.nul_size()
            + entries
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        frames::check_lang(&self.language)?;

        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, self.language.as_bytes())?;
        n += frames::write_all(w, &[self.format as u8, self.content_type as u8])?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.desc))?;

        for entry in &self.lyrics {
            n += frames::write_all(w, &string::render_terminated(self.encoding, &entry.text))?;
            n += frames::write_all(w, &entry.timestamp.to_be_bytes())?;
        }

        Ok(n)
    }

    pub fn key(&self) -> String {
        format!["{}{}", self.language, self.desc]
    }
}

/// An unsynchronised lyrics frame, `USLT`, holding free-form lyrics with no
/// timing. A tag can hold several as long as each has a different language
/// and descriptor pair.
#[derive(Clone, Debug, Default)]
pub struct UnsyncLyricsFrame {
    pub encoding: Encoding,
    pub language: String,
    pub desc: String,
    pub lyrics: String,
}

impl UnsyncLyricsFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let language = frames::parse_lang(stream)?;
        let desc = string::read_terminated(encoding, stream);
        let lyrics = string::read(encoding, stream);

        Ok(Self {
            encoding,
            language,
            desc,
            lyrics,
        })
    }

    pub fn size(&self) -> usize {
        1 + self.language.len()
            + string::encoded_len(self.encoding, &self.desc)
            + self.encoding.nul_size()
            + string::encoded_len(self.encoding, &self.lyrics)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        frames::check_lang(&self.language)?;

        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, self.language.as_bytes())?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.desc))?;
        n += frames::write_all(w, &string::render(self.encoding, &self.lyrics))?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        format!["{}{}", self.language, self.desc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USLT_DATA: &[u8] = b"\x00\
                               eng\
                               Description\0\
                               Jumped in the river, what did I see?\n\
                               Black eyed angels swam with me\n";

    const SYLT_DATA: &[u8] = b"\x03\
                               eng\
                               \x02\x01\
                               Description\0\
                               You don't remember, you don't remember\n\0\
                               \x00\x02\x78\xD0\
                               Why don't you remember my name?\n\0\
                               \x00\x02\x88\x70";

    #[test]
    fn parse_uslt() {
        let frame = UnsyncLyricsFrame::parse(&mut BufStream::new(USLT_DATA)).unwrap();

        assert_eq!(frame.encoding, Encoding::Latin1);
        assert_eq!(frame.language, "eng");
        assert_eq!(frame.desc, "Description");
        assert_eq!(
            frame.lyrics,
            "Jumped in the river, what did I see?\n\
             Black eyed angels swam with me\n"
        );
    }

    #[test]
    fn render_uslt() {
        let frame = UnsyncLyricsFrame {
            encoding: Encoding::Latin1,
            language: String::from("eng"),
            desc: String::from("Description"),
            lyrics: String::from(
                "Jumped in the river, what did I see?\n\
                 Black eyed angels swam with me\n",
            ),
        };

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();

        assert_eq!(out, USLT_DATA);
        assert_eq!(n as usize, frame.size());
    }

    #[test]
    fn parse_sylt() {
        let frame = SyncedLyricsFrame::parse(&mut BufStream::new(SYLT_DATA)).unwrap();

        assert_eq!(frame.encoding, Encoding::Utf8);
        assert_eq!(frame.language, "eng");
        assert_eq!(frame.format, TimestampFormat::Millis);
        assert_eq!(frame.content_type, SyncedContentType::Lyrics);
        assert_eq!(frame.desc, "Description");

        assert_eq!(frame.lyrics[0].timestamp, 162_000);
        assert_eq!(frame.lyrics[0].text, "You don't remember, you don't remember\n");
        assert_eq!(frame.lyrics[1].timestamp, 166_000);
        assert_eq!(frame.lyrics[1].text, "Why don't you remember my name?\n");
    }

    #[test]
    fn round_trip_sylt() {
        let frame = SyncedLyricsFrame {
            encoding: Encoding::Utf8,
            language: String::from("eng"),
            format: TimestampFormat::Millis,
            content_type: SyncedContentType::Lyrics,
            desc: String::from("Description"),
            lyrics: vec![
                SyncedText {
                    text: String::from("You don't remember, you don't remember\n"),
                    timestamp: 162_000,
                },
                SyncedText {
                    text: String::from("Why don't you remember my name?\n"),
                    timestamp: 166_000,
                },
            ],
        };

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();

        assert_eq!(out, SYLT_DATA);
        assert_eq!(n as usize, frame.size());

        let parsed = SyncedLyricsFrame::parse(&mut BufStream::new(&out)).unwrap();

        assert_eq!(parsed.language, frame.language);
        assert_eq!(parsed.content_type, frame.content_type);
        assert_eq!(parsed.desc, frame.desc);
        assert_eq!(parsed.lyrics, frame.lyrics);
    }

    #[test]
    fn lyrics_frames_need_languages() {
        let frame = SyncedLyricsFrame::default();

        assert!(frame.write_to(&mut Vec::new()).is_err());
    }
}
