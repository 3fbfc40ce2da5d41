//! Comment frames.

use crate::core::io::BufStream;
use crate::id3v2::frames;
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

/// A comment frame, `COMM`. A tag can hold any amount of these as long as
/// each has a different language and description pair.
///
/// `language` must be a three-letter ISO-639-2 code; writing a frame with
/// anything else fails with
/// [`Error::InvalidLanguageLength`](crate::id3v2::Error::InvalidLanguageLength).
#[derive(Clone, Debug, Default)]
pub struct CommentsFrame {
    pub encoding: Encoding,
    pub language: String,
    pub desc: String,
    pub text: String,
}

impl CommentsFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let language = frames::parse_lang(stream)?;
        let desc = string::read_terminated(encoding, stream);
        let text = string::read(encoding, stream);

        Ok(Self {
            encoding,
            language,
            desc,
            text,
        })
    }

    pub fn size(&self) -> usize {
        1 + self.language.len()
            + string::encoded_len(self.encoding, &self.desc)
            + self.encoding.nul_size()
            + string::encoded_len(self.encoding, &self.text)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        frames::check_lang(&self.language)?;

        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, self.language.as_bytes())?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.desc))?;
        n += frames::write_all(w, &string::render(self.encoding, &self.text))?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        format!["{}{}", self.language, self.desc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3v2::Error;

    const COMM_DATA: &[u8] = b"\x03engDescription\x00Text";

    #[test]
    fn parse_comm() {
        let frame = CommentsFrame::parse(&mut BufStream::new(COMM_DATA)).unwrap();

        assert_eq!(frame.encoding, Encoding::Utf8);
        assert_eq!(frame.language, "eng");
        assert_eq!(frame.desc, "Description");
        assert_eq!(frame.text, "Text");
        assert_eq!(frame.key(), "engDescription");
    }

    #[test]
    fn render_comm() {
        let frame = CommentsFrame {
            encoding: Encoding::Utf8,
            language: String::from("eng"),
            desc: String::from("Description"),
            text: String::from("Text"),
        };

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();

        assert_eq!(out, COMM_DATA);
        assert_eq!(n as usize, frame.size());
    }

    #[test]
    fn reject_bad_language_codes() {
        let frame = CommentsFrame {
            language: String::from("en"),
            ..CommentsFrame::default()
        };

        assert!(matches!(
            frame.write_to(&mut Vec::new()),
            Err(Error::InvalidLanguageLength)
        ));

        // A truncated language field fails the same way on the read side.
        assert!(matches!(
            CommentsFrame::parse(&mut BufStream::new(b"\x03en")),
            Err(Error::InvalidLanguageLength)
        ));
    }
}
