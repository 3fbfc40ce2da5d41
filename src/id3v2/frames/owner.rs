//! Unique file identifier frames.

use crate::core::io::BufStream;
use crate::id3v2::frames;
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

/// A unique file identifier frame, `UFID`, tying the file to a database
/// record owned by some service. A tag can hold one frame per owner.
#[derive(Clone, Debug, Default)]
pub struct FileIdFrame {
    /// The owner of the identifier, e.g. `https://musicbrainz.org`.
    pub owner: String,
    /// The identifier itself, up to 64 bytes of arbitrary data.
    pub identifier: Vec<u8>,
}

impl FileIdFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let owner = string::read_terminated(Encoding::Latin1, stream);
        let identifier = stream.take_rest().to_vec();

        Ok(Self { owner, identifier })
    }

    pub fn size(&self) -> usize {
        string::encoded_len(Encoding::Latin1, &self.owner) + 1 + self.identifier.len()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(w, &string::render_terminated(Encoding::Latin1, &self.owner))?;
        n += frames::write_all(w, &self.identifier)?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        self.owner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UFID_DATA: &[u8] = b"https://musicbrainz.org\0\x16\x16\x16\x16";

    #[test]
    fn parse_ufid() {
        let frame = FileIdFrame::parse(&mut BufStream::new(UFID_DATA)).unwrap();

        assert_eq!(frame.owner, "https://musicbrainz.org");
        assert_eq!(frame.identifier, b"\x16\x16\x16\x16");
        assert_eq!(frame.key(), "https://musicbrainz.org");
    }

    #[test]
    fn render_ufid() {
        let frame = FileIdFrame {
            owner: String::from("https://musicbrainz.org"),
            identifier: b"\x16\x16\x16\x16".to_vec(),
        };

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();

        assert_eq!(out, UFID_DATA);
        assert_eq!(n as usize, frame.size());
    }
}
