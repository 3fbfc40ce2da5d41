//! Link frames.

use crate::core::io::BufStream;
use crate::id3v2::frames::{self, SHARED_KEY};
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

/// A link frame carrying a URL, written as `WXXX`.
#[derive(Clone, Debug, Default)]
pub struct LinkFrame {
    pub encoding: Encoding,
    pub url: String,
}

impl LinkFrame {
    pub fn new(encoding: Encoding, url: impl Into<String>) -> Self {
        Self {
            encoding,
            url: url.into(),
        }
    }

    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let url = string::read(encoding, stream);

        Ok(Self { encoding, url })
    }

    pub fn size(&self) -> usize {
        1 + string::encoded_len(self.encoding, &self.url) + self.encoding.nul_size()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.url))?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        SHARED_KEY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WXXX_DATA: &[u8] = b"\x00https://test.com\0";

    #[test]
    fn parse_link() {
        let frame = LinkFrame::parse(&mut BufStream::new(WXXX_DATA)).unwrap();

        assert_eq!(frame.encoding, Encoding::Latin1);
        assert_eq!(frame.url, "https://test.com");
    }

    #[test]
    fn render_link() {
        let frame = LinkFrame::new(Encoding::Latin1, "https://test.com");

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();

        assert_eq!(out, WXXX_DATA);
        assert_eq!(n as usize, frame.size());
    }
}
