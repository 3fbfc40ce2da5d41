//! Text frames.

use crate::core::io::BufStream;
use crate::id3v2::frames::{self, SHARED_KEY};
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

/// A generic text frame, covering every id starting with `T` except the
/// user-defined [`UserTextFrame`](crate::id3v2::frames::UserTextFrame).
///
/// Some taggers pack several NUL-separated values into one body even though
/// only ID3v2.4 blesses the practice; every value ends up in `multi`, with
/// `text` mirroring the first one. Only `text` is written back out.
#[derive(Clone, Debug, Default)]
pub struct TextFrame {
    pub encoding: Encoding,
    pub text: String,
    pub multi: Vec<String>,
}

impl TextFrame {
    pub fn new(encoding: Encoding, text: impl Into<String>) -> Self {
        Self {
            encoding,
            text: text.into(),
            multi: Vec::new(),
        }
    }

    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let multi = string::decode_multi(encoding, stream.take_rest());
        let text = multi.first().cloned().unwrap_or_default();

        Ok(Self {
            encoding,
            text,
            multi,
        })
    }

    pub fn size(&self) -> usize {
        1 + string::encoded_len(self.encoding, &self.text) + self.encoding.nul_size()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.text))?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        SHARED_KEY.to_string()
    }
}

/// A user-defined text frame, `TXXX`. Unlike the plain text frames, any
/// amount of these can live in one tag as long as their descriptions differ.
#[derive(Clone, Debug, Default)]
pub struct UserTextFrame {
    pub encoding: Encoding,
    pub desc: String,
    pub value: String,
    pub multi: Vec<String>,
}

impl UserTextFrame {
    pub fn new(encoding: Encoding, desc: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            encoding,
            desc: desc.into(),
            value: value.into(),
            multi: Vec::new(),
        }
    }

    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let desc = string::read_terminated(encoding, stream);
        let multi = string::decode_multi(encoding, stream.take_rest());
        let value = multi.first().cloned().unwrap_or_default();

        Ok(Self {
            encoding,
            desc,
            value,
            multi,
        })
    }

    pub fn size(&self) -> usize {
        1 + string::encoded_len(self.encoding, &self.desc)
            + self.encoding.nul_size()
            + string::encoded_len(self.encoding, &self.value)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.desc))?;
        n += frames::write_all(w, &string::render(self.encoding, &self.value))?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        self.desc.clone()
    }
}
