//! Frames this library does not recognize.

use crate::core::io::BufStream;
use crate::id3v2::frames;
use crate::id3v2::Result;
use std::io::Write;

/// A frame with an id the dispatch table does not know. The body is kept
/// verbatim so that the frame survives a rewrite untouched.
#[derive(Clone, Debug)]
pub struct UnknownFrame {
    pub body: Vec<u8>,
    key: u64,
}

impl UnknownFrame {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            // Two unknown frames under one id must never collide in a
            // sequence, so the key is random.
            key: rand::random(),
        }
    }

    pub(crate) fn parse(stream: &mut BufStream) -> Self {
        Self::new(stream.take_rest().to_vec())
    }

    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        frames::write_all(w, &self.body)
    }

    pub fn key(&self) -> String {
        format!["{:016X}", self.key]
    }
}
