//! Popularimeter frames.

use crate::core::io::BufStream;
use crate::id3v2::frames;
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

/// A popularimeter frame, `POPM`, holding one user's rating and play count
/// for the track. The email identifies the user; a tag can hold one frame
/// per email.
///
/// The format puts no upper bound on the play counter, so it is kept as the
/// big-endian bytes it was read with. The written form is always at least 4
/// bytes, left-padded with zeroes.
#[derive(Clone, Debug, Default)]
pub struct PopularimeterFrame {
    pub email: String,
    /// 1 is the worst rating and 255 the best. 0 means no rating.
    pub rating: u8,
    pub counter: Vec<u8>,
}

impl PopularimeterFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let email = string::read_terminated(Encoding::Latin1, stream);

        // Both the rating and the counter are commonly dropped by taggers
        // that only care about the other field.
        let rating = stream.read_u8().unwrap_or(0);
        let counter = stream.take_rest().to_vec();

        Ok(Self {
            email,
            rating,
            counter,
        })
    }

    /// The play count as an integer, saturating at `u64::MAX` for counters
    /// too large to fold.
    pub fn plays(&self) -> u64 {
        let significant = match self.counter.iter().position(|&byte| byte != 0) {
            Some(pos) => &self.counter[pos..],
            None => return 0,
        };

        if significant.len() > 8 {
            return u64::MAX;
        }

        significant
            .iter()
            .fold(0, |plays, &byte| (plays << 8) | u64::from(byte))
    }

    /// Replaces the counter with the byte form of `plays`.
    pub fn set_plays(&mut self, plays: u64) {
        self.counter = plays.to_be_bytes().to_vec();
    }

    pub fn size(&self) -> usize {
        string::encoded_len(Encoding::Latin1, &self.email) + 1 + 1 + self.counter_bytes().len()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(w, &string::render_terminated(Encoding::Latin1, &self.email))?;
        n += frames::write_all(w, &[self.rating])?;
        n += frames::write_all(w, &self.counter_bytes())?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        self.email.clone()
    }

    /// The counter as written: leading zeroes trimmed, then padded back out
    /// to the 4-byte minimum the format requires.
    fn counter_bytes(&self) -> Vec<u8> {
        let start = self
            .counter
            .iter()
            .position(|&byte| byte != 0)
            .unwrap_or_else(|| self.counter.len());

        let significant = &self.counter[start..];

        let mut bytes = vec![0; 4usize.saturating_sub(significant.len())];
        bytes.extend_from_slice(significant);

        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POPM_DATA: &[u8] = b"test@test.com\0\x80\x00\x00\x16\x16";

    #[test]
    fn parse_popm() {
        let frame = PopularimeterFrame::parse(&mut BufStream::new(POPM_DATA)).unwrap();

        assert_eq!(frame.email, "test@test.com");
        assert_eq!(frame.rating, 0x80);
        assert_eq!(frame.plays(), 0x1616);
        assert_eq!(frame.key(), "test@test.com");
    }

    #[test]
    fn render_popm() {
        let mut frame = PopularimeterFrame {
            email: String::from("test@test.com"),
            rating: 0x80,
            ..PopularimeterFrame::default()
        };
        frame.set_plays(0x1616);

        let mut out = Vec::new();
        let n = frame.write_to(&mut out).unwrap();

        assert_eq!(out, POPM_DATA);
        assert_eq!(n as usize, frame.size());
    }

    #[test]
    fn counters_are_at_least_four_bytes() {
        let mut frame = PopularimeterFrame::default();

        frame.set_plays(1);
        assert_eq!(frame.counter_bytes(), b"\x00\x00\x00\x01");

        frame.set_plays(0);
        assert_eq!(frame.counter_bytes(), b"\x00\x00\x00\x00");
    }

    #[test]
    fn large_counters_keep_every_byte() {
        let frame = PopularimeterFrame {
            counter: b"\x01\x23\x45\x67\x89\xAB\xCD".to_vec(),
            ..PopularimeterFrame::default()
        };

        assert_eq!(frame.counter_bytes(), b"\x01\x23\x45\x67\x89\xAB\xCD");
        assert_eq!(frame.plays(), 0x0123_4567_89AB_CD);

        // Nothing stops a tagger from writing a counter beyond 8 bytes, and
        // it has to survive a round trip.
        let huge = PopularimeterFrame {
            counter: vec![0x16; 12],
            ..PopularimeterFrame::default()
        };

        assert_eq!(huge.counter_bytes().len(), 12);
        assert_eq!(huge.plays(), u64::MAX);
    }
}
