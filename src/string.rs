//! Tag string handling.

use crate::core::io::BufStream;
use log::warn;

/// The UTF-16 byte order mark in little-endian order, as most taggers in the
/// wild write it.
const BOM_LE: &[u8] = &[0xFF, 0xFE];

/// The UTF-16 byte order mark in big-endian order, which is also what a field
/// without any mark is assumed to be.
const BOM_BE: &[u8] = &[0xFE, 0xFF];

/// A text encoding for tag strings.
///
/// ID3v2 allows frame text to be written in one of four encodings, each
/// identified on the wire by a key byte and terminated by its own NUL
/// sequence. [`Utf8`](Encoding::Utf8) is the best choice when a frame is
/// created from scratch, and is the default.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    /// ISO-8859-1, also known as Latin1. Used by older taggers. Unicode text
    /// outside the Latin1 range is flattened into "?" characters when
    /// written with this encoding.
    Latin1,
    /// UTF-16 with a byte order mark. The mark decides the endianness when
    /// reading; big-endian is assumed when it is missing.
    Utf16,
    /// UTF-16BE without a byte order mark.
    Utf16Be,
    /// UTF-8.
    Utf8,
}

impl Encoding {
    /// Returns the encoding corresponding to an ID3v2 key byte. Unrecognized
    /// keys are treated as UTF-8 rather than failing, since a bad key byte
    /// should never abort a parse.
    pub(crate) fn new(key: u8) -> Self {
        match key {
            0 => Encoding::Latin1,
            1 => Encoding::Utf16,
            2 => Encoding::Utf16Be,
            3 => Encoding::Utf8,
            _ => {
                warn!("unrecognized encoding key {}, assuming UTF-8", key);
                Encoding::Utf8
            }
        }
    }

    /// The key byte written before text fields in this encoding.
    pub(crate) fn key(self) -> u8 {
        match self {
            Encoding::Latin1 => 0,
            Encoding::Utf16 => 1,
            Encoding::Utf16Be => 2,
            Encoding::Utf8 => 3,
        }
    }

    /// The width of this encoding's NUL terminator.
    pub(crate) fn nul_size(self) -> usize {
        match self {
            Encoding::Latin1 | Encoding::Utf8 => 1,
            Encoding::Utf16 | Encoding::Utf16Be => 2,
        }
    }

    /// The NUL sequence that terminates fields in this encoding.
    pub(crate) fn terminator(self) -> &'static [u8] {
        match self.nul_size() {
            1 => &[0],
            _ => &[0, 0],
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf8
    }
}

/// Consumes the rest of this stream and decodes it into a string according
/// to the encoding.
pub(crate) fn read(encoding: Encoding, stream: &mut BufStream) -> String {
    decode(encoding, stream.take_rest())
}

/// Consumes the stream up to and including the encoding's NUL terminator and
/// decodes the field before it. If no terminator is present the rest of the
/// stream is taken as the field.
pub(crate) fn read_terminated(encoding: Encoding, stream: &mut BufStream) -> String {
    let term = encoding.terminator();

    let pos = match stream.find(term) {
        Some(pos) => pos,
        None => return decode(encoding, stream.take_rest()),
    };

    let mut end = pos;

    // A byte-granular scan for a two byte terminator can stop one byte short
    // of the real code unit boundary. Unless the field is nothing but a byte
    // order mark, fold one extra byte into the text to compensate.
    if encoding == Encoding::Utf16 && stream.peek(0..pos).map(|text| text != BOM_LE).unwrap_or(true)
    {
        end += 1;
    }

    let text = stream.slice(end).unwrap_or(&[]);
    stream.skip_at_most(term.len());

    decode(encoding, text)
}

/// Decodes `data` into a string according to the encoding. One trailing NUL
/// terminator is stripped if present. This never fails: undecodable input is
/// recovered locally instead of aborting the parse.
pub(crate) fn decode(encoding: Encoding, data: &[u8]) -> String {
    let data = match encoding.nul_size() {
        1 => data.strip_suffix(&[0]).unwrap_or(data),
        _ => data.strip_suffix(&[0, 0]).unwrap_or(data),
    };

    match encoding {
        Encoding::Latin1 => decode_latin1(data),
        Encoding::Utf16 => decode_utf16(data),
        Encoding::Utf16Be => decode_utf16be(data),
        Encoding::Utf8 => decode_utf8(data),
    }
}

/// Decodes a field packing several NUL-separated values into each value.
/// Fields like this are only ever read, never written, so a trailing
/// terminator is also tolerated.
pub(crate) fn decode_multi(encoding: Encoding, data: &[u8]) -> Vec<String> {
    let term = encoding.terminator();

    let mut data = match encoding.nul_size() {
        1 => data.strip_suffix(&[0]).unwrap_or(data),
        _ => data.strip_suffix(&[0, 0]).unwrap_or(data),
    };

    let mut values = Vec::new();

    while let Some(pos) = find_in(data, term) {
        values.push(decode(encoding, &data[..pos]));
        data = &data[pos + term.len()..];
    }

    values.push(decode(encoding, data));

    values
}

/// Renders a string according to the encoding.
pub(crate) fn render(encoding: Encoding, string: &str) -> Vec<u8> {
    match encoding {
        Encoding::Latin1 => encode_latin1(string),
        Encoding::Utf16 => encode_utf16(string),
        Encoding::Utf16Be => encode_utf16be(string),
        Encoding::Utf8 => string.as_bytes().to_vec(),
    }
}

/// Renders a string plus a NUL terminator according to the encoding.
pub(crate) fn render_terminated(encoding: Encoding, string: &str) -> Vec<u8> {
    let mut result = render(encoding, string);

    result.resize(result.len() + encoding.nul_size(), 0);

    result
}

/// Returns the exact length of [`render`](render)'s output for this string
/// without building it. Frame size calculations rely on the two agreeing.
pub(crate) fn encoded_len(encoding: Encoding, string: &str) -> usize {
    match encoding {
        Encoding::Utf8 => string.len(),
        Encoding::Latin1 => string.chars().count(),
        Encoding::Utf16Be => string.encode_utf16().count() * 2,
        Encoding::Utf16 => {
            // Low byte of the mark, which is what the field ends on when
            // there are no code units at all.
            let mut last = 0xFF;
            let mut len = 2;

            for unit in string.encode_utf16() {
                last = unit as u8;
                len += 2;
            }

            // The pad byte emitted by encode_utf16.
            if last != 0 {
                len += 1;
            }

            len
        }
    }
}

fn decode_latin1(data: &[u8]) -> String {
    // UTF-8 expresses high bits as two bytes instead of one, so we cannot convert directly.
    // Instead, we simply reinterpret the bytes as chars to make sure the code-points line up.
    data.iter().map(|&byte| char::from(byte)).collect()
}

fn decode_utf8(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(string) => string.to_string(),
        Err(_) => {
            // Not actually UTF-8. Reinterpret the raw bytes instead of
            // dropping the field.
            warn!("could not decode UTF-8 field, keeping raw bytes");
            decode_latin1(data)
        }
    }
}

fn decode_utf16(data: &[u8]) -> String {
    if data.len() < 2 {
        return String::new();
    }

    // A field holding nothing but a mark is an empty string.
    if data == BOM_LE || data == BOM_BE {
        return String::new();
    }

    // The mark decides the endianness. Fields written without one are
    // big-endian as far as we're concerned.
    match (data[0], data[1]) {
        (0xFF, 0xFE) => decode_utf16le(&data[2..]),
        (0xFE, 0xFF) => decode_utf16be(&data[2..]),
        _ => {
            warn!("could not determine UTF-16 byte order, assuming big-endian");
            decode_utf16be(data)
        }
    }
}

fn decode_utf16be(data: &[u8]) -> String {
    String::from_utf16_lossy(
        data.chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>()
            .as_slice(),
    )
}

fn decode_utf16le(data: &[u8]) -> String {
    String::from_utf16_lossy(
        data.chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>()
            .as_slice(),
    )
}

fn encode_latin1(string: &str) -> Vec<u8> {
    // All Latin1 chars line up with UTF-8 code-points, but everything else has
    // to be expressed as a ?
    string
        .chars()
        .map(|ch| if u32::from(ch) > 0xFF { b'?' } else { ch as u8 })
        .collect()
}

fn encode_utf16(string: &str) -> Vec<u8> {
    let mut result = BOM_BE.to_vec();

    result.extend(string.encode_utf16().flat_map(|cp| cp.to_be_bytes()));

    // Make sure the encoded text ends on a zero byte. Terminated fields are
    // scanned byte-by-byte when read back, and the scan lands one byte early
    // unless a zero sits right before the terminator.
    if result.last() != Some(&0) {
        result.push(0);
    }

    result
}

fn encode_utf16be(string: &str) -> Vec<u8> {
    string
        .encode_utf16()
        .flat_map(|cp| cp.to_be_bytes())
        .collect()
}

fn find_in(data: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > data.len() {
        return None;
    }

    (0..=data.len() - needle.len()).find(|&i| &data[i..i + needle.len()] == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STR_LATIN1: &str = "L\u{ee}ke \u{e2} while loop w\u{ef}th n\u{f8} escap\u{ea}";
    const DATA_LATIN1: &[u8] = b"L\xEEke \xE2 while loop w\xEFth n\xF8 escap\xEA";

    #[test]
    fn decode_latin1_data() {
        assert_eq!(decode(Encoding::Latin1, DATA_LATIN1), STR_LATIN1);
    }

    #[test]
    fn render_latin1_data() {
        assert_eq!(render(Encoding::Latin1, STR_LATIN1), DATA_LATIN1);
    }

    #[test]
    fn render_latin1_lossy() {
        assert_eq!(render(Encoding::Latin1, "\u{2551}a\u{2551}"), b"?a?");
    }

    #[test]
    fn round_trip_every_encoding() {
        let text = "L\u{ee}ke \u{e2} \u{1d568}hile loop";

        for &encoding in &[Encoding::Utf16, Encoding::Utf16Be, Encoding::Utf8] {
            let rendered = render(encoding, text);

            assert_eq!(decode(encoding, &rendered), text);
            assert_eq!(encoded_len(encoding, text), rendered.len());
        }

        // Latin1 only round-trips Latin1 text.
        let rendered = render(Encoding::Latin1, STR_LATIN1);
        assert_eq!(decode(Encoding::Latin1, &rendered), STR_LATIN1);
        assert_eq!(encoded_len(Encoding::Latin1, STR_LATIN1), rendered.len());
    }

    #[test]
    fn render_utf16_marks_and_pads() {
        // Big-endian mark, then the code units, then a pad zero so that the
        // field ends on a zero byte.
        assert_eq!(render(Encoding::Utf16, "ab"), b"\xFE\xFF\x00a\x00b\x00");
        assert_eq!(encoded_len(Encoding::Utf16, "ab"), 7);

        // Text that already ends on a zero byte is not padded.
        assert_eq!(render(Encoding::Utf16, "\u{100}"), b"\xFE\xFF\x01\x00");
        assert_eq!(encoded_len(Encoding::Utf16, "\u{100}"), 4);
    }

    #[test]
    fn decode_bare_bom() {
        assert_eq!(decode(Encoding::Utf16, b"\xFF\xFE"), "");
        assert_eq!(decode(Encoding::Utf16, b"\xFE\xFF"), "");
        assert_eq!(render(Encoding::Utf16, ""), b"\xFE\xFF\x00");
    }

    #[test]
    fn decode_utf16_without_mark() {
        // No mark defaults to big-endian.
        assert_eq!(decode(Encoding::Utf16, b"\x00a\x00b"), "ab");
    }

    #[test]
    fn read_terminated_latin1() {
        let data = b"L\xEEke \xE2 while loo\0p w\xEFth n\xF8 escap\xEA";
        let mut stream = BufStream::new(data);

        assert_eq!(
            read_terminated(Encoding::Latin1, &mut stream),
            "L\u{ee}ke \u{e2} while loo"
        );
        assert_eq!(
            read_terminated(Encoding::Latin1, &mut stream),
            "p w\u{ef}th n\u{f8} escap\u{ea}"
        );
        assert!(stream.is_empty());
    }

    #[test]
    fn read_terminated_utf16_le() {
        // Little-endian "a" followed by the terminator. The byte-granular
        // scan stops inside the code unit, and the fold-in rule has to
        // realign it.
        let mut stream = BufStream::new(b"\xFF\xFE\x61\x00\x00\x00rest");

        assert_eq!(read_terminated(Encoding::Utf16, &mut stream), "a");
        assert_eq!(stream.take_rest(), b"rest");
    }

    #[test]
    fn read_terminated_utf16_round_trip() {
        for text in &["Verse 1", "", "\u{43f}\u{440}\u{438}\u{432}\u{435}\u{442}"] {
            let mut data = render_terminated(Encoding::Utf16, text);
            data.extend(b"rest");

            let mut stream = BufStream::new(&data);

            assert_eq!(read_terminated(Encoding::Utf16, &mut stream), *text);
            assert_eq!(stream.take_rest(), b"rest");
        }
    }

    #[test]
    fn read_terminated_without_terminator() {
        let mut stream = BufStream::new(b"no end");

        assert_eq!(read_terminated(Encoding::Latin1, &mut stream), "no end");
        assert!(stream.is_empty());
    }

    #[test]
    fn decode_multi_values() {
        let values = decode_multi(Encoding::Latin1, b"Post-Rock\0Electronica\0");

        assert_eq!(values, &["Post-Rock", "Electronica"]);
    }

    #[test]
    fn decode_multi_single_value() {
        assert_eq!(decode_multi(Encoding::Utf8, b"Post-Rock"), &["Post-Rock"]);
    }

    #[test]
    fn decode_invalid_utf8_keeps_bytes() {
        assert_eq!(decode(Encoding::Utf8, b"\xFFa"), "\u{ff}a");
    }

    #[test]
    fn unrecognized_key_is_utf8() {
        assert_eq!(Encoding::new(0x16), Encoding::Utf8);
        assert_eq!(Encoding::new(1), Encoding::Utf16);
    }
}
