//! LRC lyrics file import.
//!
//! LRC is a plain-text format pairing `[mm:ss.xx]` timestamps with lines of
//! lyrics, with optional `[key:value]` metadata at the top. It has nothing
//! to do with the binary tag format, but its shape maps straight onto a
//! synchronised lyrics frame, so a small importer lives here.
//! [`SyncedLyricsFrame::from_import`](crate::id3v2::frames::SyncedLyricsFrame::from_import)
//! consumes the result.

use crate::id3v2::frames::{SyncedText, TimestampFormat};
use regex::Regex;
use std::collections::HashMap;
use std::io::{self, BufRead, ErrorKind};
use std::sync::OnceLock;

/// The result of scanning an LRC file.
#[derive(Clone, Debug, Default)]
pub struct LrcImport {
    /// Always milliseconds; `[mm:ss.xx]` stamps have no other reading.
    pub timestamp_format: TimestampFormat,
    /// The `[key:value]` metadata lines, e.g. `ar` for the artist.
    pub metadata: HashMap<String, String>,
    pub texts: Vec<SyncedText>,
    /// Comment lines, keyed by their 1-based line number.
    pub comments: HashMap<usize, String>,
}

/// Scans an LRC document into its metadata and timestamped lines. A global
/// `[offset:±n]` tag shifts every timestamp by that many milliseconds.
pub fn parse_lrc<R: BufRead>(reader: R) -> io::Result<LrcImport> {
    let mut lines = Vec::new();

    for line in reader.lines() {
        lines.push(line?.trim().to_string());
    }

    // The offset applies to stamps before and after its own line, so it has
    // to be found before anything else is read.
    let mut offset: i64 = 0;

    for line in &lines {
        if let Some(captures) = offset_pattern().captures(line) {
            offset = captures[1]
                .parse()
                .map_err(|err| io::Error::new(ErrorKind::InvalidData, err))?;

            break;
        }
    }

    let mut import = LrcImport {
        timestamp_format: TimestampFormat::Millis,
        ..LrcImport::default()
    };

    for (i, line) in lines.iter().enumerate() {
        if offset_pattern().is_match(line) {
            continue;
        }

        if let Some(captures) = timestamp_pattern().captures(line) {
            let minutes: i64 = captures[1].parse().unwrap_or(0);
            let seconds: i64 = captures[2].parse().unwrap_or(0);
            let hundredths: i64 = captures[3].parse().unwrap_or(0);

            let timestamp = minutes * 60_000 + seconds * 1000 + hundredths * 10 + offset;

            import.texts.push(SyncedText {
                text: captures[4].trim().to_string(),
                timestamp: clamp_timestamp(timestamp),
            });
        } else if let Some(captures) = metadata_pattern().captures(line) {
            import
                .metadata
                .insert(captures[1].to_string(), captures[2].to_string());
        } else if let Some(comment) = line.strip_prefix('#') {
            import.comments.insert(i + 1, comment.to_string());
        }
    }

    Ok(import)
}

fn clamp_timestamp(timestamp: i64) -> u32 {
    if timestamp < 0 {
        return 0;
    }

    u64::min(timestamp as u64, u64::from(u32::MAX)) as u32
}

fn metadata_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\[(\w+):(.+?)\]$").unwrap())
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\[offset:([+-]?\d+)\]").unwrap())
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[(\d+):(\d{2})\.(\d{2})\](.*)").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3v2::frames::SyncedLyricsFrame;

    const LRC_DATA: &str = "\
[ar:Artist Name]
[al:Album Name]
[ti:Title]
[length:03:30]
[offset:500]
# A comment for line six.
[00:10.00]Jumped in the river, what did I see?
[00:20.00]Black eyed angels swam with me
";

    #[test]
    fn parse_lrc_document() {
        let import = parse_lrc(LRC_DATA.as_bytes()).unwrap();

        assert_eq!(import.timestamp_format, TimestampFormat::Millis);
        assert_eq!(import.metadata["ar"], "Artist Name");
        assert_eq!(import.metadata["al"], "Album Name");
        assert_eq!(import.metadata["ti"], "Title");
        assert_eq!(import.metadata["length"], "03:30");
        assert_eq!(import.comments[&6], " A comment for line six.");

        // Timestamps are shifted by the global offset.
        assert_eq!(
            import.texts,
            &[
                SyncedText {
                    text: String::from("Jumped in the river, what did I see?"),
                    timestamp: 10_500,
                },
                SyncedText {
                    text: String::from("Black eyed angels swam with me"),
                    timestamp: 20_500,
                },
            ]
        );
    }

    #[test]
    fn negative_offsets_clamp_to_zero() {
        let import = parse_lrc("[offset:-90000]\n[00:10.00]Early".as_bytes()).unwrap();

        assert_eq!(import.texts[0].timestamp, 0);
    }

    #[test]
    fn import_into_synced_lyrics() {
        let import = parse_lrc(LRC_DATA.as_bytes()).unwrap();
        let frame = SyncedLyricsFrame::from_import("eng", "Imported", import);

        assert_eq!(frame.language, "eng");
        assert_eq!(frame.format, TimestampFormat::Millis);
        assert_eq!(frame.lyrics.len(), 2);
        assert!(frame.write_to(&mut Vec::new()).is_ok());
    }
}
