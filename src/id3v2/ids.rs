//! Human-readable frame descriptions and the ids they map to.
//!
//! Pure data: callers pass around descriptions like "Artist" and these
//! tables turn them into the version-appropriate frame id. Descriptions not
//! present in a table map to themselves, which conveniently lets raw ids
//! pass straight through.

use crate::id3v2::Version;

/// Maps `description` to the frame id it names under `version`. An unknown
/// description is returned unchanged.
pub(crate) fn common_id<'a>(description: &'a str, version: Version) -> &'a str {
    let id = match version {
        Version::V3 => common_id_v3(description),
        Version::V4 => common_id_v4(description),
    };

    id.unwrap_or(description)
}

fn common_id_v3(description: &str) -> Option<&'static str> {
    let id = match description {
        "Album/Movie/Show title" => "TALB",
        "Attached picture" => "APIC",
        "Band/Orchestra/Accompaniment" => "TPE2",
        "BPM" => "TBPM",
        "Chapters" => "CHAP",
        "Comments" => "COMM",
        "Composer" => "TCOM",
        "Conductor/performer refinement" => "TPE3",
        "Content group description" => "TIT1",
        "Content type" => "TCON",
        "Copyright message" => "TCOP",
        "Date" => "TDAT",
        "Encoded by" => "TENC",
        "File owner/licensee" => "TOWN",
        "File type" => "TFLT",
        "Initial key" => "TKEY",
        "Internet radio station name" => "TRSN",
        "Internet radio station owner" => "TRSO",
        "Interpreted, remixed, or otherwise modified by" => "TPE4",
        "ISRC" => "TSRC",
        "Language" => "TLAN",
        "Lead artist/Lead performer/Soloist/Performing group" => "TPE1",
        "Length" => "TLEN",
        "Lyricist/Text writer" => "TEXT",
        "Media type" => "TMED",
        "Original album/movie/show title" => "TOAL",
        "Original artist/performer" => "TOPE",
        "Original filename" => "TOFN",
        "Original lyricist/text writer" => "TOLY",
        "Original release year" => "TORY",
        "Part of a set" => "TPOS",
        "Playlist delay" => "TDLY",
        "Popularimeter" => "POPM",
        "Publisher" => "TPUB",
        "Recording dates" => "TRDA",
        "Size" => "TSIZ",
        "Software/Hardware and settings used for encoding" => "TSSE",
        "Subtitle/Description refinement" => "TIT3",
        "Synchronised lyrics/text" => "SYLT",
        "Time" => "TIME",
        "Title/Songname/Content description" => "TIT2",
        "Track number/Position in set" => "TRCK",
        "Unique file identifier" => "UFID",
        "Unsynchronised lyrics/text transcription" => "USLT",
        "User defined text information frame" => "TXXX",
        "Year" => "TYER",

        // Short forms for the most common fields.
        "Artist" => "TPE1",
        "Genre" => "TCON",
        "Title" => "TIT2",

        _ => return None,
    };

    Some(id)
}

fn common_id_v4(description: &str) -> Option<&'static str> {
    let id = match description {
        "Album sort order" => "TSOA",
        "Album/Movie/Show title" => "TALB",
        "Attached picture" => "APIC",
        "Band/Orchestra/Accompaniment" => "TPE2",
        "BPM" => "TBPM",
        "Chapters" => "CHAP",
        "Comments" => "COMM",
        "Composer" => "TCOM",
        "Conductor/performer refinement" => "TPE3",
        "Content group description" => "TIT1",
        "Content type" => "TCON",
        "Copyright message" => "TCOP",
        "Encoded by" => "TENC",
        "Encoding time" => "TDEN",
        "File owner/licensee" => "TOWN",
        "File type" => "TFLT",
        "Initial key" => "TKEY",
        "Internet radio station name" => "TRSN",
        "Internet radio station owner" => "TRSO",
        "Interpreted, remixed, or otherwise modified by" => "TPE4",
        "Involved people list" => "TIPL",
        "ISRC" => "TSRC",
        "Language" => "TLAN",
        "Lead artist/Lead performer/Soloist/Performing group" => "TPE1",
        "Length" => "TLEN",
        "Lyricist/Text writer" => "TEXT",
        "Media type" => "TMED",
        "Mood" => "TMOO",
        "Musician credits list" => "TMCL",
        "Original album/movie/show title" => "TOAL",
        "Original artist/performer" => "TOPE",
        "Original filename" => "TOFN",
        "Original lyricist/text writer" => "TOLY",
        "Original release time" => "TDOR",
        "Part of a set" => "TPOS",
        "Performer sort order" => "TSOP",
        "Playlist delay" => "TDLY",
        "Popularimeter" => "POPM",
        "Produced notice" => "TPRO",
        "Publisher" => "TPUB",
        "Recording time" => "TDRC",
        "Release time" => "TDRL",
        "Set subtitle" => "TSST",
        "Software/Hardware and settings used for encoding" => "TSSE",
        "Subtitle/Description refinement" => "TIT3",
        "Synchronised lyrics/text" => "SYLT",
        "Tagging time" => "TDTG",
        "Title sort order" => "TSOT",
        "Title/Songname/Content description" => "TIT2",
        "Track number/Position in set" => "TRCK",
        "Unique file identifier" => "UFID",
        "Unsynchronised lyrics/text transcription" => "USLT",
        "User defined text information frame" => "TXXX",

        // ID3v2.3 frames that were folded into their v2.4 replacements.
        "Date" => "TDRC",
        "Original release year" => "TDOR",
        "Recording dates" => "TDRC",
        "Size" => "",
        "Time" => "TDRC",
        "Year" => "TDRC",

        // Short forms for the most common fields.
        "Artist" => "TPE1",
        "Genre" => "TCON",
        "Title" => "TIT2",

        _ => return None,
    };

    Some(id)
}
