//! Attached picture frames.

use crate::core::io::BufStream;
use crate::id3v2::frames;
use crate::id3v2::Result;
use crate::string::{self, Encoding};
use std::io::Write;

byte_enum! {
    /// The role a picture plays in the tag, written as a single byte after
    /// the MIME type.
    pub enum PictureType {
        Other = 0x00,
        FileIcon = 0x01,
        OtherFileIcon = 0x02,
        FrontCover = 0x03,
        BackCover = 0x04,
        LeafletPage = 0x05,
        Media = 0x06,
        LeadArtist = 0x07,
        Artist = 0x08,
        Conductor = 0x09,
        Band = 0x0A,
        Composer = 0x0B,
        Lyricist = 0x0C,
        RecordingLocation = 0x0D,
        DuringRecording = 0x0E,
        DuringPerformance = 0x0F,
        MovieScreenCapture = 0x10,
        ColoredFish = 0x11,
        Illustration = 0x12,
        BandLogo = 0x13,
        PublisherLogo = 0x14,
    };
    PictureType::Other
}

impl Default for PictureType {
    fn default() -> Self {
        PictureType::Other
    }
}

/// An attached picture frame, `APIC`, usually carrying album art. A tag can
/// hold several as long as each has a different picture type and
/// description pair.
#[derive(Clone, Debug, Default)]
pub struct AttachedPictureFrame {
    pub encoding: Encoding,
    pub mime: String,
    pub pic_type: PictureType,
    pub desc: String,
    pub picture: Vec<u8>,
}

impl AttachedPictureFrame {
    pub(crate) fn parse(stream: &mut BufStream) -> Result<Self> {
        let encoding = Encoding::new(stream.read_u8()?);
        let mime = string::read_terminated(Encoding::Latin1, stream);
        let pic_type = PictureType::parse(stream.read_u8()?);
        let desc = string::read_terminated(encoding, stream);
        let picture = stream.take_rest().to_vec();

        Ok(Self {
            encoding,
            mime,
            pic_type,
            desc,
            picture,
        })
    }

    pub fn size(&self) -> usize {
        1 + string::encoded_len(Encoding::Latin1, &self.mime)
            + 1
            + 1
            + string::encoded_len(self.encoding, &self.desc)
            + self.encoding.nul_size()
            + self.picture.len()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<u64> {
        let mut n = frames::write_all(w, &[self.encoding.key()])?;
        n += frames::write_all(w, &string::render_terminated(Encoding::Latin1, &self.mime))?;
        n += frames::write_all(w, &[self.pic_type as u8])?;
        n += frames::write_all(w, &string::render_terminated(self.encoding, &self.desc))?;
        n += frames::write_all(w, &self.picture)?;

        Ok(n)
    }

    pub fn key(&self) -> String {
        format!["{:02X}{}", self.pic_type as u8, self.desc]
    }
}
