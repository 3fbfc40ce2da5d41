//! The tag aggregate and its reader/writer.

use crate::core::io::BufStream;
use crate::core::pool::BUF_POOL;
use crate::id3v2::collections::{self, Sequence};
use crate::id3v2::frames::{
    self, AttachedPictureFrame, ChapterFrame, CommentsFrame, FileIdFrame, Frame, FrameHeader,
    SyncedLyricsFrame, TextFrame, UnsyncLyricsFrame, UserTextFrame, FRAME_HEADER_LEN,
};
use crate::id3v2::{ids, syncdata, Error, Result, Version};
use crate::string::Encoding;
use indexmap::IndexMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::slice;

/// The size of an encoded tag header.
pub(crate) const TAG_HEADER_LEN: usize = 10;

/// The marker every tag header starts with.
pub(crate) const ID_HEADER: &[u8] = b"ID3";

/// The buffer size used when carrying the audio payload over to a new file.
const SAVE_BUFFER_LEN: usize = 128 * 1024;

/// Settings that influence how a tag is parsed.
#[derive(Clone, Debug)]
pub struct Options {
    /// Whether to parse the frame area at all. When false, only the tag
    /// header is consumed.
    pub parse: bool,
    /// The frames to parse, as ids (`TIT2`) or descriptions (`Title`).
    /// Every other frame's body is skipped over, which is considerably
    /// cheaper when all that's wanted is a couple of text fields. Empty
    /// means parse everything.
    pub parse_frames: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            parse: true,
            parse_frames: Vec::new(),
        }
    }
}

/// An ID3v2 tag: every frame parsed from (or destined for) one audio file.
///
/// Frames whose id must not repeat live in a singular map where adding
/// overwrites; repeatable ids each hold an ordered sequence deduplicated by
/// the frames' identity keys. A tag opened from a file keeps the file handle
/// so that [`save`](Tag::save) can rewrite it in place.
pub struct Tag {
    frames: IndexMap<String, Frame>,
    sequences: IndexMap<String, Sequence>,
    version: Version,
    default_encoding: Encoding,
    original_size: u64,
    backing: Option<Backing>,
}

struct Backing {
    file: File,
    path: PathBuf,
}

impl Default for Tag {
    fn default() -> Self {
        Self::new()
    }
}

impl Tag {
    /// Creates an empty ID3v2.4 tag.
    pub fn new() -> Self {
        Tag {
            frames: IndexMap::new(),
            sequences: IndexMap::new(),
            version: Version::V4,
            default_encoding: Version::V4.default_encoding(),
            original_size: 0,
            backing: None,
        }
    }

    /// Opens the file at `path` and parses the tag at its start, keeping the
    /// file handle for a later [`save`](Tag::save). A file without a tag
    /// yields an empty v4 tag rather than an error, so it can be tagged from
    /// scratch.
    pub fn open(path: impl AsRef<Path>, options: &Options) -> Result<Self> {
        let mut file = File::open(&path)?;

        let mut tag = Self::new();
        tag.parse(&mut file, options)?;
        tag.backing = Some(Backing {
            file,
            path: path.as_ref().to_path_buf(),
        });

        Ok(tag)
    }

    /// Parses a tag from the start of `reader`. As with [`open`](Tag::open),
    /// a stream without a tag yields an empty v4 tag.
    pub fn read_from(reader: &mut impl Read, options: &Options) -> Result<Self> {
        let mut tag = Self::new();
        tag.parse(reader, options)?;

        Ok(tag)
    }

    /// Clears the tag and re-parses it from `reader`.
    pub fn reset(&mut self, reader: &mut impl Read, options: &Options) -> Result<()> {
        self.parse(reader, options)
    }

    fn parse(&mut self, reader: &mut impl Read, options: &Options) -> Result<()> {
        self.delete_all_frames();

        let header = match read_header(reader)? {
            Some(header) => header,
            None => {
                // No tag. Start fresh so the stream can still be tagged and
                // written later.
                self.init(0, Version::V4);
                return Ok(());
            }
        };

        self.init(
            (TAG_HEADER_LEN as u64) + u64::from(header.frames_size),
            header.version,
        );

        if !options.parse {
            return Ok(());
        }

        let mut buf = BUF_POOL.acquire(header.frames_size as usize);

        let filled = match read_up_to(reader, &mut buf) {
            Ok(filled) => filled,
            Err(err) => {
                BUF_POOL.release(buf);
                return Err(Error::Io(err));
            }
        };

        let result = self.parse_frames(
            &mut BufStream::new(&buf[..filled]),
            header.frames_size as usize,
            options,
        );
        BUF_POOL.release(buf);

        result
    }

    fn init(&mut self, original_size: u64, version: Version) {
        self.original_size = original_size;
        self.version = version;
        self.default_encoding = version.default_encoding();
    }

    fn parse_frames(
        &mut self,
        stream: &mut BufStream,
        area_size: usize,
        options: &Options,
    ) -> Result<()> {
        let synch_safe = self.version.synch_safe();
        let selective = !options.parse_frames.is_empty();

        let mut wanted: Vec<String> = options
            .parse_frames
            .iter()
            .map(|desc| self.common_id(desc).to_string())
            .collect();

        // Overflow is judged against the size the header declared. A stream
        // that simply ends early instead yields a partial final frame, the
        // same as hitting EOF mid-body.
        let mut area_remaining = area_size;

        while let Some(header) = FrameHeader::parse(stream, synch_safe) {
            area_remaining = match area_remaining.checked_sub(FRAME_HEADER_LEN + header.body_size)
            {
                Some(rest) => rest,
                None => return Err(Error::BodyOverflow),
            };

            let take = usize::min(header.body_size, stream.remaining());
            let truncated = take < header.body_size;
            let mut body = stream.slice_stream(take)?;

            // A skipped frame costs nothing more than the slice above.
            if selective && !wanted.iter().any(|id| id == &header.id) {
                if truncated {
                    break;
                }

                continue;
            }

            let frame = frames::parse_body(&header.id, &mut body, self.version)?;
            let singular = !collections::is_sequence_id(&header.id);
            self.add_frame(&header.id, frame);

            if truncated {
                break;
            }

            // Singular frames can only be satisfied once, so a selective
            // parse is done the moment the last requested one is seen.
            if selective && singular {
                wanted.retain(|id| id != &header.id);

                if wanted.is_empty() {
                    break;
                }
            }
        }

        Ok(())
    }

    /// The tag's version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Changes the tag's version, which also resets the default encoding to
    /// the new version's.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
        self.default_encoding = version.default_encoding();
    }

    /// The encoding used for text frames added without an explicit one.
    pub fn default_encoding(&self) -> Encoding {
        self.default_encoding
    }

    pub fn set_default_encoding(&mut self, encoding: Encoding) {
        self.default_encoding = encoding;
    }

    /// Maps a human-readable frame description like `Artist` to the frame id
    /// it names under this tag's version. Unknown descriptions (including
    /// plain ids) map to themselves.
    pub fn common_id<'a>(&self, description: &'a str) -> &'a str {
        ids::common_id(description, self.version)
    }

    /// Adds a frame under `id`. Repeatable ids are deduplicated by identity
    /// key: a frame whose key is already present replaces the old entry at
    /// its position, anything else is appended. Singular ids are simply
    /// overwritten.
    pub fn add_frame(&mut self, id: &str, frame: impl Into<Frame>) {
        if id.is_empty() {
            return;
        }

        if collections::is_sequence_id(id) {
            self.sequences
                .entry(id.to_string())
                .or_insert_with(Sequence::new)
                .add(frame.into());
        } else {
            self.frames.insert(id.to_string(), frame.into());
        }
    }

    /// Adds a text frame for `id` with the given encoding and text.
    pub fn add_text_frame(&mut self, id: &str, encoding: Encoding, text: impl Into<String>) {
        self.add_frame(id, TextFrame::new(encoding, text));
    }

    pub fn add_attached_picture(&mut self, frame: AttachedPictureFrame) {
        let id = self.common_id("Attached picture");
        self.add_frame(id, frame);
    }

    pub fn add_chapter_frame(&mut self, frame: ChapterFrame) {
        let id = self.common_id("Chapters");
        self.add_frame(id, frame);
    }

    pub fn add_comment_frame(&mut self, frame: CommentsFrame) {
        let id = self.common_id("Comments");
        self.add_frame(id, frame);
    }

    pub fn add_synced_lyrics_frame(&mut self, frame: SyncedLyricsFrame) {
        let id = self.common_id("Synchronised lyrics/text");
        self.add_frame(id, frame);
    }

    pub fn add_unsync_lyrics_frame(&mut self, frame: UnsyncLyricsFrame) {
        let id = self.common_id("Unsynchronised lyrics/text transcription");
        self.add_frame(id, frame);
    }

    pub fn add_user_text_frame(&mut self, frame: UserTextFrame) {
        let id = self.common_id("User defined text information frame");
        self.add_frame(id, frame);
    }

    pub fn add_file_id_frame(&mut self, frame: FileIdFrame) {
        let id = self.common_id("Unique file identifier");
        self.add_frame(id, frame);
    }

    /// Every frame stored under `id`, in order. Empty when the id holds
    /// nothing.
    pub fn get_frames(&self, id: &str) -> &[Frame] {
        if let Some(frame) = self.frames.get(id) {
            return slice::from_ref(frame);
        }

        if let Some(sequence) = self.sequences.get(id) {
            return sequence.frames();
        }

        &[]
    }

    /// The most recently added frame under `id`. The simple getter for ids
    /// that are repeatable in principle but singular in practice.
    pub fn get_last_frame(&self, id: &str) -> Option<&Frame> {
        self.get_frames(id).last()
    }

    /// The text frame under `id`, if there is one.
    pub fn get_text_frame(&self, id: &str) -> Option<&TextFrame> {
        match self.get_last_frame(id) {
            Some(Frame::Text(frame)) => Some(frame),
            _ => None,
        }
    }

    /// Removes every frame stored under `id`.
    pub fn delete_frames(&mut self, id: &str) {
        self.frames.shift_remove(id);
        self.sequences.shift_remove(id);
    }

    /// Removes every frame in the tag.
    pub fn delete_all_frames(&mut self) {
        self.frames.clear();
        self.sequences.clear();
    }

    /// The total amount of frames in the tag.
    pub fn count(&self) -> usize {
        self.frames.len() + self.sequences.values().map(Sequence::len).sum::<usize>()
    }

    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty() || !self.sequences.is_empty()
    }

    /// Every frame in the tag, grouped by id: the singular frames first,
    /// then each sequence.
    pub fn frames(&self) -> impl Iterator<Item = (&str, &[Frame])> {
        let singular = self
            .frames
            .iter()
            .map(|(id, frame)| (id.as_str(), slice::from_ref(frame)));

        let repeated = self
            .sequences
            .iter()
            .map(|(id, sequence)| (id.as_str(), sequence.frames()));

        singular.chain(repeated)
    }

    /// The full encoded size of the tag: the header plus every frame with
    /// its own header. A tag with no frames has size zero, since nothing at
    /// all is written for it.
    pub fn size(&self) -> usize {
        if !self.has_frames() {
            return 0;
        }

        let frames: usize = self
            .frames()
            .map(|(_, group)| {
                group
                    .iter()
                    .map(|frame| FRAME_HEADER_LEN + frame.size())
                    .sum::<usize>()
            })
            .sum();

        TAG_HEADER_LEN + frames
    }

    /// Serializes the whole tag to `w`, returning the bytes written. A tag
    /// with no frames writes nothing.
    pub fn write_to(&self, w: &mut impl Write) -> Result<u64> {
        let size = self.size();

        if size == 0 {
            return Ok(0);
        }

        let synch_safe = self.version.synch_safe();
        let frames_size = (size - TAG_HEADER_LEN) as u64;

        let mut n = frames::write_all(w, ID_HEADER)?;
        n += frames::write_all(w, &[self.version.byte(), 0, 0])?;
        n += frames::write_all(w, &syncdata::from_size(frames_size, true)?)?;

        for (id, group) in self.frames() {
            for frame in group {
                n += frames::write_frame(w, id, frame, synch_safe)?;
            }
        }

        Ok(n)
    }

    /// Rewrites the backing file in place: the serialized tag, then the
    /// original audio payload. The replacement is staged in a temporary
    /// file next to the original and only renamed over it once fully on
    /// disk, so a failed save leaves the original untouched.
    ///
    /// Fails with [`Error::NoFile`] when the tag has no backing file.
    pub fn save(&mut self) -> Result<()> {
        let mut backing = self.backing.take().ok_or(Error::NoFile)?;
        let tmp = tmp_path(&backing.path);

        let result = self.write_replacement(&mut backing.file, &tmp).and_then(|size| {
            fs::rename(&tmp, &backing.path)?;
            Ok(size)
        });

        match result {
            Ok(size) => {
                backing.file = File::open(&backing.path)?;
                self.original_size = size;
                self.backing = Some(backing);

                Ok(())
            }
            Err(err) => {
                let _ = fs::remove_file(&tmp);
                self.backing = Some(backing);

                Err(err)
            }
        }
    }

    fn write_replacement(&self, original: &mut File, tmp: &Path) -> Result<u64> {
        let mut writer = BufWriter::new(File::create(tmp)?);

        let size = self.write_to(&mut writer)?;

        // Everything past the old tag is the audio payload, carried over
        // verbatim.
        original.seek(SeekFrom::Start(self.original_size))?;

        let mut buf = BUF_POOL.acquire(SAVE_BUFFER_LEN);
        let copied = copy_payload(original, &mut writer, &mut buf);
        BUF_POOL.release(buf);
        copied?;

        // The replacement must be durable before the rename may happen. The
        // file closes when it drops at the end of this function.
        let out = writer.into_inner().map_err(io::Error::from)?;
        out.sync_all()?;

        Ok(size)
    }

    /// Releases the backing file handle. Fails with [`Error::NoFile`] when
    /// the tag has none, including when it was already closed.
    pub fn close(&mut self) -> Result<()> {
        match self.backing.take() {
            Some(_) => Ok(()),
            None => Err(Error::NoFile),
        }
    }

    /// The tag's title, or an empty string when it has none.
    pub fn title(&self) -> &str {
        self.text_for("Title")
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_text_for("Title", title);
    }

    pub fn artist(&self) -> &str {
        self.text_for("Artist")
    }

    pub fn set_artist(&mut self, artist: impl Into<String>) {
        self.set_text_for("Artist", artist);
    }

    pub fn album(&self) -> &str {
        self.text_for("Album/Movie/Show title")
    }

    pub fn set_album(&mut self, album: impl Into<String>) {
        self.set_text_for("Album/Movie/Show title", album);
    }

    pub fn year(&self) -> &str {
        self.text_for("Year")
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        self.set_text_for("Year", year);
    }

    pub fn genre(&self) -> &str {
        self.text_for("Genre")
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.set_text_for("Genre", genre);
    }

    fn text_for(&self, description: &str) -> &str {
        match self.get_text_frame(self.common_id(description)) {
            Some(frame) => &frame.text,
            None => "",
        }
    }

    fn set_text_for(&mut self, description: &str, text: impl Into<String>) {
        let id = self.common_id(description).to_string();
        let encoding = self.default_encoding;

        self.add_text_frame(&id, encoding, text);
    }
}

struct TagHeader {
    version: Version,
    frames_size: u32,
}

/// Reads the 10-byte tag header. `Ok(None)` means the stream holds no tag at
/// all, which is a fresh start rather than an error.
fn read_header(reader: &mut impl Read) -> Result<Option<TagHeader>> {
    let mut raw = [0; TAG_HEADER_LEN];

    if read_up_to(reader, &mut raw)? < raw.len() || &raw[0..3] != ID_HEADER {
        return Ok(None);
    }

    let version = match raw[3] {
        3 => Version::V3,
        4 => Version::V4,
        version => return Err(Error::UnsupportedVersion(version)),
    };

    // raw[4] is the revision and raw[5] the flags, neither of which matter
    // here.

    let frames_size = syncdata::to_size([raw[6], raw[7], raw[8], raw[9]], true)?;

    Ok(Some(TagHeader {
        version,
        frames_size,
    }))
}

/// Fills as much of `buf` as the reader can provide, returning how much that
/// was.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }

    Ok(filled)
}

fn copy_payload(src: &mut File, dst: &mut impl Write, buf: &mut [u8]) -> Result<()> {
    loop {
        match src.read(buf)? {
            0 => return Ok(()),
            n => dst.write_all(&buf[..n])?,
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push("-id3kit");

    PathBuf::from(name)
}
