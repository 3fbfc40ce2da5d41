//! Frame sequences and id routing.

use crate::id3v2::frames::{Frame, USER_TEXT_ID};

/// An ordered collection of frames sharing one id, for the ids that are
/// allowed to repeat inside a tag.
///
/// Within a sequence, identity keys are unique: adding a frame whose key is
/// already present replaces that frame without moving it, while a new key
/// goes to the end.
#[derive(Clone, Debug, Default)]
pub(crate) struct Sequence {
    frames: Vec<Frame>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, frame: Frame) {
        let key = frame.key();

        match self.frames.iter().position(|existing| existing.key() == key) {
            Some(pos) => self.frames[pos] = frame,
            None => self.frames.push(frame),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Returns whether frames under `id` go into a sequence rather than the
/// singular map.
///
/// Text frames never repeat, except for the user-defined `TXXX`. A handful
/// of non-text frames are structurally singular too, along with two ids
/// that only exist in ID3v2.3. Everything else may repeat.
pub(crate) fn is_sequence_id(id: &str) -> bool {
    if id != USER_TEXT_ID && id.starts_with('T') {
        return false;
    }

    match id {
        "MCDI" | "ETCO" | "SYTC" | "RVRB" | "MLLT" | "PCNT" | "RBUF" | "POSS" | "OWNE"
        | "SEEK" | "ASPI" => false,
        "IPLS" | "RVAD" => false,
        _ => true,
    }
}
