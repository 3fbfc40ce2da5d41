//! ID3v2 tag reading and writing.
//!
//! id3kit decodes the ID3v2.3/v2.4 metadata container found at the start of
//! MP3 files into a strongly-typed [`Tag`](id3v2::Tag), and encodes it back,
//! including safe in-place rewriting of the underlying file.

#![forbid(unsafe_code)]

#[macro_use]
mod core;

pub mod id3v2;
pub mod string;
