//! Encoding detection and line reading for survey files
//!
//! Survey data in the wild is mostly UTF-8, with older files saved as
//! ISO-8859-1. Detection tries strict UTF-8 over the whole file and falls
//! back to ISO-8859-1, where every byte maps to the code point of the same
//! value (C1 controls included).

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::{mem, UTF_8};

use crate::core::model::Encoding;

/// Content after a leading UTF-8 byte order mark, if any
fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    match encoding_rs::Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) if encoding == UTF_8 => &bytes[bom_length..],
        _ => bytes,
    }
}

fn decode_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
    UTF_8.decode_without_bom_handling_and_without_replacement(strip_utf8_bom(bytes))
}

/// Decode a buffer as UTF-8 when all of it is valid UTF-8, as ISO-8859-1
/// otherwise
pub fn decode(bytes: &[u8]) -> (Encoding, String) {
    match decode_utf8(bytes) {
        Some(text) => (Encoding::Utf8, text.into_owned()),
        None => (Encoding::Latin1, mem::decode_latin1(bytes).into_owned()),
    }
}

/// Line-by-line reader over the decoded content of one file
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. A terminator at the very end
/// of the file does not start another line.
#[derive(Debug)]
pub struct LineReader {
    text: String,
    position: usize,
    encoding: Encoding,
}

impl LineReader {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let (encoding, text) = decode(bytes);
        Self {
            text,
            position: 0,
            encoding,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Next line without its terminator, or None at end of file
    pub fn next_line(&mut self) -> Option<String> {
        let rest = &self.text[self.position..];
        if rest.is_empty() {
            return None;
        }

        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let line = rest[..end].to_string();
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                self.position += end + terminator;
                Some(line)
            }
            None => {
                let line = rest.to_string();
                self.position = self.text.len();
                Some(line)
            }
        }
    }
}

/// Read a survey file in one pass and prepare it for line reading
///
/// The file handle is closed before this returns.
pub fn open_survey_file(path: &Path) -> std::io::Result<LineReader> {
    let bytes = fs::read(path)?;
    Ok(LineReader::from_bytes(&bytes))
}
