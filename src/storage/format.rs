//! Line codec for the store file: `<path>|<fingerprint>`, one record per line.
//!
//! The path is separated from the digest at the last `|`, so paths may
//! themselves contain `|`.
//!
//! Files without a header are in the plain line format and paths are taken
//! verbatim, backslashes included. A path containing a newline or carriage
//! return cannot be written that way, so such stores start with
//! [`FORMAT_MARKER`] and every path escapes `\`, `\n` and `\r`.

use super::TrackedFile;
use crate::digest::Fingerprint;
use crate::error::RecordError;

/// Field delimiter between path and fingerprint.
pub const DELIMITER: char = '|';

/// First line of a store whose paths are escaped.
pub const FORMAT_MARKER: &str = "#fixity-v1";

/// How paths are spelled on each line of a store file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineFormat {
    /// Paths written as-is. Readable by any plain `<path>|<digest>` reader.
    #[default]
    Verbatim,
    /// Paths escaped, announced by a [`FORMAT_MARKER`] header.
    Escaped,
}

impl LineFormat {
    /// The format a store holding `paths` must be written in.
    #[must_use]
    pub fn for_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        if paths.into_iter().any(|p| p.contains(['\n', '\r'])) {
            Self::Escaped
        } else {
            Self::Verbatim
        }
    }

    /// Whether `line` is the header announcing [`LineFormat::Escaped`].
    #[must_use]
    pub fn is_marker(line: &str) -> bool {
        line.trim_end() == FORMAT_MARKER
    }
}

/// Encode one record as a line, without the trailing newline.
#[must_use]
pub fn encode_record(path: &str, fingerprint: &Fingerprint, format: LineFormat) -> String {
    let mut line = String::with_capacity(path.len() + fingerprint.as_str().len() + 1);
    match format {
        LineFormat::Verbatim => line.push_str(path),
        LineFormat::Escaped => escape_into(path, &mut line),
    }
    line.push(DELIMITER);
    line.push_str(fingerprint.as_str());
    line
}

/// Parse one line (without its newline) into a record.
///
/// # Errors
///
/// Returns a `RecordError` describing why the line is malformed.
pub fn parse_record(line: &str, format: LineFormat) -> Result<TrackedFile, RecordError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (raw_path, digest) = line
        .rsplit_once(DELIMITER)
        .ok_or(RecordError::MissingDelimiter)?;

    if raw_path.is_empty() {
        return Err(RecordError::EmptyPath);
    }
    let digest = digest.trim();
    if digest.is_empty() {
        return Err(RecordError::EmptyDigest);
    }

    let path = match format {
        LineFormat::Verbatim => raw_path.to_string(),
        LineFormat::Escaped => unescape(raw_path)?,
    };
    Ok(TrackedFile {
        path,
        fingerprint: Fingerprint::from_stored(digest),
    })
}

fn escape_into(path: &str, out: &mut String) {
    for c in path.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
}

fn unescape(raw: &str) -> Result<String, RecordError> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            _ => return Err(RecordError::InvalidEscape),
        }
    }
    Ok(out)
}
