//! Column access for one CoNLL data line.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use conll_types::{EMPTY_LABEL, PLACEHOLDER, UNLABELED};

use crate::CorpusError;

/// A data line must carry at least this many tab-separated fields.
pub const MIN_FIELDS: usize = 8;

const POSITION: usize = 0;
const WORD: usize = 1;
const LEMMA: usize = 2;
const POS: usize = 3;
const LANGUAGE_ID: usize = 5;
const HEAD: usize = 6;
const LABEL: usize = 7;
const UPDATE_WEIGHT: usize = 8;

/// Borrowed fields of a non-blank treebank line.
#[derive(Clone, Debug)]
pub struct ConllLine<'a> {
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> ConllLine<'a> {
    /// Split a raw line into fields; blank lines yield `Ok(None)`.
    ///
    /// `line` is the 1-based line number used in error messages.
    pub fn parse(line: usize, raw: &'a str) -> Result<Option<Self>, CorpusError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let fields: Vec<&str> = trimmed.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return Err(CorpusError::Format {
                line,
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }
        Ok(Some(Self { line, fields }))
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based token position.
    pub fn position(&self) -> Result<usize, CorpusError> {
        self.number(POSITION, "position")
    }

    pub fn word(&self) -> &'a str {
        self.fields[WORD].trim()
    }

    pub fn lemma(&self) -> &'a str {
        self.fields[LEMMA].trim()
    }

    pub fn pos(&self) -> &'a str {
        self.fields[POS].trim()
    }

    pub fn language_id(&self) -> &'a str {
        self.fields[LANGUAGE_ID].trim()
    }

    /// Head position; 0 is the root and negative values mark unattached tokens.
    pub fn head(&self) -> Result<i32, CorpusError> {
        self.number(HEAD, "head index")
    }

    /// Raw dependency label column.
    pub fn label(&self) -> &'a str {
        self.fields[LABEL].trim()
    }

    /// Optional ninth column; missing, malformed or zero weights become 1.
    pub fn update_weight(&self) -> u32 {
        self.fields
            .get(UPDATE_WEIGHT)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|weight| *weight > 0)
            .unwrap_or(1)
    }

    fn number<T: std::str::FromStr>(&self, idx: usize, field: &'static str) -> Result<T, CorpusError> {
        let raw = self.fields[idx].trim();
        raw.parse().map_err(|_| CorpusError::InvalidNumber {
            line: self.line,
            field,
            value: raw.to_string(),
        })
    }
}

/// Label string as stored in the vocabulary.
pub fn normalize_label(raw: &str, labeled: bool) -> &str {
    if !labeled {
        UNLABELED
    } else if raw == PLACEHOLDER {
        EMPTY_LABEL
    } else {
        raw
    }
}

pub fn normalize_word(raw: &str, lowercased: bool) -> Cow<'_, str> {
    if lowercased {
        Cow::Owned(raw.to_lowercase())
    } else {
        Cow::Borrowed(raw)
    }
}

/// Open a corpus-style file for one buffered pass.
pub fn open(path: &Path) -> Result<BufReader<File>, CorpusError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CorpusError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Read one line without its terminator into `buf`.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the read, so
/// legacy-encoded treebanks still load. Returns `Ok(None)` at end of input.
pub fn read_line_lossy<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, CorpusError> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Run `visit` over every line of `path` with its 1-based line number.
///
/// The file is closed when the pass ends, including on error.
pub(crate) fn scan_lines<F>(path: &Path, mut visit: F) -> Result<(), CorpusError>
where
    F: FnMut(usize, &str) -> Result<(), CorpusError>,
{
    let mut reader = open(path)?;
    let mut buf = Vec::new();
    let mut line_no = 0;
    while let Some(line) = read_line_lossy(&mut reader, &mut buf)? {
        line_no += 1;
        visit(line_no, &line)?;
    }
    Ok(())
}
