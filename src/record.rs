use memchr::memmem;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Prefix of the synthetic `line_text` carried by filename matches.
pub const FILE_NAME_MATCH_MARKER: &str = "[MATCH IN FILE NAME]";

/// Display budget for `line_text`, in characters.
pub const MAX_LINE_CHARS: usize = 90;

const ELLIPSIS: &str = "...";

/// One reported hit, either in a file's name or on one of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub occurrences: usize,
    pub file: PathBuf,
    /// 1-based. `None` marks a filename match.
    pub line_number: Option<usize>,
    pub line_text: String,
}

impl MatchRecord {
    pub fn file_name_match(file: PathBuf, file_name: &str, occurrences: usize) -> Self {
        Self {
            occurrences,
            file,
            line_number: None,
            line_text: format!("{FILE_NAME_MATCH_MARKER} {file_name}"),
        }
    }

    pub fn line_match(file: PathBuf, line_number: usize, line: &str, occurrences: usize) -> Self {
        Self {
            occurrences,
            file,
            line_number: Some(line_number),
            line_text: truncate_line(line),
        }
    }

    pub fn is_file_name_match(&self) -> bool {
        self.line_number.is_none()
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(n) => write!(
                f,
                "{}:{}: {} ({}x)",
                self.file.display(),
                n,
                self.line_text,
                self.occurrences
            ),
            None => write!(
                f,
                "{}: {} ({}x)",
                self.file.display(),
                self.line_text,
                self.occurrences
            ),
        }
    }
}

/// Strips trailing line terminators and fits the line into
/// [`MAX_LINE_CHARS`], ending with `...` when shortened.
pub fn truncate_line(line: &str) -> String {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.chars().count() <= MAX_LINE_CHARS {
        return line.to_string();
    }
    let mut out: String = line
        .chars()
        .take(MAX_LINE_CHARS - ELLIPSIS.len())
        .collect();
    out.push_str(ELLIPSIS);
    out
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
/// Both sides are expected to be lowercased already.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    memmem::find_iter(haystack.as_bytes(), needle.as_bytes()).count()
}
