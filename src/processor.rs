use crate::extensions::matches_extension;
use crate::record::{MatchRecord, count_occurrences};
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Scans one file's lines for `needle_lower`.
///
/// `\n`, `\r\n` and a lone `\r` each end a line. Bytes are decoded
/// leniently: invalid UTF-8 becomes U+FFFD instead of failing the file. A
/// read error part way through keeps the matches gathered so far; only a
/// failure to open is reported.
pub fn search_file(path: &Path, needle_lower: &str) -> io::Result<Vec<MatchRecord>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut matches = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read error in {} after line {line_number}: {e}", path.display());
                break;
            }
        }

        for raw in chunk_lines(&buf) {
            line_number += 1;
            let line = String::from_utf8_lossy(raw);
            let occurrences = count_occurrences(&line.to_lowercase(), needle_lower);
            if occurrences > 0 {
                matches.push(MatchRecord::line_match(
                    path.to_path_buf(),
                    line_number,
                    &line,
                    occurrences,
                ));
            }
        }
    }

    Ok(matches)
}

/// Splits one `read_until(b'\n')` chunk into lines without terminators.
/// A `\r\n` pair always ends a chunk, so it never straddles two of them.
fn chunk_lines(chunk: &[u8]) -> Vec<&[u8]> {
    let (body, terminated) = match chunk.strip_suffix(b"\n") {
        Some(rest) => (rest.strip_suffix(b"\r").unwrap_or(rest), true),
        None => (chunk, false),
    };
    let mut lines: Vec<&[u8]> = body.split(|&b| b == b'\r').collect();
    // A `\r` right before end of file does not open another line.
    if !terminated && lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Returns a filename record when the base name contains `needle_lower`.
pub fn match_file_name(path: &Path, needle_lower: &str) -> Option<MatchRecord> {
    let name = path.file_name()?.to_string_lossy();
    let occurrences = count_occurrences(&name.to_lowercase(), needle_lower);
    (occurrences > 0).then(|| MatchRecord::file_name_match(path.to_path_buf(), &name, occurrences))
}

/// Runs both checks for one file. Unreadable files contribute nothing.
pub fn process_file(
    path: &Path,
    needle_lower: &str,
    extensions: &[String],
    include_name_matches: bool,
) -> Vec<MatchRecord> {
    let mut records = Vec::new();

    if include_name_matches {
        records.extend(match_file_name(path, needle_lower));
    }

    let lowered_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if matches_extension(&lowered_name, extensions) {
        match search_file(path, needle_lower) {
            Ok(found) => records.extend(found),
            Err(e) => debug!("Skipping unreadable file {}: {e}", path.display()),
        }
    }

    records
}
