// Roster and review-artifact import

use std::io::Read;
use std::path::Path;

use permitscreen_engine::config::ColumnMapping;
use permitscreen_engine::model::FacilityRecord;
use permitscreen_engine::roster::load_roster_with_delimiter;
use permitscreen_engine::{ReviewMap, ScreenError};

/// Import a roster file: decode, sniff the delimiter, parse.
pub fn import_roster(path: &Path, columns: &ColumnMapping) -> Result<Vec<FacilityRecord>, ScreenError> {
    let content = read_file_as_utf8(path)
        .map_err(|e| ScreenError::Io(format!("{}: {e}", path.display())))?;
    let delimiter = sniff_delimiter(&content);
    load_roster_with_delimiter(&content, columns, delimiter)
}

/// Import the hand-curated review mapping. Always comma-delimited; a
/// malformed decision row is fatal, not a warning.
pub fn import_review(path: &Path) -> Result<ReviewMap, ScreenError> {
    let content = read_file_as_utf8(path)
        .map_err(|e| ScreenError::Io(format!("{}: {e}", path.display())))?;
    ReviewMap::from_csv(&content)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for agency-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
