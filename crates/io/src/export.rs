// Candidate/retained export

use std::io::Write;
use std::path::PathBuf;

use permitscreen_engine::model::ScreenedFacility;
use permitscreen_engine::ScreenError;

const HEADER: [&str; 8] = [
    "permit_id",
    "name",
    "city",
    "state",
    "obligation",
    "codes",
    "verdict",
    "rule",
];

/// Write screened facilities as comma-delimited text (file or stdout).
pub fn export_screened(
    rows: &[ScreenedFacility],
    out: &Option<PathBuf>,
) -> Result<String, ScreenError> {
    export_screened_with_delimiter(rows, out, b',')
}

/// Write screened facilities as delimited text (file or stdout). Evidence
/// columns use the display forms: codes joined with `;` (or `NO_MATCH`),
/// verdict and rule in snake_case. Returns the output label for progress
/// messages.
pub fn export_screened_with_delimiter(
    rows: &[ScreenedFacility],
    out: &Option<PathBuf>,
    delimiter: u8,
) -> Result<String, ScreenError> {
    let out_label = out
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());

    let writer: Box<dyn Write> = match out {
        Some(path) => {
            let f = std::fs::File::create(path)
                .map_err(|e| ScreenError::Io(format!("cannot create {}: {e}", path.display())))?;
            Box::new(std::io::BufWriter::new(f))
        }
        None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    // Always write the header, even with zero rows
    csv_writer
        .write_record(HEADER)
        .map_err(|e| ScreenError::Io(format!("CSV write error: {e}")))?;

    for row in rows {
        csv_writer
            .write_record([
                row.record.permit_id.as_str(),
                row.record.name.as_str(),
                row.record.city.as_str(),
                row.record.state.as_str(),
                row.record.obligation.as_str(),
                &row.codes.to_string(),
                &row.verdict.to_string(),
                &row.rule.to_string(),
            ])
            .map_err(|e| ScreenError::Io(format!("CSV write error: {e}")))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ScreenError::Io(format!("CSV flush error: {e}")))?;

    Ok(out_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use permitscreen_engine::model::{CodeSet, FacilityRecord, RuleTag, Verdict};
    use std::fs;
    use tempfile::tempdir;

    fn candidate() -> ScreenedFacility {
        ScreenedFacility {
            record: FacilityRecord {
                permit_id: "TX0125709".into(),
                name: "AUSTIN COUNTY WSC PLANT 3".into(),
                city: "SEALY".into(),
                state: "TX".into(),
                obligation: "A POTW that serves 10,000 people or more".into(),
            },
            codes: CodeSet::Codes(vec!["4941".into(), "4941".into()]),
            verdict: Verdict::OtherSystem,
            rule: RuleTag::RemovalCode,
        }
    }

    #[test]
    fn exports_evidence_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        export_screened(&[candidate()], &Some(path.clone())).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "permit_id,name,city,state,obligation,codes,verdict,rule",
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("TX0125709,"));
        assert!(row.contains("4941;4941"));
        assert!(row.contains("other_system"));
        assert!(row.ends_with("removal_code"));
        // The embedded comma forces quoting of the obligation field.
        assert!(row.contains("\"A POTW that serves 10,000 people or more\""));
    }

    #[test]
    fn no_match_codes_export_as_sentinel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut row = candidate();
        row.codes = CodeSet::NoMatch;
        row.verdict = Verdict::OtherSystem;
        row.rule = RuleTag::NoMatchDefault;
        export_screened(&[row], &Some(path.clone())).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("NO_MATCH"));
        assert!(content.contains("no_match_default"));
    }

    #[test]
    fn tab_delimited_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candidates.tsv");
        export_screened_with_delimiter(&[candidate()], &Some(path.clone()), b'\t').unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("permit_id\tname\tcity"));
        // Embedded comma needs no quoting under a tab delimiter.
        assert!(content.contains("\tA POTW that serves 10,000 people or more\t"));
    }

    #[test]
    fn empty_export_still_writes_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_screened(&[], &Some(path.clone())).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "permit_id,name,city,state,obligation,codes,verdict,rule",
        );
    }
}
