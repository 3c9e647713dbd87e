use crate::config::ColumnMapping;
use crate::error::ScreenError;
use crate::model::FacilityRecord;

/// Load roster CSV data into facility records, applying the column mapping.
///
/// Missing mapped columns are fatal. Missing cell values degrade to the
/// empty string — in particular an absent reporting obligation, which the
/// pipeline treats as "does not contain POTW".
pub fn load_roster(csv_data: &str, columns: &ColumnMapping) -> Result<Vec<FacilityRecord>, ScreenError> {
    load_roster_with_delimiter(csv_data, columns, b',')
}

pub fn load_roster_with_delimiter(
    csv_data: &str,
    columns: &ColumnMapping,
    delimiter: u8,
) -> Result<Vec<FacilityRecord>, ScreenError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ScreenError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, ScreenError> {
        headers.iter().position(|h| h == name).ok_or_else(|| ScreenError::MissingColumn {
            table: "roster".into(),
            column: name.into(),
        })
    };

    let permit_id_idx = idx(&columns.permit_id)?;
    let name_idx = idx(&columns.name)?;
    let city_idx = idx(&columns.city)?;
    let state_idx = idx(&columns.state)?;
    let obligation_idx = idx(&columns.obligation)?;

    let mut records = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| ScreenError::CsvParse {
            table: "roster".into(),
            detail: e.to_string(),
        })?;

        let get = |i: usize| record.get(i).unwrap_or("").to_string();

        records.push(FacilityRecord {
            permit_id: get(permit_id_idx),
            name: get(name_idx),
            city: get(city_idx),
            state: get(state_idx),
            obligation: get(obligation_idx),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnMapping {
        ColumnMapping {
            permit_id: "EXTERNAL_PERMIT_NMBR".into(),
            name: "FACILITY_NAME".into(),
            city: "CITY".into(),
            state: "STATE".into(),
            obligation: "REPORTING_OBLIGATION_DESC".into(),
        }
    }

    #[test]
    fn load_basic() {
        let csv = "\
EXTERNAL_PERMIT_NMBR,FACILITY_NAME,CITY,STATE,REPORTING_OBLIGATION_DESC
TX0125709,AUSTIN COUNTY WSC PLANT 3,SEALY,TX,
TX0118362,CITY OF AUSTIN,AUSTIN,TX,\"A POTW that serves 10,000 people or more\"
";
        let records = load_roster(csv, &columns()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].permit_id, "TX0125709");
        assert_eq!(records[0].obligation, "");
        assert_eq!(records[1].city, "AUSTIN");
        assert!(records[1].obligation.contains("POTW"));
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "EXTERNAL_PERMIT_NMBR,FACILITY_NAME,CITY,STATE\nTX1,A,B,TX\n";
        let err = load_roster(csv, &columns()).unwrap_err();
        assert!(err.to_string().contains("REPORTING_OBLIGATION_DESC"));
    }

    #[test]
    fn short_rows_degrade_to_empty_fields() {
        let csv = "\
EXTERNAL_PERMIT_NMBR,FACILITY_NAME,CITY,STATE,REPORTING_OBLIGATION_DESC
TX0000001,SHORT ROW,HOUSTON,TX
";
        let records = load_roster(csv, &columns()).unwrap();
        assert_eq!(records[0].obligation, "");
    }

    #[test]
    fn tab_delimited() {
        let csv = "\
EXTERNAL_PERMIT_NMBR\tFACILITY_NAME\tCITY\tSTATE\tREPORTING_OBLIGATION_DESC
TX0000001\tPLANT\tWACO\tTX\tA POTW
";
        let records = load_roster_with_delimiter(csv, &columns(), b'\t').unwrap();
        assert_eq!(records[0].obligation, "A POTW");
    }
}
