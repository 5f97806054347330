use chrono::NaiveDate;

use crate::error::Error;
use crate::report::ReportTable;

/// Serialize a table to CSV bytes: one header record with the column names,
/// then one record per row. Values containing the delimiter or a quote are
/// quoted with internal quotes doubled, so [`from_csv_bytes`] reproduces
/// the table exactly.
pub fn to_csv_bytes(table: &ReportTable) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| Error::Csv(err.into_error().into()))
}

/// Parse CSV bytes produced by [`to_csv_bytes`] back into a table.
pub fn from_csv_bytes(bytes: &[u8]) -> Result<ReportTable, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let columns = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(ReportTable { columns, rows })
}

/// Conventional export file name: `<base>_<YYYY-MM-DD>.csv`.
pub fn report_file_name(base_name: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", base_name, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReportTable {
        ReportTable {
            columns: vec![
                "Object Name".to_string(),
                "Model Name".to_string(),
                "Pset_WallCommon.Manufacturer".to_string(),
            ],
            rows: vec![
                vec![
                    "Wall-01".to_string(),
                    "tower.ifc".to_string(),
                    // Delimiter and quotes in one value.
                    "Acme, \"Premium\"".to_string(),
                ],
                vec!["Wall-02".to_string(), "tower.ifc".to_string(), String::new()],
            ],
        }
    }

    #[test]
    fn round_trip_reproduces_the_table_exactly() {
        let original = table();
        let bytes = to_csv_bytes(&original).unwrap();
        let parsed = from_csv_bytes(&bytes).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn values_with_delimiter_and_quote_are_quoted_and_doubled() {
        let bytes = to_csv_bytes(&table()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Acme, \"\"Premium\"\"\""));
    }

    #[test]
    fn empty_cells_survive_the_round_trip() {
        let bytes = to_csv_bytes(&table()).unwrap();
        let parsed = from_csv_bytes(&bytes).unwrap();
        assert_eq!(parsed.rows[1][2], "");
    }

    #[test]
    fn file_name_follows_the_date_convention() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            report_file_name("IFC_Properties_Report", date),
            "IFC_Properties_Report_2024-03-07.csv"
        );
    }
}
