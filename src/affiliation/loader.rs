use crate::prelude::*;
use crate::service::fetch_service::fetch_text;
use anyhow::anyhow;
use reqwest::Client;

/// One row of the source dataset, reduced to its affiliation cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationRecord {
    /// Zero-based row index in the source file.
    pub row: usize,
    pub affiliations: Option<String>,
}

impl AffiliationRecord {
    pub fn new(row: usize, affiliations: Option<&str>) -> Self {
        Self {
            row,
            affiliations: affiliations.map(str::to_string),
        }
    }
}

pub async fn load_affiliations(
    client: &Client,
    url: &str,
    column: &str,
) -> Result<Vec<AffiliationRecord>> {
    let text = fetch_text(client, url).await?;
    let records = parse_affiliations(&text, column)?;
    tracing::info!("Loaded {} rows from {}", records.len(), url);

    Ok(records)
}

pub fn parse_affiliations(csv_text: &str, column: &str) -> Result<Vec<AffiliationRecord>> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    let column_idx = match headers.iter().position(|header| header == column) {
        Some(column_idx) => column_idx,
        None => {
            let err = format!("Column {} not found in dataset headers: {:?}", column, headers);
            tracing::error!(err);
            return Err(anyhow!(err));
        }
    };

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let err = format!("Failed to parse dataset row {}: {}", row, e);
                tracing::error!(err);
                return Err(anyhow!(err));
            }
        };

        records.push(AffiliationRecord::new(row, record.get(column_idx)));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_affiliation_column_in_row_order() {
        let csv_text = "Title,Affiliations,Year\n\
                        First,\"Dept A, Univ B, Chile\",2020\n\
                        Second,,2021\n\
                        Third,\"Lab C, City D, Brazil; Lab E, City F, Chile\",2019\n";

        let records = parse_affiliations(csv_text, "Affiliations").unwrap();

        assert_eq!(
            records,
            vec![
                AffiliationRecord::new(0, Some("Dept A, Univ B, Chile")),
                AffiliationRecord::new(1, Some("")),
                AffiliationRecord::new(
                    2,
                    Some("Lab C, City D, Brazil; Lab E, City F, Chile")
                ),
            ]
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv_text = "Title,Authors\nFirst,Someone\n";

        let err = parse_affiliations(csv_text, "Affiliations").unwrap_err();

        assert!(err.to_string().contains("Affiliations"));
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let csv_text = "Title,Affiliations\nFirst,\"Dept A, Chile\",extra\n";

        assert!(parse_affiliations(csv_text, "Affiliations").is_err());
    }

    #[test]
    fn header_only_file_yields_no_records() {
        let records = parse_affiliations("Affiliations\n", "Affiliations").unwrap();

        assert!(records.is_empty());
    }
}
