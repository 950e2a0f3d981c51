use super::loader::AffiliationRecord;

// Cells the source dataset's tooling reads as missing.
const NA_MARKERS: [&str; 18] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN", "#N/A N/A",
];

pub fn is_missing(affiliations: Option<&str>) -> bool {
    match affiliations {
        Some(text) => {
            let text = text.trim();
            text.is_empty() || NA_MARKERS.contains(&text)
        }
        None => true,
    }
}

pub fn remove_na_rows(records: Vec<AffiliationRecord>) -> Vec<AffiliationRecord> {
    let total = records.len();
    let kept: Vec<AffiliationRecord> = records
        .into_iter()
        .filter(|record| {
            let missing = is_missing(record.affiliations.as_deref());
            if missing {
                tracing::debug!("Dropping row {} with missing affiliations", record.row);
            }
            !missing
        })
        .collect();

    tracing::info!("Kept {} of {} rows with affiliations", kept.len(), total);

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_missing_rows_and_preserves_order() {
        let records = vec![
            AffiliationRecord::new(0, Some("Dept A, Chile")),
            AffiliationRecord::new(1, None),
            AffiliationRecord::new(2, Some("   ")),
            AffiliationRecord::new(3, Some("NaN")),
            AffiliationRecord::new(4, Some("Dept B, Peru")),
        ];

        let kept = remove_na_rows(records);

        assert_eq!(
            kept.iter().map(|record| record.row).collect::<Vec<_>>(),
            vec![0, 4]
        );
    }

    #[test]
    fn marker_text_inside_an_affiliation_is_kept() {
        assert!(!is_missing(Some("NA Lab, Nairobi, Kenya")));
        assert!(is_missing(Some(" NA ")));
        assert!(is_missing(None));
    }
}
