use super::loader::AffiliationRecord;
use std::{collections::BTreeSet, fmt};

pub const COUNTRY_SEPARATOR: &str = ", ";

/// Deduplicated country names found in one affiliation record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySet(BTreeSet<String>);

impl CountrySet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for CountrySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CountrySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(COUNTRY_SEPARATOR);
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    pub row: usize,
    pub countries: CountrySet,
}

/// The last comma-separated field of every `;`-separated affiliation, trimmed.
pub fn extract_countries(affiliations: &str) -> CountrySet {
    affiliations
        .split(';')
        .filter_map(|affiliation| affiliation.split(',').last())
        .map(str::trim)
        .filter(|country| !country.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn add_countries_column(records: Vec<AffiliationRecord>) -> Vec<CountryRecord> {
    records
        .into_iter()
        .filter_map(|record| {
            let affiliations = record.affiliations?;
            let countries = extract_countries(&affiliations);
            match countries.is_empty() {
                true => tracing::debug!("No country candidates in row {}", record.row),
                false => tracing::trace!("Row {} countries: {}", record.row, countries),
            }

            Some(CountryRecord {
                row: record.row,
                countries,
            })
        })
        .collect()
}

pub fn normalize_country_name(country: &str) -> String {
    country.replace("United States", "United States of America")
}

pub fn clean_countries(records: Vec<CountryRecord>) -> Vec<CountryRecord> {
    records
        .into_iter()
        .map(|record| {
            let countries = record
                .countries
                .iter()
                .map(|country| {
                    let normalized = normalize_country_name(country);
                    if normalized != country {
                        tracing::trace!("Row {}: renamed {} to {}", record.row, country, normalized);
                    }
                    normalized
                })
                .collect();

            CountryRecord {
                row: record.row,
                countries,
            }
        })
        .collect()
}
