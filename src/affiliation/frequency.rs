use super::countries::CountryRecord;
use crate::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub countries: String,
    pub count: u64,
}

/// Publications per country, highest count first, ties by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFrequency {
    counts: Vec<CountryCount>,
}

impl CountryFrequency {
    pub fn from_counts(counts: HashMap<String, u64>) -> Self {
        let counts = counts
            .into_iter()
            .map(|(countries, count)| CountryCount { countries, count })
            .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.countries.cmp(&b.countries)))
            .collect();

        Self { counts }
    }

    pub fn counts(&self) -> &[CountryCount] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn to_map(&self) -> HashMap<&str, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.countries.as_str(), entry.count))
            .collect()
    }

    pub fn min_max(&self) -> Option<(u64, u64)> {
        self.counts
            .iter()
            .map(|entry| entry.count)
            .minmax()
            .into_option()
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in &self.counts {
            writer.serialize(entry)?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} countries to {}", self.counts.len(), path.display());

        Ok(())
    }
}

pub fn count_country_frequency(records: &[CountryRecord]) -> CountryFrequency {
    // Sets hold each country once per record, so this counts records, not mentions.
    let counts = records
        .iter()
        .flat_map(|record| record.countries.iter())
        .counts()
        .into_iter()
        .map(|(country, count)| (country.to_string(), count as u64))
        .collect();

    let frequency = CountryFrequency::from_counts(counts);
    tracing::info!(
        "Counted {} distinct countries across {} records",
        frequency.len(),
        records.len()
    );

    frequency
}
