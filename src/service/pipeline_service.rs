use crate::affiliation::{
    countries::{add_countries_column, clean_countries},
    filter::remove_na_rows,
    frequency::{count_country_frequency, CountryFrequency},
    loader::{load_affiliations, AffiliationRecord},
};
use crate::prelude::*;
use crate::render::map::plot_world_map;
use crate::service::var_service::Settings;
use crate::util::path_service::{create_output_dir, COUNTRIES_CSV, MAP_HTML};
use reqwest::Client;

pub fn summarize_affiliations(records: Vec<AffiliationRecord>) -> CountryFrequency {
    let records = remove_na_rows(records);
    let records = add_countries_column(records);
    let records = clean_countries(records);

    count_country_frequency(&records)
}

pub async fn make_worldmap(client: &Client, settings: &Settings) -> Result<CountryFrequency> {
    let output_dir = create_output_dir(&settings.output_dir).await?;

    let records =
        load_affiliations(client, &settings.dataset_url, &settings.affiliation_column).await?;
    let frequency = summarize_affiliations(records);

    frequency.write_csv(&output_dir.join(COUNTRIES_CSV))?;
    plot_world_map(
        client,
        &settings.geojson_url,
        &frequency,
        &output_dir.join(MAP_HTML),
    )
    .await?;

    Ok(frequency)
}
