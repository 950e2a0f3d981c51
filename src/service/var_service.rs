use crate::prelude::*;
use anyhow::anyhow;
use std::env::var;
use url::Url;

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/jdvelasq/datalabs/master/datasets/scopus-papers.csv";
pub const DEFAULT_GEOJSON_URL: &str = "https://raw.githubusercontent.com/python-visualization/folium/master/examples/data/world-countries.json";
pub const DEFAULT_AFFILIATION_COLUMN: &str = "Affiliations";
pub const DEFAULT_OUTPUT_DIR: &str = "files/output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dataset_url: String,
    pub geojson_url: String,
    pub affiliation_column: String,
    pub output_dir: String,
}

pub async fn get_settings() -> Result<Settings> {
    Ok(Settings {
        dataset_url: get_dataset_url().await?,
        geojson_url: get_geojson_url().await?,
        affiliation_column: get_affiliation_column().await?,
        output_dir: get_output_dir().await?,
    })
}

pub async fn get_dataset_url() -> Result<String> {
    get_url_var("DATASET_URL", DEFAULT_DATASET_URL)
}

pub async fn get_geojson_url() -> Result<String> {
    get_url_var("GEOJSON_URL", DEFAULT_GEOJSON_URL)
}

pub async fn get_affiliation_column() -> Result<String> {
    Ok(get_var_or_default("AFFILIATION_COLUMN", DEFAULT_AFFILIATION_COLUMN))
}

pub async fn get_output_dir() -> Result<String> {
    Ok(get_var_or_default("OUTPUT_DIR", DEFAULT_OUTPUT_DIR))
}

pub async fn get_log_level() -> Result<tracing::Level> {
    // The subscriber is not installed yet, so nothing here may log.
    match var("LOG_LEVEL") {
        Ok(level) => match level.trim().is_empty() {
            true => Ok(tracing::Level::INFO),
            false => parse_log_level(&level),
        },
        Err(_) => Ok(tracing::Level::INFO),
    }
}

fn get_var_or_default(key: &str, default: &str) -> String {
    match var(key) {
        Ok(value) => match value.trim().is_empty() {
            true => {
                tracing::info!("{} is empty, using {}", key, default);
                default.to_string()
            }
            false => value.trim().to_string(),
        },
        Err(_) => {
            tracing::debug!("{} not found in environment, using {}", key, default);
            default.to_string()
        }
    }
}

fn get_url_var(key: &str, default: &str) -> Result<String> {
    let value = get_var_or_default(key, default);
    validate_url(key, &value)?;

    Ok(value)
}

pub fn validate_url(key: &str, value: &str) -> Result<()> {
    let parsed = match Url::parse(value) {
        Ok(parsed) => parsed,
        Err(e) => {
            let err = format!("Failed to parse {} as a URL: {}", key, e);
            tracing::error!(err);
            return Err(anyhow!(err));
        }
    };

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => {
            let err = format!("{} must be an http(s) URL, got scheme {}", key, scheme);
            tracing::error!(err);
            Err(anyhow!(err))
        }
    }
}

pub fn parse_log_level(level: &str) -> Result<tracing::Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        other => Err(anyhow!("Failed to parse LOG_LEVEL: {}", other)),
    }
}
