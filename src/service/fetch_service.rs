use crate::prelude::*;
use anyhow::anyhow;
use reqwest::Client;
use serde_json::Value;

pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    tracing::info!("Fetching {}", url);
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        let err = format!("Non-success response from {}: {}", url, response.status());
        tracing::error!(err);
        return Err(anyhow!(err));
    }

    let text = response.text().await?;
    tracing::debug!("Fetched {} bytes from {}", text.len(), url);

    Ok(text)
}

pub async fn fetch_json(client: &Client, url: &str) -> Result<Value> {
    let text = fetch_text(client, url).await?;
    match serde_json::from_str(&text) {
        Ok(json) => Ok(json),
        Err(e) => {
            let err = format!("Failed to parse JSON from {}: {}", url, e);
            tracing::error!(err);
            Err(anyhow!(err))
        }
    }
}
