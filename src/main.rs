mod affiliation {
    pub mod countries;
    pub mod filter;
    pub mod frequency;
    pub mod loader;
}
mod render {
    pub mod map;
}
mod service {
    pub mod fetch_service;
    pub mod pipeline_service;
    pub mod var_service;
}
mod util {
    pub mod log_service;
    pub mod path_service;
}
mod prelude;

use dotenvy::dotenv;
use prelude::*;
use reqwest::Client;
use service::{
    pipeline_service::make_worldmap,
    var_service::{get_log_level, get_settings},
};
use util::log_service::set_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    set_logging(get_log_level().await?).await?;

    let settings = get_settings().await?;
    let client = Client::new();
    let frequency = make_worldmap(&client, &settings).await?;
    if frequency.is_empty() {
        tracing::warn!("No countries found in {}", settings.dataset_url);
    }
    tracing::info!(
        "Finished with {} countries in {}",
        frequency.len(),
        settings.output_dir
    );

    Ok(())
}
