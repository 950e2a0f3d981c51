use crate::prelude::*;
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub async fn set_logging(level: tracing::Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(LevelFilter::from_level(level)))
        .try_init()?;

    tracing::debug!("Logging at {}", level);

    Ok(())
}
