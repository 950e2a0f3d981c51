use crate::prelude::*;
use anyhow::anyhow;
use std::{fs::create_dir_all, path::{Path, PathBuf}};

pub const COUNTRIES_CSV: &str = "countries.csv";
pub const MAP_HTML: &str = "map.html";

pub async fn create_output_dir(output_dir: &str) -> Result<PathBuf> {
    let output_path = Path::new(output_dir);
    if output_path.is_file() {
        let err = format!("Output path {} exists and is not a directory", output_dir);
        tracing::error!(err);
        return Err(anyhow!(err));
    }

    if !output_path.exists() {
        tracing::info!("Creating output directory {}", output_dir);
    }
    create_dir_all(output_path)?;

    Ok(output_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_directory_idempotently() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("files").join("output");
        let target_str = target.display().to_string();

        let first = create_output_dir(&target_str).await.unwrap();
        let second = create_output_dir(&target_str).await.unwrap();

        assert!(target.is_dir());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn refuses_a_file_in_the_way() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("output");
        std::fs::write(&file, "").unwrap();

        assert!(create_output_dir(&file.display().to_string()).await.is_err());
    }
}
