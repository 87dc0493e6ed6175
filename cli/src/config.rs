use std::path::{Path, PathBuf};

use job_scraper::{sources::default_sources, FetchError, Keywords, ParseError, Source};
use report::WriteError;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read '{}': {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid json in '{}': {source}", .path.display())]
    ConfigJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Source setup failed: {0}")]
    Source(#[from] ParseError),
    #[error("Failed to build http client: {0}")]
    Client(#[from] FetchError),
    #[error("Could not write output: {0}")]
    Write(#[from] WriteError),
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let data = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| Error::ConfigJson {
        path: path.to_owned(),
        source,
    })
}

pub fn load_sources(path: Option<&Path>) -> Result<Vec<Source>, Error> {
    match path {
        Some(path) => {
            let sources: Vec<Source> = load_json(path)?;
            log::info!("loaded {} sources from {}", sources.len(), path.display());
            Ok(sources)
        }
        None => Ok(default_sources()),
    }
}

pub fn load_keywords(path: Option<&Path>) -> Result<Keywords, Error> {
    match path {
        Some(path) => load_json(path),
        None => Ok(Keywords::default()),
    }
}
