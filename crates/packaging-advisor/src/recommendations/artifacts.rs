use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::catalog::CatalogError;
use super::geo::GeoIndexError;

/// Startup failure while loading or cross-checking serving artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {artifact} artifact at {}: {source}", .path.display())]
    Io {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {artifact} artifact: {source}")]
    Json {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Geo(#[from] GeoIndexError),
    #[error("incompatible artifacts: {0}")]
    Incompatible(String),
}

impl ArtifactError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

pub(crate) fn open(artifact: &'static str, path: &Path) -> Result<BufReader<File>, ArtifactError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ArtifactError::Io {
            artifact,
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn read_json<T, R>(artifact: &'static str, reader: R) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
    R: Read,
{
    serde_json::from_reader(reader).map_err(|source| ArtifactError::Json { artifact, source })
}
