//! JSON decoding that reports where in the document a failure happened.
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A decode failure plus the JSON path it occurred at (`.` for the document root).
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl From<serde_path_to_error::Error<serde_json::Error>> for PathError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        Self { path, message: err.into_inner().to_string() }
    }
}

pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    let value = serde_path_to_error::deserialize(&mut *de)?;
    de.end().map_err(|err| PathError { path: ".".into(), message: err.to_string() })?;
    Ok(value)
}
