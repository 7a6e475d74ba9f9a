//! Where stack dumps come from.
//!
//! A dump is read either from a local file or fetched over HTTP. The parser
//! only sees a `BufRead`, so it does not care which.

pub mod http;

pub use http::DumpClient;

use crate::utils::error::SourceError;
use log::info;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// A readable stack dump location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    /// Build a source from the mutually exclusive `-f` / `-u` options
    ///
    /// # Errors
    /// * `SourceError::Usage` - both or neither given, or URL scheme is not http(s)
    pub fn from_args(file: Option<PathBuf>, url: Option<String>) -> Result<Self, SourceError> {
        match (file, url) {
            (Some(_), Some(_)) => Err(SourceError::Usage(
                "only one of a file and a URL may be given".to_string(),
            )),
            (None, None) => Err(SourceError::Usage(
                "a file or a URL is required".to_string(),
            )),
            (Some(path), None) => {
                if path.as_os_str().is_empty() {
                    return Err(SourceError::Usage("file path is empty".to_string()));
                }
                Ok(Self::File(path))
            }
            (None, Some(url)) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(SourceError::Usage(
                        "URL must start with http:// or https://".to_string(),
                    ));
                }
                Ok(Self::Url(url))
            }
        }
    }

    /// Open the dump for line-by-line reading
    ///
    /// The caller owns the stream; dropping it closes the file or connection.
    pub fn open(&self) -> Result<Box<dyn BufRead>, SourceError> {
        match self {
            Self::File(path) => {
                info!("Reading stack dump from: {}", path.display());
                let file = File::open(path).map_err(|source| SourceError::Open {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Url(url) => {
                let response = DumpClient::new()?.fetch(url)?;
                Ok(Box::new(BufReader::new(response)))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}
