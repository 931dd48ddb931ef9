//! Data handed to a unit alongside the façade.
//!
//! The payload is assembled from an optional parameter file; file metadata comes from an optional info file.
//! Both files are JSON and are read once, before the run starts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use harness_core::defaults::{self, user};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HarnessError, HarnessResult};

/// Parameter file looked up in the working directory when `--params` is not given.
pub const DEFAULT_PARAMS_FILE: &str = "parameters.json";

/// Identity of the user a unit runs on behalf of.
///
/// Passed through as given: known fields missing from the parameter file are empty, and unknown keys are kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub locale: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            first_name: user::FIRST_NAME.to_string(),
            last_name: user::LAST_NAME.to_string(),
            user_id: user::USER_ID.to_string(),
            locale: user::LOCALE.to_string(),
            extra: Map::new(),
        }
    }
}

/// Data passed verbatim to the unit's entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub integrations: Value,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub user_data: UserData,
    #[serde(default, rename = "flightprocessing", skip_serializing_if = "Option::is_none")]
    pub flight_processing: Option<Value>,
}

impl Payload {
    /// Parse a parameter document. A missing or `null` `user_data` falls back to the placeholder identity.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            integrations: Value,
            #[serde(default)]
            parameters: Value,
            #[serde(default)]
            user_data: Option<UserData>,
            #[serde(default)]
            flightprocessing: Option<Value>,
        }

        let raw: Raw = serde_json::from_value(value)?;
        Ok(Self {
            integrations: raw.integrations,
            parameters: raw.parameters,
            user_data: raw.user_data.unwrap_or_default(),
            flight_processing: raw.flightprocessing,
        })
    }
}

/// Descriptive metadata for one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub file_type: Option<i64>,
    #[serde(default)]
    pub file_tags: Option<Vec<String>>,
}

/// Read-only metadata keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileInfoMap(HashMap<String, FileInfo>);

impl FileInfoMap {
    pub fn new(entries: HashMap<String, FileInfo>) -> Self {
        Self(entries)
    }

    pub fn get(&self, file_name: &str) -> Option<&FileInfo> {
        self.0.get(file_name)
    }

    /// Type code for `file_name`, or the default when the map has none.
    pub fn file_type(&self, file_name: &str) -> i64 {
        self.get(file_name)
            .and_then(|info| info.file_type)
            .unwrap_or(defaults::DEFAULT_FILE_TYPE)
    }

    /// Tags for `file_name`, or the placeholder set when the map has none.
    pub fn file_tags(&self, file_name: &str) -> Vec<String> {
        self.get(file_name)
            .and_then(|info| info.file_tags.clone())
            .unwrap_or_else(|| defaults::DEFAULT_FILE_TAGS.iter().map(|t| t.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Load the payload.
///
/// An explicit `params` path must exist. Without one, `parameters.json` in `cwd` is used when present, and the
/// placeholder payload otherwise.
pub fn load_payload(params: Option<&Path>, cwd: &Path) -> HarnessResult<Payload> {
    let path = match params {
        Some(path) => {
            require_file(path)?;
            path.to_path_buf()
        }
        None => {
            let fallback = cwd.join(DEFAULT_PARAMS_FILE);
            if !fallback.is_file() {
                tracing::debug!(path = %fallback.display(), "no parameter file; using placeholder payload");
                return Ok(Payload::default());
            }
            fallback
        }
    };

    let value: Value = read_json(&path)?;
    Payload::from_json(value).map_err(|source| HarnessError::InvalidParameters { path, source })
}

/// Load the file info map from `--info`, or an empty map when none was given.
pub fn load_file_info(info: Option<&Path>) -> HarnessResult<FileInfoMap> {
    match info {
        Some(path) => {
            require_file(path)?;
            read_json(path)
        }
        None => Ok(FileInfoMap::default()),
    }
}

fn require_file(path: &Path) -> HarnessResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(HarnessError::MissingFile {
            path: path.to_path_buf(),
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> HarnessResult<T> {
    let text = fs::read_to_string(path).map_err(|e| HarnessError::io(format!("reading {}", path.display()), e))?;
    serde_json::from_str(&text).map_err(|source| HarnessError::InvalidJson {
        path: PathBuf::from(path),
        source,
    })
}
