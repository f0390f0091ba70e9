use std::{fs::read_to_string, path::PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// File extension matched when scanning the input directory, without the dot.
pub const DEFAULT_EXTENSION: &str = "asc";

/// A file's header runs up to and including the line starting with this token
/// sequence, compared case-insensitively on the stripped line.
pub const DEFAULT_MARKER: &str = "base hex";

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

// Input-format conventions: which files to pick up and where each file's
// header ends. The defaults describe Vector ASC logs.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatSpec {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for FormatSpec {
    fn default() -> Self {
        FormatSpec {
            extension: default_extension(),
            marker: default_marker(),
        }
    }
}

impl FormatSpec {
    pub fn validate(self) -> Result<Self> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(Error::ConfigInvalid(format!(
                "extension must be non-empty with no leading dot, got {:?}",
                self.extension
            )));
        }
        if self.marker.trim().is_empty() {
            return Err(Error::ConfigInvalid("marker must not be blank".to_string()));
        }

        Ok(self)
    }

    pub fn with_path(fpath: &PathBuf) -> Result<FormatSpec> {
        let dat = read_to_string(fpath)?;
        Self::with_data(&dat)
    }

    fn with_data(dat: &str) -> Result<FormatSpec> {
        let spec: FormatSpec = serde_yaml::from_str(dat)?;
        spec.validate()
    }
}
