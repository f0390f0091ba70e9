use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("input directory {0:?} does not exist or is not a directory")]
    InputDir(PathBuf),

    #[error("no *.{extension} files found in {dir:?}")]
    NoInputs { dir: PathBuf, extension: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Format spec invalid: {0}")]
    ConfigInvalid(String),
    #[error("Failed to load format spec: {}", .source)]
    ConfigLoad {
        #[from]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
