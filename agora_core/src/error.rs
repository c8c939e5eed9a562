use sea_orm::DbErr;
use thiserror::Error;

/// Failures that stop the process from starting.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to find a data directory on this platform")]
    NoDataDir,

    #[error("missing {0}: set it in the environment or in .env")]
    MissingCredentials(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("config file error")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid json")]
    Json(#[from] serde_json::Error),

    #[error("data store error")]
    Db(#[from] DbErr),
}
