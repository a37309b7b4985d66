use thiserror::Error;

mod app_config;
mod catalog;
mod config;
mod filter;
mod platform;
mod pricing;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, CatalogFile, PriceQuote, Product};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{ProductFilter, DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};
pub use platform::{Platform, ParsePlatformError};
pub use pricing::PriceBreakdown;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),
    #[error("catalog validation failed: {0}")]
    Validation(String),
}
