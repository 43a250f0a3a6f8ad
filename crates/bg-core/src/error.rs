//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `BgError` as one variant
//! via `#[from]`.

use thiserror::Error;

/// The base error type shared by all `bg-*` crates.
#[derive(Debug, Error)]
pub enum BgError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `bg-core`.
pub type BgResult<T> = Result<T, BgError>;
