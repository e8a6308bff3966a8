use jobradar_core::Source;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The definition's search URL doesn't parse; it is the join base for
    /// relative posting links, so extraction can't start without it.
    #[error("invalid search URL for {board}: {reason}")]
    InvalidBaseUrl { board: Source, reason: String },
}
