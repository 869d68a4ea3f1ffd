use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Libsql(#[from] libsql::Error),
    #[error("{0} returned no row")]
    MissingRow(&'static str),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error! status: {status}: {body}")]
    Status { status: u16, body: String },
}
