use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// A pre-cache fetch completed with a non-success status. Install treats
    /// this as failure; live fetches pass their statuses through unchanged.
    #[error("request for {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
}

impl FetchError {
    pub fn bad_status(url: &str, status: u16) -> Self {
        FetchError::BadStatus {
            url: url.to_string(),
            status,
        }
    }
}
