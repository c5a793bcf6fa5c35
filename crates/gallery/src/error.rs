use booth_store::StoreError;

/// Errors surfaced to the gallery UI.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// Entered PIN does not match the configured admin PIN.
    #[error("PIN INVALID")]
    InvalidPin,

    /// The item has no session folder to place a video in.
    #[error("Session data incomplete for item {0}")]
    MissingSession(String),

    /// The item does not reference an original photo.
    #[error("Item {0} has no original photo")]
    MissingOriginal(String),

    #[error("Item {0} not found")]
    NotFound(String),

    /// A regeneration is already in flight.
    #[error("A regeneration is already in progress")]
    Busy,

    /// The store or API refused the operation; carries its message.
    #[error("{0}")]
    Backend(String),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl From<StoreError> for GalleryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(msg) => GalleryError::Backend(msg),
            StoreError::Request(e) => GalleryError::Request(e),
            other => GalleryError::Backend(other.to_string()),
        }
    }
}
