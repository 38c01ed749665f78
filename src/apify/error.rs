/// Failure talking to the upstream platform.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure or an undecodable body.
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    /// The upstream answered without a field the next call depends on.
    #[error("upstream response is missing {0}")]
    MissingField(&'static str),
}

impl UpstreamError {
    /// HTTP status reported by the upstream, if it got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Http(e) => e.status().map(|s| s.as_u16()),
            UpstreamError::InvalidUrl(_) | UpstreamError::MissingField(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }
}
