use thiserror::Error;

/// Errors reported to callers of [`Client`](crate::client::Client).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The handler answered with a status code of 400 or above.
    #[error("{status_code}: {body}")]
    Remote { status_code: u16, body: String },

    #[error("encode request body error: {reason}")]
    Encode { reason: String },

    #[error("decode response body error: {reason}")]
    Decode { reason: String },

    /// The client has no transport for the requested calling style.
    #[error("no {style} transport configured")]
    TransportUnavailable { style: &'static str },
}

impl ClientError {
    pub fn remote<S: ToString>(status_code: u16, body: S) -> Self {
        Self::Remote { status_code, body: body.to_string() }
    }

    pub fn encode<S: ToString>(reason: S) -> Self {
        Self::Encode { reason: reason.to_string() }
    }

    pub fn decode<S: ToString>(reason: S) -> Self {
        Self::Decode { reason: reason.to_string() }
    }

    /// Returns the remote status code if this error came from a `>= 400` response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Errors raised while building a [`Client`](crate::client::Client).
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("at least one transport must be set")]
    MissingTransport,

    #[error("format must not be empty")]
    EmptyFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_carries_status_and_body() {
        let error = ClientError::remote(404, "no route");
        assert_eq!(error.status_code(), Some(404));
        assert_eq!(error.to_string(), "404: no route");
        assert_eq!(ClientError::decode("eof").status_code(), None);
    }
}
