//! HTTPS POST boundary.
//!
//! The gateway core only depends on the [`Transport`] trait; the blocking
//! reqwest implementation below is the default collaborator. Timeouts and
//! retries are entirely the transport's concern; the dispatcher performs a
//! single POST per call.

use bytes::Bytes;

/// A raw reply from the remote endpoint.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status_code: u16,
    pub response: Bytes,
}

/// Network or HTTP-layer failure. A non-2xx status still carries the
/// response body when one could be read, so the dispatcher can parse the
/// provider's structured error payload.
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {reason}")]
pub struct TransportError {
    pub status_code: Option<u16>,
    pub body: Option<Bytes>,
    pub reason: String,
}

impl TransportError {
    pub fn network(reason: impl Into<String>) -> Self {
        Self {
            status_code: None,
            body: None,
            reason: reason.into(),
        }
    }
}

/// Blocking HTTPS POST primitive consumed by the dispatcher.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: &str,
        body: &[u8],
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}

/// Default transport backed by `reqwest`'s blocking client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    fn post(
        &self,
        url: &str,
        body: &[u8],
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(url).body(body.to_vec());
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .map_err(|err| TransportError::network(err.to_string()))?;

        let status_code = response.status().as_u16();
        let bytes = response.bytes().map_err(|err| TransportError {
            status_code: Some(status_code),
            body: None,
            reason: err.to_string(),
        })?;

        if (200..300).contains(&status_code) {
            Ok(TransportResponse {
                status_code,
                response: bytes,
            })
        } else {
            Err(TransportError {
                status_code: Some(status_code),
                body: Some(bytes),
                reason: format!("http status {status_code}"),
            })
        }
    }
}
