//! Face detection and embedding extraction boundary.
//!
//! Extraction is an opaque external capability: image bytes go in, zero
//! or more fixed-length embeddings come out. The production
//! implementation talks to an extractor sidecar over HTTP; tests plug in
//! synthetic encoders.

use async_trait::async_trait;
use castmatch_store::{EMBEDDING_DIM, Embedding};
use serde::Deserialize;
use tracing::debug;

use crate::error::{RecognitionError, Result};

/// Produces face embeddings from encoded image bytes.
///
/// One embedding per detected face; an image with no faces yields an
/// empty vector, which is not an error.
#[async_trait]
pub trait FaceEncoder: Send + Sync {
    /// Extract embeddings for every face detected in the image.
    async fn encode(&self, image: &[u8]) -> Result<Vec<Embedding>>;
}

/// HTTP client for a face-extractor sidecar.
///
/// Posts the raw image to `{base_url}/encodings` and expects a JSON body
/// of the form `{"embeddings": [[f64; 128], ...]}`.
pub struct HttpFaceEncoder {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFaceEncoder {
    /// Create a client against the given sidecar base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

/// Sidecar response format.
#[derive(Debug, Deserialize)]
struct EncodingsResponse {
    embeddings: Vec<Embedding>,
}

#[async_trait]
impl FaceEncoder for HttpFaceEncoder {
    async fn encode(&self, image: &[u8]) -> Result<Vec<Embedding>> {
        let response = self
            .client
            .post(format!("{}/encodings", self.base_url))
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Encoder(format!(
                "extractor returned {status}: {body}"
            )));
        }

        let result: EncodingsResponse = response.json().await?;

        for embedding in &result.embeddings {
            if embedding.len() != EMBEDDING_DIM {
                return Err(RecognitionError::Encoder(format!(
                    "expected {EMBEDDING_DIM}-dimensional embedding, got {}",
                    embedding.len()
                )));
            }
        }

        debug!("Extractor found {} face(s)", result.embeddings.len());
        Ok(result.embeddings)
    }
}
