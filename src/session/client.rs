//! Prediction service client.
//!
//! [`PredictionService`] is the seam between the session controller and
//! the external service. [`HttpPredictionService`] is the real transport:
//! it POSTs the request as JSON and validates the reply into a
//! [`SimulationResult`].

use std::future::Future;
use std::time::Duration;

use crate::error::{ViewerError, ViewerResult};
use crate::orbit::units::SimulationRequest;
use crate::orbit::{PredictionResponse, SimulationResult};

/// Source of trajectory pairs for a physical-state request.
pub trait PredictionService {
    /// Predict both trajectories for a request.
    fn predict(
        &self,
        request: &SimulationRequest,
    ) -> impl Future<Output = ViewerResult<SimulationResult>>;
}

/// Prediction service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPredictionService {
    /// Create a client for an endpoint URL.
    ///
    /// `timeout` bounds the whole exchange at the transport level.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ViewerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViewerError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PredictionService for HttpPredictionService {
    async fn predict(&self, request: &SimulationRequest) -> ViewerResult<SimulationResult> {
        tracing::debug!(endpoint = %self.endpoint, ?request, "sending prediction request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ViewerError::Network(format!("request timed out: {e}"))
                } else {
                    ViewerError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ViewerError::Network(e.to_string()))?;
        decode_response(&body)
    }
}

/// Decode and validate a response body.
///
/// # Errors
///
/// - `MalformedResponse` if the body is not the expected JSON shape
/// - `UnequalTrajectoryLengths` if the paths differ in length
pub fn decode_response(body: &[u8]) -> ViewerResult<SimulationResult> {
    let response: PredictionResponse =
        serde_json::from_slice(body).map_err(|e| ViewerError::malformed(e.to_string()))?;
    SimulationResult::try_from(response)
}
