use crate::session::PredictionRequest;
use futures::future::{self, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use shared::{HealthResponse, PredictionResponse, PredictionResult, ResponseError};
use wasm_bindgen::JsValue;
use web_sys::FormData;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("no response within {0} ms")]
    Timeout(u32),
    #[error("service answered with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("invalid response: {0}")]
    Invalid(#[from] ResponseError),
}

impl ServiceError {
    /// The `error` text from the service body, when it sent one.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ServiceError::Status { message, .. } => message.as_deref(),
            ServiceError::Invalid(err) => err.service_message(),
            _ => None,
        }
    }
}

/// The remote classifier, as seen by the session controller.
#[allow(async_fn_in_trait)]
pub trait PredictionService {
    async fn predict(&self, request: &PredictionRequest)
    -> Result<PredictionResult, ServiceError>;
}

/// Turns a `/predict` reply into a result. Non-2xx replies keep the
/// service's `error` text when the body carries one.
fn interpret(status: u16, body: &str) -> Result<PredictionResult, ServiceError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<PredictionResponse>(body)
            .ok()
            .and_then(|response| response.error);
        return Err(ServiceError::Status { status, message });
    }

    let response: PredictionResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    Ok(response.into_result()?)
}

fn js_error(err: JsValue) -> ServiceError {
    ServiceError::Transport(format!("{:?}", err))
}

/// Talks to the prediction service over `fetch`.
pub struct HttpPredictionService {
    base_url: String,
    timeout_ms: u32,
}

impl HttpPredictionService {
    pub fn new(base_url: impl Into<String>, timeout_ms: u32) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: &PredictionRequest) -> Result<PredictionResult, ServiceError> {
        let form_data = FormData::new().map_err(js_error)?;
        let blob: web_sys::Blob =
            gloo_file::Blob::new_with_options(request.bytes(), Some(request.media_type())).into();
        form_data
            .append_with_blob_and_filename("file", &blob, request.file_name())
            .map_err(js_error)?;

        let response = Request::post(&self.endpoint("predict"))
            .body(form_data)
            .map_err(|e| ServiceError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        interpret(status, &body)
    }

    pub async fn check_health(&self) -> Result<HealthResponse, ServiceError> {
        let response = Request::get(&self.endpoint("health"))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(ServiceError::Status {
                status: response.status(),
                message: None,
            });
        }

        response
            .json::<HealthResponse>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl PredictionService for HttpPredictionService {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, ServiceError> {
        let send = Box::pin(self.send(request));
        let timeout = Box::pin(TimeoutFuture::new(self.timeout_ms));

        match future::select(send, timeout).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => Err(ServiceError::Timeout(self.timeout_ms)),
        }
    }
}
