use crate::config::AppConfig;
use crate::model::{CLASS_LABELS, InferenceError, Model};
use crate::recommendations;
use actix_files::Files;
use actix_multipart::{Multipart, MultipartError};
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use futures::TryStreamExt;
use log::{error, info};
use shared::{
    Diagnosis, HealthResponse, PredictionResponse, PredictionResult, RecommendationsResponse,
    ServiceInfo,
};

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("No image file uploaded")]
    MissingFile,
    #[error("Upload exceeds {0} bytes")]
    TooLarge(usize),
    #[error("{0}")]
    Multipart(#[from] MultipartError),
    #[error("{0}")]
    Inference(#[from] InferenceError),
    #[error("Inference worker failed")]
    Blocking(#[from] BlockingError),
    #[error("No recommendation for {0}")]
    NoRecommendation(Diagnosis),
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::Inference(InferenceError::NotLoaded) => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::MissingFile | PredictError::Multipart(_) => StatusCode::BAD_REQUEST,
            PredictError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(PredictionResponse::failure(self.to_string()))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<String>) {
    cfg.service(web::resource("/").route(web::get().to(root)))
        .service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/predict").route(web::post().to(predict_deficiency)))
        .service(web::resource("/recommendations").route(web::get().to(get_all_recommendations)));

    if let Some(frontend_dir) = frontend_dir {
        cfg.service(Files::new("/static", frontend_dir).index_file("index.html"));
    }
}

async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo {
        message: "Chili Nutrient Deficiency Detection API".to_string(),
        status: "running".to_string(),
    })
}

async fn health_check(model: web::Data<Model>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: model.is_loaded(),
    })
}

async fn get_all_recommendations() -> HttpResponse {
    HttpResponse::Ok().json(RecommendationsResponse {
        success: true,
        recommendations: recommendations::catalog()
            .iter()
            .map(|(diagnosis, recommendation)| (diagnosis.to_string(), recommendation.clone()))
            .collect(),
    })
}

const FILE_FIELD: &str = "file";

/// Collects the first non-empty `file` upload in the form.
async fn read_image(payload: &mut Multipart, limit: usize) -> Result<Vec<u8>, PredictError> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let mut image_data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if image_data.len() + chunk.len() > limit {
                return Err(PredictError::TooLarge(limit));
            }
            image_data.extend_from_slice(&chunk);
        }
        if !image_data.is_empty() {
            return Ok(image_data);
        }
    }
    Err(PredictError::MissingFile)
}

async fn predict_deficiency(
    model: web::Data<Model>,
    config: web::Data<AppConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, PredictError> {
    if !model.is_loaded() {
        return Err(InferenceError::NotLoaded.into());
    }

    let image_data = read_image(&mut payload, config.max_upload_bytes).await?;
    info!("Received image of {} bytes", image_data.len());

    let worker = model.get_ref().clone();
    let scores = web::block(move || worker.inference(&image_data))
        .await?
        .inspect_err(|e| error!("Model inference error: {}", e))?;

    let (prediction, confidence) = model.calculate_result(&scores);
    let recommendation = recommendations::recommendation_for(prediction)
        .cloned()
        .ok_or(PredictError::NoRecommendation(prediction))?;
    let class_probabilities = CLASS_LABELS
        .iter()
        .zip(&scores)
        .map(|(label, score)| (label.to_string(), f64::from(*score)))
        .collect();

    info!("Predicted {} with confidence {:.3}", prediction, confidence);

    Ok(HttpResponse::Ok().json(PredictionResponse::success(PredictionResult {
        prediction,
        confidence: f64::from(confidence),
        class_probabilities,
        recommendation,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{FixedClassifier, png_bytes};
    use actix_web::{App, http::header, test};
    use shared::Severity;
    use std::sync::Arc;

    const BOUNDARY: &str = "leafboundary";

    fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(bytes: &[u8]) -> test::TestRequest {
        upload_as("file", bytes)
    }

    fn upload_as(field: &str, bytes: &[u8]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/predict")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(field, "leaf.png", bytes))
    }

    fn phosphorus_model() -> Model {
        Model::new(Arc::new(FixedClassifier(vec![
            0.05, 0.02, 0.03, 0.1, 0.7, 0.1,
        ])))
    }

    macro_rules! app {
        ($model:expr, $config:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($model))
                    .app_data(web::Data::new($config))
                    .configure(|cfg| configure_routes(cfg, None)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn predict_returns_diagnosis_with_recommendation() {
        let app = app!(phosphorus_model(), AppConfig::default());

        let resp = test::call_service(&app, upload(&png_bytes()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PredictionResponse = test::read_body_json(resp).await;
        let result = body.into_result().unwrap();
        assert_eq!(result.prediction, Diagnosis::Phosphorus);
        assert!((result.confidence - 0.7).abs() < 1e-6);
        assert_eq!(result.recommendation.severity, Severity::Moderate);
        assert_eq!(
            result.recommendation.organic_fertilizer,
            "Bone meal, Banana peel powder"
        );
        assert_eq!(result.recommendation.color.as_deref(), Some("purple"));
        assert_eq!(result.class_probabilities.len(), 6);
        assert!((result.class_probabilities["healthy"] - 0.02).abs() < 1e-6);
    }

    #[actix_web::test]
    async fn predict_without_model_is_unavailable() {
        let app = app!(Model::unloaded(), AppConfig::default());

        let resp = test::call_service(&app, upload(&png_bytes()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: PredictionResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Model not loaded"));
    }

    #[actix_web::test]
    async fn undecodable_upload_reports_failure() {
        let app = app!(phosphorus_model(), AppConfig::default());

        let resp = test::call_service(&app, upload(b"plain text, not pixels").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: PredictionResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert!(body.error.is_some());
    }

    #[actix_web::test]
    async fn oversized_upload_is_refused() {
        let config = AppConfig {
            max_upload_bytes: 16,
            ..AppConfig::default()
        };
        let app = app!(phosphorus_model(), config);

        let resp = test::call_service(&app, upload(&png_bytes()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn empty_upload_is_a_bad_request() {
        let app = app!(phosphorus_model(), AppConfig::default());

        let resp = test::call_service(&app, upload(b"").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn upload_under_another_field_name_is_a_bad_request() {
        let app = app!(phosphorus_model(), AppConfig::default());

        let resp = test::call_service(&app, upload_as("image", &png_bytes()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: PredictionResponse = test::read_body_json(resp).await;
        assert_eq!(body.error.as_deref(), Some("No image file uploaded"));
    }

    #[actix_web::test]
    async fn health_reports_model_state() {
        let app = app!(Model::unloaded(), AppConfig::default());

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
        assert!(!body.model_loaded);
    }

    #[actix_web::test]
    async fn recommendations_lists_the_catalog() {
        let app = app!(Model::unloaded(), AppConfig::default());

        let req = test::TestRequest::get().uri("/recommendations").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: RecommendationsResponse = test::read_body_json(resp).await;
        assert!(body.success);
        assert_eq!(body.recommendations.len(), 7);
        assert_eq!(
            body.recommendations["healthy"].severity,
            Severity::None
        );
    }
}
