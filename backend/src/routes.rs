use actix_files::{Files, NamedFile};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde_json::Value;
use shared::{Diagnosis, ErrorResponse, PredictionResponse};

use crate::config::ServerConfig;
use crate::ingest::IngestError;
use crate::model::LoadedArtifacts;
use crate::predict::batch::{predict_batch, CsvUpload};
use crate::predict::health::health_report;
use crate::predict::single::predict_single;
use crate::predict::PredictionError;

impl ResponseError for PredictionError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PredictionError::ServiceUnavailable | PredictionError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, config: web::Data<ServerConfig>) {
    let static_dir = config.static_dir.clone();
    cfg.app_data(config)
        .service(
            web::resource("/")
                .route(web::get().to(index))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/predict")
                .route(web::post().to(predict))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/predict_csv")
                .route(web::post().to(predict_csv))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/health")
                .route(web::get().to(health))
                .default_service(web::to(method_not_allowed)),
        )
        .service(Files::new("/static", static_dir))
        .default_service(web::to(not_found));
}

fn log_failure(err: &PredictionError) {
    match err {
        PredictionError::BadRequest(msg) => warn!("Rejected request: {}", msg),
        PredictionError::ServiceUnavailable => error!("Model or scaler not loaded"),
        PredictionError::Internal(msg) => error!("Prediction failed: {}", msg),
    }
}

async fn index(req: HttpRequest, config: web::Data<ServerConfig>) -> HttpResponse {
    let page = config.static_dir.join("index.html");
    match NamedFile::open_async(&page).await {
        Ok(file) => file.into_response(&req),
        Err(e) => {
            warn!("Landing page {} unavailable: {}", page.display(), e);
            not_found().await
        }
    }
}

async fn predict(
    artifacts: web::Data<LoadedArtifacts>,
    body: web::Bytes,
) -> Result<HttpResponse, PredictionError> {
    info!("Received manual prediction request");
    if artifacts.ready().is_none() {
        log_failure(&PredictionError::ServiceUnavailable);
        return Err(PredictionError::ServiceUnavailable);
    }

    let input: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            let err = PredictionError::BadRequest(format!("Invalid JSON payload: {}", e));
            log_failure(&err);
            err
        })?
    };

    let result = predict_single(&artifacts, &input).inspect_err(log_failure)?;
    info!(
        "Final prediction: {} (confidence {:.3})",
        result.diagnosis, result.confidence
    );

    Ok(HttpResponse::Ok().json(PredictionResponse {
        prediction: result.diagnosis,
        confidence: result.confidence,
        status: "success".to_string(),
    }))
}

async fn predict_csv(
    artifacts: web::Data<LoadedArtifacts>,
    config: web::Data<ServerConfig>,
    payload: Multipart,
) -> Result<HttpResponse, PredictionError> {
    info!("Received CSV prediction request");
    if artifacts.ready().is_none() {
        log_failure(&PredictionError::ServiceUnavailable);
        return Err(PredictionError::ServiceUnavailable);
    }

    let upload = read_csv_upload(payload, config.max_upload_bytes)
        .await
        .inspect_err(log_failure)?;
    let outcome = predict_batch(&artifacts, upload.as_ref()).inspect_err(log_failure)?;
    info!(
        "Final results: {} Benign, {} Malignant",
        outcome.count(Diagnosis::Benign),
        outcome.count(Diagnosis::Malignant)
    );

    Ok(HttpResponse::Ok().json(outcome.into_response()))
}

fn upload_error(err: MultipartError) -> PredictionError {
    PredictionError::BadRequest(format!("Error reading uploaded file: {}", err))
}

/// Reads the `file` field of the form; other fields are skipped.
async fn read_csv_upload(
    mut payload: Multipart,
    limit: usize,
) -> Result<Option<CsvUpload>, PredictionError> {
    while let Some(mut field) = payload.try_next().await.map_err(upload_error)? {
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };
        if name.as_deref() != Some("file") {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(upload_error)?;
            if bytes.len() + data.len() > limit {
                return Err(IngestError::TooLarge { limit }.into());
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(Some(CsvUpload {
            filename: filename.unwrap_or_default(),
            bytes,
        }));
    }
    Ok(None)
}

async fn health(artifacts: web::Data<LoadedArtifacts>) -> HttpResponse {
    HttpResponse::Ok().json(health_report(&artifacts))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Endpoint not found".to_string(),
    })
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse {
        error: "Method not allowed".to_string(),
    })
}
