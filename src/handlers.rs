use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use log::{info, warn};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::Builder;
use uuid::Uuid;

use crate::classifier::Predictor;
use crate::error::ApiError;
use crate::models::HealthResponse;
use crate::preprocess;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub image_size: u32,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/health").route(web::get().to(health)));
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        labels: state.predictor.labels().to_vec(),
    })
}

pub async fn predict(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload_dir = Builder::new().prefix("temp_uploads").tempdir()?;

    // the last part wins
    let mut filepath: Option<PathBuf> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::Upload(e.to_string()))?;
        let path = upload_dir.path().join(format!("{}.upload", Uuid::new_v4()));

        let create_path = path.clone();
        let mut f = web::block(move || File::create(create_path))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ApiError::Upload(e.to_string()))?;
            f = web::block(move || f.write_all(&data).map(|_| f))
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))??;
        }

        filepath = Some(path);
    }

    let filepath = filepath.ok_or_else(|| {
        warn!("predict request without a file");
        ApiError::MissingFile
    })?;

    let predictor = state.predictor.clone();
    let size = state.image_size;
    let result = web::block(move || {
        let img = preprocess::load_image(&filepath)?;
        let tensor = preprocess::to_tensor(&preprocess::letterbox(&img, size));
        predictor.predict(tensor)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| {
        warn!("prediction failed: {}", e);
        e
    })?;

    info!(
        "predicted {} ({:.3})",
        result.predicted_label,
        result.scores.get(&result.predicted_label).copied().unwrap_or_default()
    );

    Ok(HttpResponse::Ok().json(result))
}
