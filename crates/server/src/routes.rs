use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pixelwall_store::prelude::{Pixel, PixelId};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::error::ServiceError;
use crate::service::PixelService;
use crate::validation::{self, CoordinateQuery, ValidationError};

type AppState = Arc<PixelService>;

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct Empty {}

/// Routes of the pixel API, mounted under `/api/pixels`.
pub fn router(service: Arc<PixelService>) -> Router {
    Router::new()
        .route("/api/pixels", get(list_handler))
        .route("/api/pixels/", get(list_handler))
        .route("/api/pixels/pixel", get(get_handler).put(create_handler))
        .route("/api/pixels/pixel/", get(get_handler))
        .route(
            "/api/pixels/pixel/{id}",
            post(update_handler).delete(delete_handler),
        )
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Runs a service call on the blocking pool; the disk store syncs every write.
async fn blocking<T, F>(service: AppState, call: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce(&PixelService) -> Result<T, ServiceError> + Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| call(&service))).await?
}

fn body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ValidationError> {
    body.map_err(|e| ValidationError::Body(e.body_text()))
}

fn path_id(id: Result<Path<String>, PathRejection>) -> Result<PixelId, ValidationError> {
    id.map(|Path(id)| PixelId::from(id))
        .map_err(|e| ValidationError::Id(e.body_text()))
}

async fn list_handler(State(service): State<AppState>) -> Result<Json<Vec<Pixel>>, ServiceError> {
    Ok(Json(blocking(service, |service| service.list()).await?))
}

async fn get_handler(
    State(service): State<AppState>,
    query: Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Response, ServiceError> {
    let Query(query) = query.map_err(|_| ValidationError::Query)?;
    let loc = validation::validate_query(&query)?;
    Ok(match blocking(service, move |service| service.pixel_at(loc)).await? {
        Some(pixel) => Json(pixel).into_response(),
        None => Json(Empty {}).into_response(),
    })
}

async fn create_handler(
    State(service): State<AppState>,
    raw: Result<Bytes, BytesRejection>,
) -> Result<Json<Pixel>, ServiceError> {
    let new = validation::validate_create(&body(raw)?)?;
    Ok(Json(blocking(service, move |service| service.create(new)).await?))
}

/// The color is checked before the id, so a bad color wins over an unknown or malformed id.
async fn update_handler(
    State(service): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    raw: Result<Bytes, BytesRejection>,
) -> Result<Json<Pixel>, ServiceError> {
    let color = validation::validate_update(&body(raw)?)?;
    let id = path_id(id)?;
    Ok(Json(
        blocking(service, move |service| service.update(&id, color)).await?,
    ))
}

async fn delete_handler(
    State(service): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Deleted>, ServiceError> {
    let id = path_id(id)?;
    blocking(service, move |service| service.delete(&id)).await?;
    Ok(Json(Deleted { deleted: true }))
}
