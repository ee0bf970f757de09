use pixelwall_store::prelude::{HexColor, Pixel, PixelId};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::ClientError;

pub const DEFAULT_API: &str = "http://127.0.0.1:7753/api/pixels";

/// The five calls of the pixel API.
/// Implementors must be Send + Sync so a painter and a synchronizer can share one.
pub trait PixelApi: Send + Sync {
    /// Every stored pixel.
    fn list(&self) -> impl Future<Output = Result<Vec<Pixel>, ClientError>> + Send;
    /// The pixel at a coordinate, `None` while it is unset.
    fn get(&self, x: i64, y: i64) -> impl Future<Output = Result<Option<Pixel>, ClientError>> + Send;
    /// Claim an unset coordinate.
    fn create(
        &self,
        x: i64,
        y: i64,
        color: &HexColor,
    ) -> impl Future<Output = Result<Pixel, ClientError>> + Send;
    fn update(
        &self,
        id: &PixelId,
        color: &HexColor,
    ) -> impl Future<Output = Result<Pixel, ClientError>> + Send;
    fn delete(&self, id: &PixelId) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    x: i64,
    y: i64,
    color: &'a HexColor,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    color: &'a HexColor,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    kind: Option<String>,
}

/// [`PixelApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct WallClient {
    http: reqwest::Client,
    base: String,
}

impl WallClient {
    /// `base` is the API root, e.g. `http://127.0.0.1:7753/api/pixels`.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    /// Uses `PIXELWALL_API` when set.
    pub fn from_env() -> Self {
        Self::new(std::env::var("PIXELWALL_API").unwrap_or_else(|_| DEFAULT_API.to_string()))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn pixel_url(&self, id: &PixelId) -> String {
        format!("{}/pixel/{}", self.base, id)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    trace!("{} {}", status, text);
    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }

    let (message, kind) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (body.error, body.kind),
        Err(_) => (text, None),
    };
    Err(match (kind.as_deref(), status) {
        (Some("conflict"), _) => ClientError::Conflict(message),
        (Some("not_found"), _) | (None, StatusCode::NOT_FOUND) => ClientError::NotFound(message),
        (Some("validation"), _) | (None, StatusCode::BAD_REQUEST) => {
            ClientError::Validation(message)
        }
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    })
}

impl PixelApi for WallClient {
    async fn list(&self) -> Result<Vec<Pixel>, ClientError> {
        decode(self.http.get(&self.base).send().await?).await
    }

    async fn get(&self, x: i64, y: i64) -> Result<Option<Pixel>, ClientError> {
        let response = self
            .http
            .get(format!("{}/pixel", self.base))
            .query(&[("x", x), ("y", y)])
            .send()
            .await?;
        let body: Value = decode(response).await?;
        match body {
            Value::Object(ref fields) if fields.is_empty() => Ok(None),
            body => Ok(Some(serde_json::from_value(body)?)),
        }
    }

    async fn create(&self, x: i64, y: i64, color: &HexColor) -> Result<Pixel, ClientError> {
        let response = self
            .http
            .put(format!("{}/pixel", self.base))
            .json(&CreateRequest { x, y, color })
            .send()
            .await?;
        decode(response).await
    }

    async fn update(&self, id: &PixelId, color: &HexColor) -> Result<Pixel, ClientError> {
        let response = self
            .http
            .post(self.pixel_url(id))
            .json(&UpdateRequest { color })
            .send()
            .await?;
        decode(response).await
    }

    async fn delete(&self, id: &PixelId) -> Result<(), ClientError> {
        let response = self.http.delete(self.pixel_url(id)).send().await?;
        let _: Value = decode(response).await?;
        Ok(())
    }
}
