//! Service banner.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub status: &'static str,
}

pub async fn root() -> Json<Banner> {
    Json(Banner {
        message: "Chat service is running.",
        status: "ready",
    })
}
