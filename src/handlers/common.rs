use axum::Json;
use serde::Serialize;

/// Minimal acknowledgement body for mutations with nothing else to say.
#[derive(Debug, Serialize)]
pub struct OkBody {
    pub ok: bool,
}

pub fn ok() -> Json<OkBody> {
    Json(OkBody { ok: true })
}
