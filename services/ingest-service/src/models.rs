use serde::Serialize;

#[derive(Serialize)]
pub struct IngestAck {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: &'static str,
}
