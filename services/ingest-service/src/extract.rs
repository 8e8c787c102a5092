use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::IngestError;

/// Request body decoded as an arbitrary JSON value.
///
/// Unlike `axum::Json` this ignores `Content-Type`: the modem firmware lets
/// the caller pick the header, so the bytes decide. The size ceiling comes
/// from the router's `DefaultBodyLimit`; an oversized body is rejected while
/// buffering, before any parsing.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = IngestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| IngestError::MalformedInput(rejection.body_text()))?;
        decode_json(&bytes).map(JsonBody)
    }
}

pub fn decode_json(bytes: &[u8]) -> Result<Value, IngestError> {
    serde_json::from_slice(bytes).map_err(|err| IngestError::MalformedInput(err.to_string()))
}
