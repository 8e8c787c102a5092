use axum::http::HeaderMap;
use serde_json::Value;
use std::{collections::BTreeMap, collections::HashSet, str::FromStr};
use thiserror::Error;

use crate::error::IngestError;
use crate::origin::Origin;

pub const BANNER: &str = "----- NEW POST /ingest -----";
const REDACTED: &str = "[redacted]";

/// How much of each ingest request gets written to the log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PayloadLogMode {
    /// Banner, origin, every header and the whole body.
    #[default]
    Full,
    /// Banner, origin, header count and body size.
    Summary,
    /// Banner and origin only.
    Off,
}

#[derive(Debug, Error)]
#[error("unknown payload log mode `{0}` (expected full, summary or off)")]
pub struct ParsePayloadLogModeError(String);

impl FromStr for PayloadLogMode {
    type Err = ParsePayloadLogModeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(PayloadLogMode::Full),
            "summary" => Ok(PayloadLogMode::Summary),
            "off" | "none" => Ok(PayloadLogMode::Off),
            _ => Err(ParsePayloadLogModeError(raw.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogPolicy {
    pub payload: PayloadLogMode,
    /// Lowercase header names logged as `[redacted]`.
    pub redacted_headers: HashSet<String>,
}

impl LogPolicy {
    pub fn new(payload: PayloadLogMode, redacted_headers: impl IntoIterator<Item = String>) -> Self {
        Self {
            payload,
            redacted_headers: redacted_headers
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
        }
    }
}

/// One decoded ingest request. Lives for a single request and is consumed by
/// logging it.
#[derive(Debug)]
pub struct IngestRecord {
    pub origin: Origin,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl IngestRecord {
    pub fn new(origin: Origin, headers: &HeaderMap, body: Value) -> Self {
        Self {
            origin,
            headers: header_mapping(headers),
            body,
        }
    }

    /// Log lines for this record, in emission order.
    pub fn render(&self, policy: &LogPolicy) -> Result<Vec<String>, IngestError> {
        let mut lines = vec![BANNER.to_string(), format!("From: {}", self.origin)];

        match policy.payload {
            PayloadLogMode::Full => {
                let headers: BTreeMap<&str, &str> = self
                    .headers
                    .iter()
                    .map(|(name, value)| {
                        if policy.redacted_headers.contains(name) {
                            (name.as_str(), REDACTED)
                        } else {
                            (name.as_str(), value.as_str())
                        }
                    })
                    .collect();
                lines.push(format!("Headers: {}", pretty(&headers)?));
                lines.push(format!("Body: {}", pretty(&self.body)?));
            }
            PayloadLogMode::Summary => {
                let body_bytes = serde_json::to_vec(&self.body)
                    .map_err(|err| IngestError::Internal(format!("serialize body: {err}")))?
                    .len();
                lines.push(format!("Headers: {} entries", self.headers.len()));
                lines.push(format!("Body: {body_bytes} bytes"));
            }
            PayloadLogMode::Off => {}
        }

        Ok(lines)
    }

    pub fn log(self, policy: &LogPolicy) -> Result<(), IngestError> {
        for line in self.render(policy)? {
            tracing::info!(target: "ingest", "{line}");
        }
        Ok(())
    }
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, IngestError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| IngestError::Internal(format!("render ingest log: {err}")))
}

/// Lowercase name to value; repeated headers are joined with `, `.
pub fn header_mapping(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), joined)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn sample() -> IngestRecord {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.append("x-modem", HeaderValue::from_static("sim800"));
        headers.append("x-modem", HeaderValue::from_static("rev2"));
        IngestRecord::new(
            Origin::Forwarded("203.0.113.7".to_string()),
            &headers,
            json!({ "t": 21.5, "v": [3.7, 3.8] }),
        )
    }

    #[test]
    fn joins_repeated_headers() {
        let record = sample();
        assert_eq!(record.headers["x-modem"], "sim800, rev2");
        assert_eq!(record.headers.len(), 3);
    }

    #[test]
    fn full_dump_has_every_section() {
        let lines = sample().render(&LogPolicy::default()).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], BANNER);
        assert_eq!(lines[1], "From: 203.0.113.7");
        assert!(lines[2].starts_with("Headers: {\n"));
        assert!(lines[2].contains("\"authorization\": \"Bearer abc\""));
        assert_eq!(
            lines[3],
            format!(
                "Body: {}",
                serde_json::to_string_pretty(&json!({ "t": 21.5, "v": [3.7, 3.8] })).unwrap()
            )
        );
    }

    #[test]
    fn redacts_configured_headers() {
        let policy = LogPolicy::new(PayloadLogMode::Full, ["Authorization".to_string()]);
        let lines = sample().render(&policy).unwrap();
        assert!(lines[2].contains("\"authorization\": \"[redacted]\""));
        assert!(!lines[2].contains("Bearer abc"));
        assert!(lines[2].contains("\"content-type\": \"application/json\""));
    }

    #[test]
    fn summary_and_off_modes() {
        let summary = LogPolicy::new(PayloadLogMode::Summary, Vec::new());
        let lines = sample().render(&summary).unwrap();
        assert_eq!(lines[2], "Headers: 3 entries");
        assert_eq!(lines[3], "Body: 24 bytes");

        let off = LogPolicy::new(PayloadLogMode::Off, Vec::new());
        let lines = sample().render(&off).unwrap();
        assert_eq!(lines, vec![BANNER.to_string(), "From: 203.0.113.7".to_string()]);
    }

    #[test]
    fn parses_payload_modes() {
        assert_eq!("FULL".parse::<PayloadLogMode>().unwrap(), PayloadLogMode::Full);
        assert_eq!(" summary ".parse::<PayloadLogMode>().unwrap(), PayloadLogMode::Summary);
        assert_eq!("none".parse::<PayloadLogMode>().unwrap(), PayloadLogMode::Off);
        assert!("verbose".parse::<PayloadLogMode>().is_err());
    }
}
