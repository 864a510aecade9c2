//! HTTP handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{LookupError, LookupResult};
use crate::service::{Alternate, HealthReport, LookupOutcome, LookupService, StatsReport};

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LookupResponse {
    Matched {
        success: bool,
        query: String,
        #[serde(rename = "match")]
        address: String,
        confidence: u8,
        alternates: Vec<Alternate>,
    },
    NoMatch {
        success: bool,
        message: String,
    },
}

impl LookupResponse {
    fn from_outcome(query: String, outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Matched {
                address,
                confidence,
                alternates,
            } => LookupResponse::Matched {
                success: true,
                query,
                address,
                confidence,
                alternates,
            },
            LookupOutcome::NoMatch => LookupResponse::NoMatch {
                success: false,
                message: format!("No matching address found for \"{}\"", query),
            },
        }
    }
}

/// POST /lookup
pub async fn lookup(
    State(service): State<Arc<LookupService>>,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> LookupResult<Json<LookupResponse>> {
    let Json(request) = payload.map_err(|e| LookupError::InvalidBody(e.body_text()))?;
    let query = request.query.ok_or_else(LookupError::query_too_short)?;

    let outcome = service.lookup(&query).await?;
    Ok(Json(LookupResponse::from_outcome(query, outcome)))
}

/// OPTIONS on lookup routes
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// GET /health
pub async fn health(State(service): State<Arc<LookupService>>) -> Json<HealthReport> {
    Json(service.health())
}

/// GET /stats
pub async fn stats(State(service): State<Arc<LookupService>>) -> Json<StatsReport> {
    Json(service.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_response_shape() {
        let response = LookupResponse::from_outcome(
            " 5 oak st".to_string(),
            LookupOutcome::Matched {
                address: "5 Oak St".to_string(),
                confidence: 100,
                alternates: vec![Alternate {
                    address: "5 Oak Ave".to_string(),
                    confidence: 71,
                }],
            },
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "query": " 5 oak st",
                "match": "5 Oak St",
                "confidence": 100,
                "alternates": [{ "address": "5 Oak Ave", "confidence": 71 }],
            })
        );
    }

    #[test]
    fn test_no_match_message() {
        let response = LookupResponse::from_outcome("nowhere".to_string(), LookupOutcome::NoMatch);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "message": "No matching address found for \"nowhere\"",
            })
        );
    }
}
