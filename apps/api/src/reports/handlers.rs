//! Axum route handlers for the Nexus proxy API.
//!
//! One endpoint, `POST /api/nexus`, dispatches on a tagged `{action, payload}`
//! body. Report and deep-dive actions stream the generator output back as a
//! chunked body; lookups, chat turns, and letter drafts resolve once to JSON.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{GenerateOptions, TextStream};
use crate::models::chat::{ChatMessage, SymbiosisContext};
use crate::models::opportunity::{LiveOpportunityItem, OpportunityFeed};
use crate::models::report::{LetterRequest, ReportParameters};
use crate::reports::prompts;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// The `{action, payload}` dispatch envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum NexusAction {
    #[serde(rename = "generateStrategicReport")]
    GenerateStrategicReport { params: ReportParameters },

    #[serde(rename = "generateAnalysisStream")]
    GenerateAnalysisStream {
        item: LiveOpportunityItem,
        region: String,
    },

    #[serde(rename = "fetchRegionalCities")]
    FetchRegionalCities { country: String },

    #[serde(rename = "fetchLiveOpportunities")]
    FetchLiveOpportunities {},

    #[serde(rename = "fetchSymbiosisResponse")]
    FetchSymbiosisResponse {
        context: SymbiosisContext,
        history: Vec<ChatMessage>,
    },

    #[serde(rename = "generateOutreachLetter")]
    GenerateOutreachLetter { request: LetterRequest },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/nexus
pub async fn handle_nexus(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Response, AppError> {
    let action: NexusAction = serde_json::from_value(raw)
        .map_err(|e| AppError::Validation(format!("Invalid action: {e}")))?;
    let request_id = Uuid::new_v4();

    match action {
        NexusAction::GenerateStrategicReport { params } => {
            info!(
                %request_id,
                mode = %params.mode(),
                tier = params.tier_label(),
                region = params.basics().region.as_str(),
                "Generating strategic report"
            );
            let prompt = prompts::build_report_prompt(&params);
            let opts = GenerateOptions::with_system(prompts::REPORT_SYSTEM).search();
            let stream = state
                .llm
                .generate_stream(&prompt, &opts)
                .await
                .map_err(|e| AppError::Llm(format!("Report generation failed: {e}")))?;
            Ok(stream_response(stream))
        }

        NexusAction::GenerateAnalysisStream { item, region } => {
            info!(
                %request_id,
                project = item.project_name.as_str(),
                region = region.as_str(),
                "Generating deep-dive analysis"
            );
            let prompt = prompts::build_deep_dive_prompt(&item);
            let opts = GenerateOptions::with_system(prompts::deep_dive_system(&item.country)).search();
            let stream = state
                .llm
                .generate_stream(&prompt, &opts)
                .await
                .map_err(|e| AppError::Llm(format!("Deep-dive analysis failed: {e}")))?;
            Ok(stream_response(stream))
        }

        NexusAction::FetchRegionalCities { country } => {
            if country.trim().is_empty() {
                return Err(AppError::Validation("country cannot be empty".to_string()));
            }
            info!(%request_id, %country, "Fetching regional cities");
            let prompt = prompts::build_cities_prompt(&country);
            let opts = GenerateOptions::default().json_schema(prompts::cities_response_schema());
            let cities: Vec<String> = state
                .llm
                .generate_json(&prompt, &opts)
                .await
                .map_err(|e| AppError::Llm(format!("Regional city lookup failed: {e}")))?;
            Ok(Json(json!({ "cities": cities })).into_response())
        }

        NexusAction::FetchLiveOpportunities {} => {
            info!(%request_id, "Fetching live opportunities");
            let opts = GenerateOptions::default()
                .search()
                .json_schema(prompts::opportunities_response_schema());
            let feed: OpportunityFeed = state
                .llm
                .generate_json(prompts::OPPORTUNITIES_PROMPT, &opts)
                .await
                .map_err(|e| AppError::Llm(format!("Opportunity feed failed: {e}")))?;
            Ok(Json(feed).into_response())
        }

        NexusAction::FetchSymbiosisResponse { context, history } => {
            info!(%request_id, topic = context.topic.as_str(), turns = history.len(), "Symbiosis turn");
            let prompt = prompts::build_symbiosis_prompt(&context, &history);
            let opts = GenerateOptions::with_system(prompts::SYMBIOSIS_SYSTEM).search();
            let text = state
                .llm
                .generate_text(&prompt, &opts)
                .await
                .map_err(|e| AppError::Llm(format!("Symbiosis response failed: {e}")))?;
            Ok(Json(json!({ "text": text })).into_response())
        }

        NexusAction::GenerateOutreachLetter { request } => {
            info!(
                %request_id,
                user = request.report_parameters.basics.user_name.as_str(),
                "Drafting outreach letter"
            );
            let prompt = prompts::build_letter_prompt(&request);
            let opts = GenerateOptions::with_system(prompts::LETTER_SYSTEM);
            let text = state
                .llm
                .generate_text(&prompt, &opts)
                .await
                .map_err(|e| AppError::Llm(format!("Letter draft failed: {e}")))?;
            Ok(Json(json!({ "text": text })).into_response())
        }
    }
}

/// Wraps a generator text stream as a chunked octet-stream body.
/// A failure mid-stream simply terminates the body; chunks already sent are
/// not recalled.
fn stream_response(stream: TextStream) -> Response {
    let body = Body::from_stream(stream.map(|chunk| chunk.map(Bytes::from)));
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_envelope_deserializes_report_request() {
        let raw = json!({
            "action": "generateStrategicReport",
            "payload": {
                "params": {
                    "analysisMode": "analysis",
                    "tier": "Tier A: Economic Snapshot",
                    "userName": "Jane Doe",
                    "userType": "government",
                    "userDepartment": "Economic Development Agency",
                    "userCountry": "Australia",
                    "customObjective": "test",
                    "industry": "AgriTech",
                    "region": "Cebu, Philippines"
                }
            }
        });
        let action: NexusAction = serde_json::from_value(raw).unwrap();
        match action {
            NexusAction::GenerateStrategicReport { params } => {
                assert_eq!(params.tier_label(), "Tier A: Economic Snapshot");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_action_envelope_deserializes_empty_payload() {
        let raw = json!({ "action": "fetchLiveOpportunities", "payload": {} });
        let action: NexusAction = serde_json::from_value(raw).unwrap();
        assert!(matches!(action, NexusAction::FetchLiveOpportunities {}));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let raw = json!({ "action": "dropAllTables", "payload": {} });
        let result: Result<NexusAction, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_cities_action_carries_country() {
        let raw = json!({ "action": "fetchRegionalCities", "payload": { "country": "Vietnam" } });
        let action: NexusAction = serde_json::from_value(raw).unwrap();
        match action {
            NexusAction::FetchRegionalCities { country } => assert_eq!(country, "Vietnam"),
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
