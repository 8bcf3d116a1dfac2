use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::bot::error::Error;

const API_BASE: &str = "https://dialogflow.googleapis.com/v2";

/// Thin client for the Dialogflow v2 `detectIntent` endpoint. Sessions are
/// keyed by member id, one conversation per member.
pub struct DialogflowClient {
    http: reqwest::Client,
    project_id: String,
    access_token: String,
}

impl DialogflowClient {
    pub fn new(project_id: String, access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_id,
            access_token,
        }
    }

    pub async fn detect_intent(&self, session: u64, text: &str) -> Result<QueryResult, Error> {
        let url = format!(
            "{}/projects/{}/agent/sessions/{}:detectIntent",
            API_BASE, self.project_id, session
        );

        debug!("detectIntent for session {}", session);

        let response: DetectIntentResponse = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&DetectIntentRequest {
                query_input: QueryInput {
                    text: TextInput {
                        text,
                        language_code: "en",
                    },
                },
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.query_result)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest<'a> {
    query_input: QueryInput<'a>,
}

#[derive(Serialize)]
struct QueryInput<'a> {
    text: TextInput<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DetectIntentResponse {
    query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    pub output_contexts: Vec<OutputContext>,
    pub fulfillment_messages: Vec<FulfillmentMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputContext {
    pub name: String,
    pub lifespan_count: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FulfillmentMessage {
    pub payload: Value,
}

impl QueryResult {
    /// The conversation's contexts are about to expire; the agent is done
    /// with this exchange and the session should retrigger from persisted
    /// status next time.
    pub fn conversation_expiring(&self) -> bool {
        self.output_contexts.iter().any(|c| c.lifespan_count <= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes() {
        let raw = r#"{
            "queryResult": {
                "outputContexts": [
                    { "name": "projects/p/agent/sessions/1/contexts/flow", "lifespanCount": 1 }
                ],
                "fulfillmentMessages": [
                    { "payload": { "actions": [ { "action": "finished" } ] } },
                    { "text": { "text": ["plain text message, no payload"] } }
                ]
            }
        }"#;

        let response: DetectIntentResponse = serde_json::from_str(raw).unwrap();
        let result = response.query_result;
        assert!(result.conversation_expiring());
        assert_eq!(result.fulfillment_messages.len(), 2);
        assert!(result.fulfillment_messages[0].payload.get("actions").is_some());
        assert!(result.fulfillment_messages[1].payload.is_null());
    }

    #[test]
    fn test_long_lived_context_keeps_session() {
        let result = QueryResult {
            output_contexts: vec![OutputContext {
                name: "flow".into(),
                lifespan_count: 4,
            }],
            fulfillment_messages: vec![],
        };
        assert!(!result.conversation_expiring());
    }
}
