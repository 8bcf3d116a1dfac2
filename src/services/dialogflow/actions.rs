use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One step of an onboarding flow, as configured in the settings file or
/// returned by the agent inside a fulfillment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowAction {
    /// Feed a canned inquiry back into the agent and process its answer.
    Inquire { inquiry: String },
    /// DM the member.
    Message { message: String },
    /// DM the member and wait for their reply.
    Question { message: String },
    /// Remove the member from the guild, optionally telling them why first.
    Kick {
        #[serde(default)]
        message: Option<String>,
    },
    /// Grant a role, looked up by name.
    AddRole { role: String },
    /// Repeat the guild's try-again message and wait for another reply.
    TryAgain,
    /// Conversation complete; send the guild's welcome message.
    Finished,
}

/// Pull the `actions` array out of a fulfillment payload. Unknown or
/// malformed entries are logged and skipped, never fatal.
pub fn parse_actions(payload: &Value) -> Vec<FlowAction> {
    let Some(actions) = payload.get("actions").and_then(Value::as_array) else {
        return Vec::new();
    };

    actions
        .iter()
        .filter_map(|raw| match serde_json::from_value(raw.clone()) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!("Skipping unrecognized flow action {}: {}", raw, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let payload = json!({
            "actions": [
                { "action": "message", "message": "Welcome!" },
                { "action": "question", "message": "Have you read the rules?" },
                { "action": "add_role", "role": "Member" },
                { "action": "kick", "message": "Bye." },
                { "action": "kick" },
                { "action": "try_again" },
                { "action": "finished" },
            ]
        });

        assert_eq!(
            parse_actions(&payload),
            vec![
                FlowAction::Message {
                    message: "Welcome!".into()
                },
                FlowAction::Question {
                    message: "Have you read the rules?".into()
                },
                FlowAction::AddRole {
                    role: "Member".into()
                },
                FlowAction::Kick {
                    message: Some("Bye.".into())
                },
                FlowAction::Kick { message: None },
                FlowAction::TryAgain,
                FlowAction::Finished,
            ]
        );
    }

    #[test]
    fn test_unknown_actions_are_skipped() {
        let payload = json!({
            "actions": [
                { "action": "self_destruct" },
                { "action": "message", "message": "still here" },
            ]
        });

        assert_eq!(
            parse_actions(&payload),
            vec![FlowAction::Message {
                message: "still here".into()
            }]
        );
    }

    #[test]
    fn test_payload_without_actions() {
        assert!(parse_actions(&json!({})).is_empty());
        assert!(parse_actions(&json!({ "actions": "nope" })).is_empty());
    }
}
