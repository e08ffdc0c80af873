use serde::{Deserialize, Serialize};

use crate::models::report::ReportParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Ai,
}

/// One turn in a symbiosis conversation. Transcripts are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        ChatMessage {
            sender: Sender::Ai,
            text: text.into(),
        }
    }
}

/// Immutable seed for a side conversation about one report excerpt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbiosisContext {
    pub topic: String,
    pub original_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_parameters: Option<ReportParameters>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_labels() {
        let value = serde_json::to_value(ChatMessage::ai("hello")).unwrap();
        assert_eq!(value["sender"], "ai");
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(value["sender"], "user");
    }

    #[test]
    fn test_context_omits_absent_report_parameters() {
        let context = SymbiosisContext {
            topic: "Supply chain gap".to_string(),
            original_content: "No local cold-chain providers".to_string(),
            report_parameters: None,
        };
        let value = serde_json::to_value(&context).unwrap();
        assert!(value.get("reportParameters").is_none());
        assert_eq!(value["originalContent"], "No local cold-chain providers");
    }
}
