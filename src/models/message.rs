// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::utils::format_message_time;

/// Gmail system labels that surface as folders or markers rather than as
/// user labels on a row
const SYSTEM_LABELS: [&str; 6] = ["INBOX", "SENT", "DRAFT", "IMPORTANT", "STARRED", "UNREAD"];

// API response wrappers

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<GmailMessage>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

/// Raw Gmail message as proxied by the gateway (format=full)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailMessage {
    pub id: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(rename = "internalDate", default)]
    pub internal_date: Option<String>,
    #[serde(rename = "labelIds", default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub payload: Option<MessagePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessagePayload {
    #[serde(default)]
    pub headers: Vec<MessageHeader>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

impl GmailMessage {
    fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Attachments announce themselves as parts with a filename
    fn has_attachment(&self) -> bool {
        self.payload
            .as_ref()
            .map(|p| {
                p.parts
                    .iter()
                    .any(|part| part.filename.as_deref().is_some_and(|f| !f.is_empty()))
            })
            .unwrap_or(false)
    }
}

/// A message list row - the domain view of a raw Gmail message
#[derive(Debug, Clone)]
pub struct MailItem {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub preview: String,
    pub time: String,
    pub read: bool,
    pub starred: bool,
    pub important: bool,
    pub has_attachment: bool,
    pub labels: Vec<String>,
}

impl MailItem {
    pub fn from_api(msg: &GmailMessage) -> Self {
        let labels = msg
            .label_ids
            .iter()
            .filter(|label| !SYSTEM_LABELS.contains(&label.as_str()))
            .cloned()
            .collect();

        Self {
            id: msg.id.clone(),
            from: msg
                .header("From")
                .filter(|v| !v.is_empty())
                .unwrap_or("Unknown")
                .to_string(),
            subject: msg
                .header("Subject")
                .filter(|v| !v.is_empty())
                .unwrap_or("(No subject)")
                .to_string(),
            preview: msg.snippet.clone(),
            time: format_message_time(msg.internal_date.as_deref()),
            read: !msg.label_ids.iter().any(|l| l == "UNREAD"),
            starred: msg.label_ids.iter().any(|l| l == "STARRED"),
            important: msg.label_ids.iter().any(|l| l == "IMPORTANT"),
            has_attachment: msg.has_attachment(),
            labels,
        }
    }
}

/// Flattened single-message response from `/api/gmail/message/{id}` -
/// the backend extracts headers and decodes the body before it reaches
/// the client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub recipients: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub has_attachments: bool,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_and_derive_mail_item() {
        let json = r#"{
            "id": "18c2f0a9b3d",
            "snippet": "Your invoice for November is attached",
            "internalDate": "1700000000000",
            "labelIds": ["INBOX", "UNREAD", "IMPORTANT", "Label_42"],
            "payload": {
                "headers": [
                    {"name": "From", "value": "Billing <billing@example.com>"},
                    {"name": "Subject", "value": "Invoice #1042"},
                    {"name": "To", "value": "me@example.com"}
                ],
                "parts": [
                    {"mimeType": "text/plain", "filename": ""},
                    {"mimeType": "application/pdf", "filename": "invoice.pdf"}
                ]
            }
        }"#;

        let msg: GmailMessage = serde_json::from_str(json).expect("Failed to parse message JSON");
        let item = MailItem::from_api(&msg);

        assert_eq!(item.id, "18c2f0a9b3d");
        assert_eq!(item.from, "Billing <billing@example.com>");
        assert_eq!(item.subject, "Invoice #1042");
        assert_eq!(item.preview, "Your invoice for November is attached");
        assert!(!item.read);
        assert!(!item.starred);
        assert!(item.important);
        assert!(item.has_attachment);
        // System labels are filtered out, user labels kept
        assert_eq!(item.labels, vec!["Label_42".to_string()]);
        assert!(!item.time.is_empty());
    }

    #[test]
    fn test_missing_headers_fall_back_to_placeholders() {
        let json = r#"{"id": "m2", "labelIds": ["SENT"]}"#;
        let msg: GmailMessage = serde_json::from_str(json).expect("Failed to parse message JSON");
        let item = MailItem::from_api(&msg);

        assert_eq!(item.from, "Unknown");
        assert_eq!(item.subject, "(No subject)");
        assert!(item.read);
        assert!(!item.has_attachment);
        assert!(item.labels.is_empty());
    }

    #[test]
    fn test_parse_message_detail() {
        let json = r#"{
            "id": "m3",
            "subject": "Re: plans",
            "sender": "Ada <ada@example.com>",
            "recipients": "me@example.com",
            "date": "Tue, 14 Nov 2023 10:00:00 +0000",
            "body": "Sounds good, see you then.",
            "snippet": "Sounds good",
            "has_attachments": false,
            "star": true,
            "labels": ["INBOX", "STARRED"]
        }"#;

        let detail: MessageDetail = serde_json::from_str(json).expect("Failed to parse detail JSON");
        assert_eq!(detail.subject, "Re: plans");
        assert!(detail.star);
        assert_eq!(detail.body, "Sounds good, see you then.");
    }
}
