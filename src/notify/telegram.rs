//! Telegram notifications
//!
//! Posts a MarkdownV2 summary of each committed group to a chat through the
//! Bot API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ReimburseError, ReimburseResult};
use crate::models::ReimbursementGroup;

use super::Notifier;

const API_BASE: &str = "https://api.telegram.org";

/// Characters that must be backslash-escaped in MarkdownV2 text
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// Telegram Bot API client (blocking)
pub struct TelegramNotifier {
    http: Client,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Escape text for MarkdownV2
pub fn escape_markdown(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render the summary message for a committed group
pub fn format_message(group: &ReimbursementGroup) -> String {
    let main = group.main();
    let mut lines = vec![
        "*Reimbursement Grouped*".to_string(),
        escape_markdown(&format!("{} ({})", main.payee_or("Unknown payee"), main.amount)),
        escape_markdown(group.confidence_reason()),
        String::new(),
    ];

    for m in group.matches() {
        lines.push(escape_markdown(&format!(
            " → {} paid {} [{}]",
            m.payee_or("Someone"),
            m.amount.abs(),
            m.notes_str()
        )));
    }

    lines.push(escape_markdown(&format!(" → You paid {}", group.you_pay())));
    lines.join("\n")
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> ReimburseResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReimburseError::Notify(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, group: &ReimbursementGroup) -> ReimburseResult<()> {
        let text = format_message(group);
        let request = SendMessage {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "MarkdownV2",
        };

        let response = self
            .http
            .post(format!("{}/bot{}/sendMessage", API_BASE, self.token))
            .json(&request)
            .send()
            .map_err(|e| ReimburseError::Notify(format!("Network error: {}", e)))?;

        let status = response.status();
        let body: BotResponse = response
            .json()
            .map_err(|e| ReimburseError::Notify(format!("HTTP {}: {}", status.as_u16(), e)))?;

        if !body.ok {
            return Err(ReimburseError::Notify(
                body.description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            ));
        }

        Ok(())
    }
}
