//! TwiML rendering of voice responses.
//!
//! Spoken lines before a listen are wrapped in a speech `<Gather>`; a
//! `<Redirect>` back to the turn endpoint follows so that silence still
//! produces a turn.

use std::fmt::Write;

use crate::domain::intake::{Instruction, VoiceResponse};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Rendering settings taken from telephony config.
#[derive(Debug, Clone)]
pub struct TwimlSettings {
    /// Where gathers and redirects post the next turn.
    pub action: String,
    pub voice: Option<String>,
}

impl Default for TwimlSettings {
    fn default() -> Self {
        Self {
            action: "/voice/continue".to_string(),
            voice: None,
        }
    }
}

/// Renders a complete `<Response>` document.
pub fn render(response: &VoiceResponse, settings: &TwimlSettings) -> String {
    let mut body = String::new();
    let mut pending: Vec<&str> = Vec::new();

    for instruction in &response.instructions {
        match instruction {
            Instruction::Say { text } => pending.push(text),
            Instruction::Listen { timeout_secs } => {
                let _ = write!(
                    body,
                    r#"<Gather input="speech" action="{}" method="POST" timeout="{}" speechTimeout="auto">"#,
                    escape(&settings.action),
                    timeout_secs
                );
                for text in pending.drain(..) {
                    say(&mut body, text, settings);
                }
                body.push_str("</Gather>");
                let _ = write!(
                    body,
                    r#"<Redirect method="POST">{}</Redirect>"#,
                    escape(&settings.action)
                );
            }
            Instruction::Hangup => {
                for text in pending.drain(..) {
                    say(&mut body, text, settings);
                }
                body.push_str("<Hangup/>");
            }
        }
    }
    for text in pending.drain(..) {
        say(&mut body, text, settings);
    }

    format!("{}<Response>{}</Response>", XML_HEADER, body)
}

/// A response with no verbs, for callbacks that expect no call control.
pub fn empty() -> String {
    format!("{}<Response/>", XML_HEADER)
}

fn say(body: &mut String, text: &str, settings: &TwimlSettings) {
    match &settings.voice {
        Some(voice) => {
            let _ = write!(body, r#"<Say voice="{}">{}</Say>"#, escape(voice), escape(text));
        }
        None => {
            let _ = write!(body, "<Say>{}</Say>", escape(text));
        }
    }
}

/// Escapes the five XML special characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
