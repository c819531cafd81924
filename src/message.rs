//! Chat message envelopes exchanged with the server.
//!
//! A message carries its sender, a Unix timestamp in seconds and an ordered
//! list of typed sections. Bot replies may add a caption. The reply body is
//! split into text and code sections by [`crate::parser::parse_sections`]
//! once, when the reply arrives.

use crate::parser::{Section, SectionKind, parse_sections};
use crate::settings::{Aliases, LanguageSettings, NetworkSettings, PluginSettings};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderType {
    You,
    NetGPT,
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderType::You => f.write_str("You"),
            SenderType::NetGPT => f.write_str("NetGPT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Code,
    Error,
}

impl From<SectionKind> for MessageType {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Text => MessageType::Text,
            SectionKind::Code => MessageType::Code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSection {
    pub message_type: MessageType,
    pub content: String,
}

impl MessageSection {
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            message_type,
            content: content.into(),
        }
    }
}

impl From<Section> for MessageSection {
    fn from(section: Section) -> Self {
        Self {
            message_type: section.kind.into(),
            content: section.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: SenderType,
    pub sections: Vec<MessageSection>,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl Message {
    /// A message typed by the user: one text section holding the input.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            sender: SenderType::You,
            sections: vec![MessageSection::new(MessageType::Text, text)],
            timestamp: now(),
        }
    }

    /// Copy of this message without its code sections.
    ///
    /// Code sections hold device output that the server already has, so they
    /// are never replayed as history.
    pub fn without_code(&self) -> Self {
        Self {
            sender: self.sender,
            sections: self
                .sections
                .iter()
                .filter(|s| s.message_type != MessageType::Code)
                .cloned()
                .collect(),
            timestamp: self.timestamp,
        }
    }
}

/// A reply from the server, optionally captioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl BotMessage {
    /// A reply made of a single section.
    pub fn quick(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            message: Message {
                sender: SenderType::NetGPT,
                sections: vec![MessageSection::new(message_type, content)],
                timestamp: now(),
            },
            caption: None,
        }
    }

    /// Split every text section of the reply into text and code sections.
    ///
    /// Code and error sections pass through untouched. Blank text sections
    /// are dropped unless the reply would otherwise have no sections left.
    pub fn sectionized(self) -> Self {
        let BotMessage { message, caption } = self;
        let mut sections = Vec::with_capacity(message.sections.len());

        for section in message.sections {
            if section.message_type != MessageType::Text {
                sections.push(section);
                continue;
            }
            sections.extend(
                parse_sections(&section.content)
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .map(MessageSection::from),
            );
        }

        if sections.is_empty() {
            sections.push(MessageSection::new(MessageType::Text, ""));
        }

        Self {
            message: Message { sections, ..message },
            caption,
        }
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// The reply as a single Markdown string, for caching as text.
    ///
    /// Code sections are wrapped in bare fences so sectionizing the result
    /// brings them back. Error sections become plain text and the caption is
    /// left out.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for section in &self.message.sections {
            let content = section.content.trim_end_matches('\n');
            match section.message_type {
                MessageType::Code => {
                    text.push_str("```\n");
                    text.push_str(content);
                    text.push_str("\n```\n");
                }
                MessageType::Text | MessageType::Error => {
                    text.push_str(content);
                    text.push('\n');
                }
            }
        }
        text
    }
}

/// Request body of `POST /chat/message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub message_history: Vec<Message>,
    pub network_settings: NetworkSettings,
    pub language_settings: LanguageSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_list: Option<Vec<PluginSettings>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Aliases>,
}

impl UserMessage {
    /// Build a request, stripping code sections from the history.
    pub fn new(
        history: &[Message],
        network_settings: NetworkSettings,
        language_settings: LanguageSettings,
    ) -> Self {
        Self {
            message_history: history.iter().map(Message::without_code).collect(),
            network_settings,
            language_settings,
            plugin_list: None,
            aliases: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &Aliases) -> Self {
        self.aliases = (!aliases.is_empty()).then(|| aliases.clone());
        self
    }

    pub fn with_plugins(mut self, plugins: &[PluginSettings]) -> Self {
        self.plugin_list = (!plugins.is_empty()).then(|| plugins.to_vec());
        self
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bot(sections: Vec<MessageSection>) -> BotMessage {
        BotMessage {
            message: Message {
                sender: SenderType::NetGPT,
                sections,
                timestamp: 1_700_000_000,
            },
            caption: None,
        }
    }

    #[test]
    fn test_bot_message_decodes_server_json() {
        let reply: BotMessage = serde_json::from_value(json!({
            "sender": "NetGPT",
            "timestamp": 1700000000,
            "sections": [{"messageType": "code", "content": "{}"}],
            "caption": "From core-1"
        }))
        .unwrap();

        assert_eq!(reply.message.sender, SenderType::NetGPT);
        assert_eq!(reply.message.sections[0].message_type, MessageType::Code);
        assert_eq!(reply.caption.as_deref(), Some("From core-1"));
    }

    #[test]
    fn test_bot_message_without_caption() {
        let reply: BotMessage = serde_json::from_value(json!({
            "sender": "NetGPT",
            "timestamp": 1,
            "sections": [],
            "caption": null
        }))
        .unwrap();
        assert!(reply.caption.is_none());
    }

    #[test]
    fn test_sectionized_splits_text_only() {
        let reply = bot(vec![
            MessageSection::new(MessageType::Code, "raw output"),
            MessageSection::new(
                MessageType::Text,
                "Here is the config:\n```\nhostname core-1\n```\nDone.",
            ),
        ])
        .sectionized();

        assert_eq!(
            reply.message.sections,
            vec![
                MessageSection::new(MessageType::Code, "raw output"),
                MessageSection::new(MessageType::Text, "Here is the config:\n"),
                MessageSection::new(MessageType::Code, "hostname core-1\n"),
                MessageSection::new(MessageType::Text, "Done.\n"),
            ]
        );
    }

    #[test]
    fn test_plain_text_keeps_code_fenced() {
        let reply = bot(vec![
            MessageSection::new(MessageType::Text, "Welcome.\n"),
            MessageSection::new(MessageType::Code, "Gi0/1 up"),
            MessageSection::new(MessageType::Error, "core-2 unreachable"),
        ]);

        let text = reply.plain_text();
        assert_eq!(text, "Welcome.\n```\nGi0/1 up\n```\ncore-2 unreachable\n");

        let again = BotMessage::quick(MessageType::Text, text).sectionized();
        assert_eq!(
            again.message.sections,
            vec![
                MessageSection::new(MessageType::Text, "Welcome.\n"),
                MessageSection::new(MessageType::Code, "Gi0/1 up\n"),
                MessageSection::new(MessageType::Text, "core-2 unreachable\n"),
            ]
        );
    }

    #[test]
    fn test_sectionized_keeps_errors() {
        let reply = BotMessage::quick(MessageType::Error, "Language Foo not found.").sectionized();
        assert_eq!(reply.message.sections[0].message_type, MessageType::Error);
        assert_eq!(reply.message.sections[0].content, "Language Foo not found.");
    }

    #[test]
    fn test_sectionized_blank_reply_keeps_one_section() {
        let reply = bot(vec![MessageSection::new(MessageType::Text, "\n\n")]).sectionized();
        assert_eq!(
            reply.message.sections,
            vec![MessageSection::new(MessageType::Text, "")]
        );
    }

    #[test]
    fn test_user_message_strips_code_sections() {
        let history = vec![
            Message::from_user("show interfaces"),
            bot(vec![
                MessageSection::new(MessageType::Code, "{\"Gi0/1\": \"up\"}"),
                MessageSection::new(MessageType::Text, "All interfaces are up."),
            ])
            .into_message(),
        ];

        let request = UserMessage::new(
            &history,
            NetworkSettings::default(),
            LanguageSettings::default(),
        );

        assert_eq!(request.message_history.len(), 2);
        assert_eq!(request.message_history[1].sections.len(), 1);
        assert_eq!(
            request.message_history[1].sections[0].message_type,
            MessageType::Text
        );
        // The caller's history is untouched
        assert_eq!(history[1].sections.len(), 2);
    }

    #[test]
    fn test_user_message_wire_format() {
        let request = UserMessage::new(
            &[Message::from_user("hi")],
            NetworkSettings::default(),
            LanguageSettings::default(),
        )
        .with_aliases(&Aliases::new())
        .with_plugins(&[]);
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("message_history").is_some());
        assert!(json.get("network_settings").is_some());
        assert!(json.get("language_settings").is_some());
        assert!(json.get("aliases").is_none());
        assert!(json.get("plugin_list").is_none());
        assert_eq!(json["message_history"][0]["sender"], "You");
        assert_eq!(
            json["message_history"][0]["sections"][0]["messageType"],
            "text"
        );
    }

    #[test]
    fn test_user_message_includes_aliases() {
        let aliases = Aliases::from([("core".to_string(), "10.0.0.1".to_string())]);
        let request = UserMessage::new(&[], NetworkSettings::default(), LanguageSettings::default())
            .with_aliases(&aliases);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["aliases"]["core"], "10.0.0.1");
    }
}
