//! Conversation state shared by the TUI and the `ask` command.

use crate::auth::Credentials;
use crate::config::Config;
use crate::message::{BotMessage, Message, MessageType, SenderType, UserMessage};

/// What is needed before a message can be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    MissingServer,
    MissingNetworkSettings,
    MissingLanguageSettings,
    LoggedOut,
}

impl Readiness {
    /// Check requirements in the order the user has to fix them.
    pub fn check(config: &Config, credentials: Option<&Credentials>) -> Self {
        if config.server().is_none() {
            Readiness::MissingServer
        } else if config.complete_network().is_none() {
            Readiness::MissingNetworkSettings
        } else if config.complete_language().is_none() {
            Readiness::MissingLanguageSettings
        } else if credentials.is_none() {
            Readiness::LoggedOut
        } else {
            Readiness::Ready
        }
    }

    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }

    /// User-facing explanation, `None` when ready.
    pub fn message(self) -> Option<&'static str> {
        match self {
            Readiness::Ready => None,
            Readiness::MissingServer
            | Readiness::MissingNetworkSettings
            | Readiness::MissingLanguageSettings => Some("Please configure the server settings."),
            Readiness::LoggedOut => Some("Please log in to the server."),
        }
    }

    /// A hint naming the command that fixes the problem.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Readiness::Ready => None,
            Readiness::MissingServer => Some("netgpt config server <URL>"),
            Readiness::MissingNetworkSettings => Some("netgpt config network --help"),
            Readiness::MissingLanguageSettings => Some("netgpt config language --help"),
            Readiness::LoggedOut => Some("netgpt login --username <NAME>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Input was empty or only whitespace
    Empty,
    /// A reply is still pending
    Busy,
    NotReady(Readiness),
}

#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<Message>,
    /// Caption of each message in `history`, by index
    captions: Vec<Option<String>>,
    waiting: bool,
    error: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with the server's greeting, if one is known.
    pub fn with_greeting(greeting: Option<&str>) -> Self {
        let mut session = Self::new();
        if let Some(text) = greeting.filter(|g| !g.trim().is_empty()) {
            session.push_greeting(text);
        }
        session
    }

    /// Replace a fresh conversation's opening message.
    ///
    /// Ignored once the user has sent something.
    pub fn set_greeting(&mut self, text: &str) {
        if self.history.iter().any(|m| m.sender == SenderType::You) {
            return;
        }
        self.history.clear();
        self.captions.clear();
        if !text.trim().is_empty() {
            self.push_greeting(text);
        }
    }

    fn push_greeting(&mut self, text: &str) {
        let greeting = BotMessage::quick(MessageType::Text, text).sectionized();
        self.push(greeting);
    }

    fn push(&mut self, reply: BotMessage) {
        self.history.push(reply.message);
        self.captions.push(reply.caption);
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn caption(&self, index: usize) -> Option<&str> {
        self.captions.get(index).and_then(|c| c.as_deref())
    }

    /// Positions of all code sections as `(message, section)` index pairs,
    /// oldest first.
    pub fn code_sections(&self) -> Vec<(usize, usize)> {
        self.history
            .iter()
            .enumerate()
            .flat_map(|(m, message)| {
                message
                    .sections
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.message_type == MessageType::Code)
                    .map(move |(s, _)| (m, s))
            })
            .collect()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Append the user's message and build the request for it.
    ///
    /// Nothing is appended when the input is blank, a reply is pending or the
    /// session is not ready. In the last case the readiness message becomes
    /// the current error.
    pub fn submit(
        &mut self,
        text: &str,
        config: &Config,
        credentials: Option<&Credentials>,
    ) -> Result<UserMessage, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.waiting {
            return Err(SubmitError::Busy);
        }
        let readiness = Readiness::check(config, credentials);
        let (true, Some(network), Some(language)) = (
            readiness.is_ready(),
            config.complete_network(),
            config.complete_language(),
        ) else {
            self.error = readiness.message().map(str::to_string);
            return Err(SubmitError::NotReady(readiness));
        };

        self.history.push(Message::from_user(text));
        self.captions.push(None);
        self.waiting = true;
        self.error = None;

        Ok(UserMessage::new(&self.history, network.clone(), language.clone())
            .with_aliases(&config.aliases)
            .with_plugins(&config.plugins))
    }

    /// Append a reply, split into text and code sections.
    pub fn receive(&mut self, reply: BotMessage) {
        self.waiting = false;
        self.push(reply.sectionized());
    }

    /// Record a failed request. The history is left as it was.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.waiting = false;
        self.error = Some(error.into());
    }

    /// Start a new chat.
    pub fn clear(&mut self) {
        self.history.clear();
        self.captions.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthServerInformation;
    use crate::message::MessageSection;
    use crate::settings::{LanguageSettings, NetworkSettings};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn config() -> Config {
        let mut config = Config::default();
        config.set_server_url("http://localhost:8000").unwrap();
        config.set_network(NetworkSettings {
            username: "admin".into(),
            password: "secret".into(),
            device_type: "cisco_ios".into(),
            enable_password: None,
        });
        config.set_language(LanguageSettings {
            name: "Open AI".into(),
            description: String::new(),
            fields: BTreeMap::from([("API Key".to_string(), "sk-test".to_string())]),
        });
        config
    }

    fn credentials() -> Credentials {
        Credentials {
            server: AuthServerInformation {
                provider: "keycloak".into(),
                server: "http://sso".into(),
                realm: "netgpt".into(),
                client_id: "netgpt".into(),
            },
            access_token: "token".into(),
            refresh_token: None,
            expires_at: Utc::now(),
            refresh_expires_at: None,
        }
    }

    #[test]
    fn test_readiness_order() {
        let creds = credentials();
        assert_eq!(
            Readiness::check(&Config::default(), Some(&creds)),
            Readiness::MissingServer
        );

        let mut partial = config();
        partial.network = None;
        assert_eq!(
            Readiness::check(&partial, Some(&creds)),
            Readiness::MissingNetworkSettings
        );

        assert_eq!(Readiness::check(&config(), None), Readiness::LoggedOut);
        assert!(Readiness::check(&config(), Some(&creds)).is_ready());
    }

    #[test]
    fn test_readiness_messages() {
        assert_eq!(
            Readiness::MissingLanguageSettings.message(),
            Some("Please configure the server settings.")
        );
        assert_eq!(
            Readiness::LoggedOut.message(),
            Some("Please log in to the server.")
        );
        assert_eq!(Readiness::Ready.message(), None);
    }

    #[test]
    fn test_submit_rejects_blank_input() {
        let mut session = ChatSession::new();
        let creds = credentials();
        assert_eq!(
            session.submit("   \n\t", &config(), Some(&creds)),
            Err(SubmitError::Empty)
        );
        assert!(session.history().is_empty());
        assert!(!session.is_waiting());
    }

    #[test]
    fn test_submit_when_not_ready_sets_error() {
        let mut session = ChatSession::new();
        let result = session.submit("show version", &config(), None);
        assert_eq!(result, Err(SubmitError::NotReady(Readiness::LoggedOut)));
        assert_eq!(session.error(), Some("Please log in to the server."));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_submit_builds_request() {
        let mut session = ChatSession::with_greeting(Some("Hi, I am NetGPT."));
        let mut config = config();
        config.set_alias("core", "10.0.0.1");
        let creds = credentials();

        let request = session.submit("show version", &config, Some(&creds)).unwrap();

        assert!(session.is_waiting());
        assert_eq!(session.history().len(), 2);
        assert_eq!(request.message_history.len(), 2);
        assert_eq!(request.message_history[1].sender, SenderType::You);
        assert_eq!(request.network_settings.device_type, "cisco_ios");
        assert_eq!(request.aliases.as_ref().unwrap()["core"], "10.0.0.1");
        assert!(request.plugin_list.is_none());

        assert_eq!(
            session.submit("again", &config, Some(&creds)),
            Err(SubmitError::Busy)
        );
    }

    #[test]
    fn test_receive_sectionizes_reply() {
        let mut session = ChatSession::new();
        let creds = credentials();
        session.submit("show run", &config(), Some(&creds)).unwrap();

        session.receive(BotMessage::quick(
            MessageType::Text,
            "Config:\n```\nhostname r1\n```",
        ));

        assert!(!session.is_waiting());
        let reply = &session.history()[1];
        assert_eq!(reply.sender, SenderType::NetGPT);
        assert_eq!(
            reply.sections,
            vec![
                MessageSection::new(MessageType::Text, "Config:\n"),
                MessageSection::new(MessageType::Code, "hostname r1\n"),
            ]
        );
    }

    #[test]
    fn test_caption_and_code_sections() {
        let mut session = ChatSession::with_greeting(Some("Hi"));
        let creds = credentials();
        session.submit("show ip int brief", &config(), Some(&creds)).unwrap();

        let mut reply = BotMessage::quick(MessageType::Text, "```\na\n```\nand\n```\nb\n```");
        reply.caption = Some("From core-1".into());
        session.receive(reply);

        assert_eq!(session.caption(0), None);
        assert_eq!(session.caption(2), Some("From core-1"));
        assert_eq!(session.code_sections(), vec![(2, 0), (2, 2)]);
    }

    #[test]
    fn test_fail_keeps_history() {
        let mut session = ChatSession::new();
        let creds = credentials();
        session.submit("ping", &config(), Some(&creds)).unwrap();
        session.fail("server replied 500: Internal Server Error");

        assert!(!session.is_waiting());
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.error(),
            Some("server replied 500: Internal Server Error")
        );
        session.dismiss_error();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_clear_starts_new_chat() {
        let mut session = ChatSession::with_greeting(Some("Hello"));
        assert_eq!(session.history().len(), 1);
        session.clear();
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_set_greeting_only_before_user_speaks() {
        let mut session = ChatSession::with_greeting(Some("Old"));
        session.set_greeting("New");
        assert_eq!(session.history()[0].sections[0].content, "New\n");

        let creds = credentials();
        session.submit("hi", &config(), Some(&creds)).unwrap();
        session.set_greeting("Newer");
        assert_eq!(session.history()[0].sections[0].content, "New\n");
    }
}
