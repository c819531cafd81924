//! # netgpt
//!
//! A terminal client for NetGPT, a network assistant that answers questions
//! about network devices using a language model.
//!
//! Replies arrive as Markdown. They are split into text sections and code
//! sections (device output), which the TUI renders, selects and copies
//! separately.
//!
//! ## Example
//!
//! ```rust
//! use netgpt::{SectionKind, parse_sections};
//!
//! let reply = "Interfaces on core-1:\n```\nGi0/1 up\nGi0/2 down\n```\nOne is down.";
//! let sections = parse_sections(reply);
//!
//! assert_eq!(sections.len(), 3);
//! assert_eq!(sections[1].kind, SectionKind::Code);
//! assert_eq!(sections[1].content, "Gi0/1 up\nGi0/2 down\n");
//! ```

/// HTTP client for the NetGPT server.
pub mod api;

/// SSO login, token refresh and credential storage.
pub mod auth;

/// Configuration module for persisting user preferences.
///
/// Holds the server URL, device and language settings, aliases and UI
/// preferences in `config.toml`.
pub mod config;

/// File logging setup.
pub mod logging;

/// Chat message envelopes exchanged with the server.
pub mod message;

/// Parser module for bot replies.
///
/// Splits Markdown into text and code sections.
pub mod parser;

/// Conversation state and send readiness.
pub mod session;

/// Device, language and plugin settings.
pub mod settings;

/// TUI module for the interactive chat.
pub mod tui;

// Re-export commonly used types for convenience
pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthServerInformation, CredentialStore, Credentials};
pub use config::Config;
pub use message::{BotMessage, Message, MessageSection, MessageType, SenderType, UserMessage};
pub use parser::{Section, SectionKind, parse_file, parse_sections};
pub use session::{ChatSession, Readiness};
pub use tui::App;
