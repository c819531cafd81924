use crate::auth::{CredentialStore, Credentials};
use crate::config::Config;
use crate::message::MessageType;
use crate::parser::format_code_content;
use crate::session::{ChatSession, SubmitError};
use crate::tui::help_text;
use crate::tui::requests::{Reply, RequestWorker};
use crate::tui::terminal_compat::ColorMode;
use crate::tui::theme::Theme;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long a status bar message stays visible
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

pub struct App {
    pub config: Config,
    config_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    store: CredentialStore,
    pub credentials: Option<Credentials>,
    pub session: ChatSession,

    pub input: String,
    pub chat_scroll: u16,
    /// Keep the newest message in view as the conversation grows
    pub follow_tail: bool,
    /// Set by the renderer: visible chat rows and total chat lines
    pub chat_viewport: u16,
    pub chat_lines: u16,
    /// Index into `session.code_sections()`
    pub selected_code: Option<usize>,
    /// Scroll the selected code section into view on the next frame
    pub reveal_selection: bool,

    pub show_help: bool,
    pub help_scroll: u16,
    pub show_settings: bool,
    pub status_message: Option<String>,
    status_set_at: Option<Instant>,
    pub theme: Theme,
    /// Frame counter driving the progress indicator
    pub tick: usize,
    pub should_quit: bool,

    worker: Option<RequestWorker>,

    // Persistent clipboard for Linux X11 compatibility
    // On Linux, the clipboard instance must stay alive to serve paste requests
    clipboard: Option<arboard::Clipboard>,
}

impl App {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        store: CredentialStore,
        worker: Option<RequestWorker>,
        color_mode: ColorMode,
    ) -> Self {
        let credentials = store.load();
        let session = ChatSession::with_greeting(config.greeting.as_deref());

        Self {
            config,
            config_path,
            log_path: None,
            store,
            credentials,
            session,
            input: String::new(),
            chat_scroll: 0,
            follow_tail: true,
            chat_viewport: 0,
            chat_lines: 0,
            selected_code: None,
            reveal_selection: false,
            show_help: false,
            help_scroll: 0,
            show_settings: false,
            status_message: None,
            status_set_at: None,
            theme: Theme::default().with_color_mode(color_mode),
            tick: 0,
            should_quit: false,
            worker,
            // Initialize persistent clipboard (None if unavailable)
            clipboard: arboard::Clipboard::new().ok(),
        }
    }

    pub fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }

    /// Ask the server for a greeting when a new chat can be started.
    pub fn request_greeting(&self) {
        if let Some(worker) = &self.worker {
            if self.credentials.is_some() {
                worker.fetch_greeting();
            }
        }
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Platform badge text: the configured device type
    pub fn platform(&self) -> Option<&str> {
        self.config
            .network
            .as_ref()
            .map(|n| n.device_type.as_str())
            .filter(|d| !d.is_empty())
    }

    /// Language badge text: the configured language model
    pub fn language(&self) -> Option<&str> {
        self.config
            .language
            .as_ref()
            .map(|l| l.name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn username(&self) -> Option<String> {
        self.credentials.as_ref().and_then(Credentials::username)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_expired_status_message(&mut self) {
        if let Some(set_at) = self.status_set_at {
            if set_at.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status_message = None;
                self.status_set_at = None;
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening help
            self.show_settings = false;
        }
    }

    pub fn scroll_help_down(&mut self) {
        let new_scroll = self.help_scroll.saturating_add(1);
        let max_scroll = help_text::help_line_count() as u16;
        if new_scroll < max_scroll {
            self.help_scroll = new_scroll;
        }
    }

    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    pub fn toggle_settings(&mut self) {
        self.show_settings = !self.show_settings;
        if self.show_settings {
            self.show_help = false;
        }
    }

    /// Close the topmost popup or notification. Returns false if nothing
    /// was open.
    pub fn dismiss(&mut self) -> bool {
        if self.show_help {
            self.show_help = false;
        } else if self.show_settings {
            self.show_settings = false;
        } else if self.session.error().is_some() {
            self.session.dismiss_error();
        } else if self.selected_code.is_some() {
            self.selected_code = None;
        } else {
            return false;
        }
        true
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn insert_newline(&mut self) {
        self.input.push('\n');
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Send the input box contents. The input is kept when sending fails
    /// so nothing typed is lost.
    pub fn send_input(&mut self) {
        // Pick up a `netgpt login` done in another terminal
        if self.credentials.is_none() {
            self.credentials = self.store.load();
        }

        match self
            .session
            .submit(&self.input, &self.config, self.credentials.as_ref())
        {
            Ok(request) => {
                self.input.clear();
                self.follow_tail = true;
                match &self.worker {
                    Some(worker) => worker.send_chat(request),
                    None => self
                        .session
                        .fail("Please configure the server settings."),
                }
            }
            Err(SubmitError::Empty) => {}
            Err(SubmitError::Busy) => self.set_status("⏳ Waiting for the previous reply"),
            Err(SubmitError::NotReady(readiness)) => {
                tracing::debug!(?readiness, "send blocked");
                if let Some(hint) = readiness.hint() {
                    self.set_status(format!("Run `{hint}`"));
                }
            }
        }
    }

    pub fn new_chat(&mut self) {
        if self.session.is_waiting() {
            self.set_status("⏳ Waiting for the previous reply");
            return;
        }
        self.session.clear();
        if let Some(greeting) = self.config.greeting.as_deref() {
            self.session.set_greeting(greeting);
        }
        self.selected_code = None;
        self.chat_scroll = 0;
        self.follow_tail = true;
        self.set_status("✓ New chat");
    }

    /// Apply replies from finished requests.
    pub fn check_for_replies(&mut self) {
        let Some(worker) = &self.worker else {
            return;
        };
        for reply in worker.check_for_replies() {
            match reply {
                Reply::Chat(Ok(message)) => {
                    self.session.receive(message);
                    self.follow_tail = true;
                }
                Reply::Chat(Err(error)) => self.session.fail(error),
                Reply::Greeting(Ok(message)) => {
                    let text = message.plain_text();
                    self.session.set_greeting(&text);
                    self.cache_greeting(text);
                }
                // A missing greeting is not worth interrupting the user for
                Reply::Greeting(Err(_)) => {}
            }
        }
    }

    fn cache_greeting(&mut self, text: String) {
        if self.config.greeting.as_deref() == Some(text.as_str()) {
            return;
        }
        self.config.set_greeting(Some(text));
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                tracing::warn!("could not cache greeting: {e}");
            }
        }
    }

    pub fn code_section_count(&self) -> usize {
        self.session.code_sections().len()
    }

    /// Content of the selected code section.
    pub fn selected_code_content(&self) -> Option<&str> {
        let index = self.selected_code?;
        let (m, s) = *self.session.code_sections().get(index)?;
        let section = self.session.history().get(m)?.sections.get(s)?;
        (section.message_type == MessageType::Code).then_some(section.content.as_str())
    }

    pub fn next_code_section(&mut self) {
        let count = self.code_section_count();
        if count == 0 {
            self.set_status("No code sections in this chat");
            return;
        }
        self.selected_code = Some(match self.selected_code {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        });
        self.reveal_selection = true;
        self.follow_tail = false;
        self.code_selection_status(count);
    }

    pub fn previous_code_section(&mut self) {
        let count = self.code_section_count();
        if count == 0 {
            self.set_status("No code sections in this chat");
            return;
        }
        self.selected_code = Some(match self.selected_code {
            Some(i) if i > 0 => i - 1,
            _ => count - 1,
        });
        self.reveal_selection = true;
        self.follow_tail = false;
        self.code_selection_status(count);
    }

    fn code_selection_status(&mut self, count: usize) {
        if let Some(i) = self.selected_code {
            self.set_status(format!("Code section {}/{} • Ctrl+Y:Copy", i + 1, count));
        }
    }

    /// Copy the selected code section, formatted the way it is displayed.
    pub fn copy_selected_code(&mut self) {
        let Some(content) = self.selected_code_content() else {
            self.set_status("Select a code section with Tab first");
            return;
        };
        let text = format_code_content(content);
        match self.copy_to_clipboard(&text) {
            Ok(()) => self.set_status("✓ Code copied to clipboard"),
            Err(e) => self.set_status(format!("✗ {e}")),
        }
    }

    /// Copy text to clipboard
    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), String> {
        if let Some(clipboard) = &mut self.clipboard {
            clipboard
                .set_text(text.to_string())
                .map_err(|e| format!("Clipboard error: {}", e))?;
            Ok(())
        } else {
            Err("Clipboard not available".to_string())
        }
    }

    fn max_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.chat_viewport)
    }

    pub fn scroll_page_up(&mut self) {
        let page = self.chat_viewport.saturating_sub(1).max(1);
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.min(self.max_scroll()).saturating_sub(page);
    }

    pub fn scroll_page_down(&mut self) {
        let page = self.chat_viewport.saturating_sub(1).max(1);
        self.chat_scroll = self.chat_scroll.saturating_add(page).min(self.max_scroll());
        if self.chat_scroll >= self.max_scroll() {
            self.follow_tail = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_tail = false;
        self.chat_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.chat_scroll = self.max_scroll();
    }

    /// Called by the renderer once the chat has been laid out.
    ///
    /// `selection_line` is the first line of the selected code section.
    pub fn update_chat_metrics(&mut self, lines: u16, viewport: u16, selection_line: Option<u16>) {
        self.chat_lines = lines;
        self.chat_viewport = viewport;

        if self.reveal_selection {
            self.reveal_selection = false;
            if let Some(line) = selection_line {
                let visible = self.chat_scroll..self.chat_scroll.saturating_add(viewport);
                if !visible.contains(&line) {
                    self.chat_scroll = line.saturating_sub(1);
                }
            }
        }

        if self.follow_tail {
            self.chat_scroll = self.max_scroll();
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_scroll());
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.clear_expired_status_message();
    }

    /// Drop stored credentials that were removed outside the TUI.
    pub fn reload_credentials(&mut self) {
        self.credentials = self.store.load();
    }
}
