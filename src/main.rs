//! # netgpt
//!
//! Terminal client for NetGPT.
//!
//! ## Usage
//!
//! Launch the interactive chat:
//! ```sh
//! netgpt
//! ```
//!
//! Configure and sign in:
//! ```sh
//! netgpt config server https://netgpt.example.com
//! netgpt config network --username admin --password secret --device-type cisco_ios
//! netgpt config language "Open AI" --field "API Key=sk-..."
//! netgpt login --username alice
//! ```
//!
//! Split a saved reply into sections:
//! ```sh
//! netgpt parse reply.md --output json
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::{AliasCommand, Cli, Command, ConfigCommand, NetworkArgs, OptionsCommand, OutputFormat};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail, eyre};
use netgpt::auth::{self, Authenticator};
use netgpt::message::{Message, MessageType};
use netgpt::parser::{self, Section, format_code_content};
use netgpt::session::{ChatSession, Readiness, SubmitError};
use netgpt::settings::{LanguageSettings, NetworkSettings};
use netgpt::tui::{ColorMode, RequestWorker, TerminalCapabilities};
use netgpt::{ApiClient, App, Config, CredentialStore, Credentials};
use std::io::Read;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    color_eyre::install()?;

    // Handle dynamic shell completions
    #[cfg(feature = "unstable-dynamic")]
    clap_complete::CompleteEnv::with_factory(|| {
        use clap::CommandFactory;
        Cli::command()
    })
    .complete();

    let args = Cli::parse();
    let log_path = netgpt::logging::init(args.verbose);

    let config_path = args.config.clone().or_else(Config::config_path);
    let config = config_path
        .as_deref()
        .map(Config::load_from)
        .unwrap_or_default();
    let store = credential_store(args.config.as_deref())?;

    let command = match args.command {
        None => return run_tui(&args, config, config_path, store, log_path),
        Some(Command::Parse { file, output }) => return handle_parse(file.as_deref(), &output),
        Some(command) => command,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut ctx = Context {
        config,
        config_path,
        store,
    };
    runtime.block_on(handle_command(command, &mut ctx))
}

/// Credentials live next to the config file in use.
fn credential_store(config_override: Option<&Path>) -> Result<CredentialStore> {
    match config_override {
        Some(path) => {
            let dir = path.parent().unwrap_or(Path::new("."));
            Ok(CredentialStore::new(dir.join("auth.json")))
        }
        None => CredentialStore::default_location()
            .ok_or_else(|| eyre!("could not determine config directory")),
    }
}

fn run_tui(
    args: &Cli,
    config: Config,
    config_path: Option<PathBuf>,
    store: CredentialStore,
    log_path: Option<PathBuf>,
) -> Result<()> {
    use crossterm::ExecutableCommand;
    use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
    use std::io::stdout;

    // Detect terminal capabilities and determine color mode
    // Priority: CLI args > config file > auto-detection
    let caps = TerminalCapabilities::detect();
    let setting = args
        .color_mode
        .as_ref()
        .map(|mode| mode.as_setting())
        .unwrap_or(config.ui.color_mode.as_str());
    let color_mode = ColorMode::resolve(setting, &caps);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let worker = config
        .server()
        .and_then(|url| {
            ApiClient::new(url)
                .inspect_err(|e| tracing::warn!("not connecting: {e}"))
                .ok()
        })
        .map(|client| RequestWorker::new(runtime.handle().clone(), client, store.clone()));

    let app = App::new(config, config_path, store, worker, color_mode).with_log_path(log_path);

    let mut terminal = ratatui::init();
    stdout().execute(EnableBracketedPaste).ok();

    let result = netgpt::tui::run(&mut terminal, app);

    // Cleanup terminal state
    stdout().execute(DisableBracketedPaste).ok();
    ratatui::restore();

    // Don't wait for a chat request that is still in flight
    runtime.shutdown_background();
    result
}

fn handle_parse(file: Option<&Path>, output: &OutputFormat) -> Result<()> {
    let (markdown, source) = match file {
        None => (read_stdin()?, None),
        Some(path) if path == Path::new("-") => (read_stdin()?, None),
        Some(path) => (
            std::fs::read_to_string(path)
                .wrap_err_with(|| format!("could not read {}", path.display()))?,
            Some(path.display().to_string()),
        ),
    };

    let sections = parser::parse_sections(&markdown);
    match output {
        OutputFormat::Plain => print!("{}", plain_output(&sections)),
        OutputFormat::Json => {
            let json_output = parser::build_json_output(sections, source);
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        }
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .wrap_err("could not read stdin")?;
    Ok(input)
}

/// Sections separated by a header line naming their kind.
fn plain_output(sections: &[Section]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        out.push_str(&format!("── {} {} ──\n", section.kind, i + 1));
        out.push_str(&section.content);
    }
    out
}

/// State shared by the non-interactive commands.
struct Context {
    config: Config,
    config_path: Option<PathBuf>,
    store: CredentialStore,
}

impl Context {
    fn save_config(&self) -> Result<()> {
        let path = self
            .config_path
            .as_deref()
            .ok_or_else(|| eyre!("could not determine config directory"))?;
        self.config
            .save_to(path)
            .wrap_err_with(|| format!("could not save {}", path.display()))
    }

    fn client(&self) -> Result<ApiClient> {
        let url = self.config.server().ok_or_else(|| {
            eyre!(
                "{} Run `{}`.",
                Readiness::MissingServer.message().unwrap_or_default(),
                Readiness::MissingServer.hint().unwrap_or_default()
            )
        })?;
        Ok(ApiClient::new(url)?)
    }
}

async fn handle_command(command: Command, ctx: &mut Context) -> Result<()> {
    match command {
        Command::Ask { text } => handle_ask(&text.join(" "), ctx).await,
        Command::Login { username, password } => handle_login(&username, password, ctx).await,
        Command::Logout => {
            if ctx.store.clear()? {
                println!("✓ Logged out");
            } else {
                println!("Not logged in");
            }
            Ok(())
        }
        Command::Config { command } => handle_config(command, ctx).await,
        Command::Options { command } => handle_options(command, ctx).await,
        // Handled before the runtime starts
        Command::Parse { .. } => Ok(()),
    }
}

async fn handle_ask(question: &str, ctx: &mut Context) -> Result<()> {
    let markdown = ask(question, ctx).await?;
    termimad::MadSkin::default().print_text(&markdown);
    Ok(())
}

/// Send one question and return the sectionized reply as Markdown.
async fn ask(question: &str, ctx: &Context) -> Result<String> {
    let credentials = ctx.store.load();
    let readiness = Readiness::check(&ctx.config, credentials.as_ref());
    if let (Some(message), Some(hint)) = (readiness.message(), readiness.hint()) {
        bail!("{message} Run `{hint}`.");
    }

    let client = ctx.client()?;
    let token = auth::valid_token(&ctx.store).await?;

    let mut session = ChatSession::new();
    let request = session
        .submit(question, &ctx.config, credentials.as_ref())
        .map_err(|e| match e {
            SubmitError::Empty => eyre!("nothing to ask"),
            SubmitError::Busy => eyre!("a request is already pending"),
            SubmitError::NotReady(r) => eyre!("{}", r.message().unwrap_or("not ready")),
        })?;

    let reply = client
        .send_message(&request, &token)
        .await
        .wrap_err("NetGPT did not answer")?;
    session.receive(reply);

    let index = session.history().len() - 1;
    Ok(reply_markdown(&session.history()[index], session.caption(index)))
}

/// Markdown for printing a reply in the terminal.
fn reply_markdown(message: &Message, caption: Option<&str>) -> String {
    let mut out = String::new();
    for section in &message.sections {
        match section.message_type {
            MessageType::Text => out.push_str(&section.content),
            MessageType::Code => {
                let code = format_code_content(&section.content);
                out.push_str("```\n");
                out.push_str(code.trim_end_matches('\n'));
                out.push_str("\n```\n");
            }
            MessageType::Error => {
                out.push_str(&format!("**Error:** {}\n", section.content.trim_end()));
            }
        }
    }
    if let Some(caption) = caption {
        out.push_str(&format!("\n*{caption}*\n"));
    }
    out
}

async fn handle_login(username: &str, password: Option<String>, ctx: &mut Context) -> Result<()> {
    let client = ctx.client()?;
    let info = client
        .server_information()
        .await
        .wrap_err("could not get SSO server information")?;
    let authenticator = Authenticator::new(info)?;

    let password = match password {
        Some(password) => password,
        None => cli::prompt::read_password(&format!("Password for {username}: "))?,
    };

    let credentials = sign_in(ctx, &client, &authenticator, username, &password).await?;
    let name = credentials.username().unwrap_or_else(|| username.to_string());
    println!("✓ Logged in as {name}");
    Ok(())
}

/// Log in, store the tokens and cache the server greeting.
async fn sign_in(
    ctx: &mut Context,
    client: &ApiClient,
    authenticator: &Authenticator,
    username: &str,
    password: &str,
) -> Result<Credentials> {
    let credentials = authenticator.login(username, password).await?;
    ctx.store.save(&credentials)?;

    // Cache the greeting so the TUI can show it right away
    match client.greeting(&credentials.access_token).await {
        Ok(greeting) => {
            ctx.config.set_greeting(Some(greeting.plain_text()));
            ctx.save_config()?;
        }
        Err(e) => tracing::debug!("no greeting: {e}"),
    }
    Ok(credentials)
}

/// Point the config at a new server. Returns whether stored credentials
/// were removed.
///
/// Tokens and the cached greeting belong to the previous server, so both
/// are dropped when the URL actually changes.
fn change_server(ctx: &mut Context, url: &str) -> Result<bool> {
    let previous = ctx.config.server().map(str::to_string);
    ctx.config.set_server_url(url)?;
    let changed = previous.as_deref() != ctx.config.server();
    if changed {
        ctx.config.set_greeting(None);
    }
    ctx.save_config()?;
    Ok(changed && ctx.store.clear()?)
}

async fn handle_config(command: ConfigCommand, ctx: &mut Context) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print_config(ctx);
            Ok(())
        }
        ConfigCommand::Server { url } => {
            let signed_out = change_server(ctx, &url)?;
            println!("✓ Server set to {}", ctx.config.server().unwrap_or(&url));
            if signed_out {
                println!("Signed out of the previous server");
            }

            match ctx.client()?.server_information().await {
                Ok(info) => println!("  SSO: {} realm '{}' at {}", info.provider, info.realm, info.server),
                Err(e) => eprintln!("⚠ Server saved but not reachable: {e}"),
            }
            Ok(())
        }
        ConfigCommand::Network(args) => handle_network(args, ctx).await,
        ConfigCommand::Language { name, fields } => handle_language(&name, fields, ctx).await,
        ConfigCommand::Alias { command } => {
            match command {
                AliasCommand::Set { label, value } => {
                    ctx.config.set_alias(&label, &value);
                    ctx.save_config()?;
                    println!("✓ {label} → {value}");
                }
                AliasCommand::Remove { label } => match ctx.config.remove_alias(&label) {
                    Some(_) => {
                        ctx.save_config()?;
                        println!("✓ Removed {label}");
                    }
                    None => bail!("no alias named '{label}'"),
                },
            }
            Ok(())
        }
    }
}

async fn handle_network(args: NetworkArgs, ctx: &mut Context) -> Result<()> {
    // Check the device type against the server's list when it is reachable
    if let Ok(client) = ctx.client() {
        match client.device_types().await {
            Ok(options) if !options.contains(&args.device_type) => {
                bail!(
                    "unknown device type '{}'. Supported: {}",
                    args.device_type,
                    options.join(", ")
                );
            }
            Ok(_) => {}
            Err(e) => eprintln!("⚠ Could not verify device type: {e}"),
        }
    }

    ctx.config.set_network(NetworkSettings {
        username: args.username,
        password: args.password,
        device_type: args.device_type,
        enable_password: args.enable_password.filter(|p| !p.is_empty()),
    });
    ctx.save_config()?;
    println!("✓ Network settings saved");
    Ok(())
}

async fn handle_language(name: &str, fields: Vec<(String, String)>, ctx: &mut Context) -> Result<()> {
    let languages = ctx
        .client()?
        .languages()
        .await
        .wrap_err("could not fetch languages from the server")?;

    let Some(template) = languages
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(name))
    else {
        let names: Vec<&str> = languages.iter().map(|l| l.name.as_str()).collect();
        bail!("unknown language '{name}'. Available: {}", names.join(", "));
    };

    let mut language = merge_language(template, ctx.config.language.as_ref());
    for (key, value) in fields {
        match language.fields.get_mut(&key) {
            Some(slot) => *slot = value,
            None => {
                let known: Vec<&str> = language.fields.keys().map(String::as_str).collect();
                bail!(
                    "'{}' has no field '{key}'. Fields: {}",
                    language.name,
                    known.join(", ")
                );
            }
        }
    }

    let missing: Vec<String> = language
        .missing_fields()
        .into_iter()
        .map(str::to_string)
        .collect();
    let language_name = language.name.clone();
    ctx.config.set_language(language);
    ctx.save_config()?;
    println!("✓ Language set to {language_name}");
    if !missing.is_empty() {
        eprintln!("⚠ Still missing: {}", missing.join(", "));
    }
    Ok(())
}

/// Start from the server's template, keeping values already saved for the
/// same language.
fn merge_language(template: &LanguageSettings, current: Option<&LanguageSettings>) -> LanguageSettings {
    let mut language = template.clone();
    if let Some(current) = current.filter(|c| c.name == template.name) {
        for (key, value) in language.fields.iter_mut() {
            if let Some(saved) = current.fields.get(key) {
                *value = saved.clone();
            }
        }
    }
    language
}

async fn handle_options(command: OptionsCommand, ctx: &mut Context) -> Result<()> {
    let client = ctx.client()?;
    match command {
        OptionsCommand::Devices => {
            for device in client.device_types().await? {
                println!("{device}");
            }
        }
        OptionsCommand::Languages => {
            for language in client.languages().await? {
                println!("{}", language.name);
                if !language.description.is_empty() {
                    println!("  {}", language.description);
                }
                for field in language.fields.keys() {
                    println!("  --field \"{field}=...\"");
                }
            }
        }
    }
    Ok(())
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "(empty)" } else { "********" }
}

fn print_config(ctx: &Context) {
    let config = &ctx.config;
    println!("Server:    {}", config.server().unwrap_or("(not set)"));
    match ctx.store.load() {
        Some(credentials) => println!(
            "Login:     {}",
            credentials.username().unwrap_or_else(|| "(signed in)".to_string())
        ),
        None => println!("Login:     (logged out)"),
    }

    match &config.network {
        Some(network) => {
            println!("Network:");
            println!("  device type      {}", network.device_type);
            println!("  username         {}", network.username);
            println!("  password         {}", mask(&network.password));
            if let Some(enable) = &network.enable_password {
                println!("  enable password  {}", mask(enable));
            }
        }
        None => println!("Network:   (not set)"),
    }

    match &config.language {
        Some(language) => {
            println!("Language:  {}", language.name);
            for (field, value) in &language.fields {
                println!("  {field:<16} {}", mask(value));
            }
        }
        None => println!("Language:  (not set)"),
    }

    if !config.aliases.is_empty() {
        println!("Aliases:");
        for (label, value) in &config.aliases {
            println!("  {label} → {value}");
        }
    }

    println!("UI:        color mode {}, timestamps {}", config.ui.color_mode, config.ui.show_timestamps);
    if let Some(path) = &ctx.config_path {
        println!("Config:    {}", path.display());
    }
    println!("Auth:      {}", ctx.store.path().display());
    if let Some(path) = netgpt::logging::log_path() {
        println!("Log:       {}", path.display());
    }

    let readiness = Readiness::check(config, ctx.store.load().as_ref());
    if let (Some(message), Some(hint)) = (readiness.message(), readiness.hint()) {
        println!("\n{message} Run `{hint}`.");
    }
}
