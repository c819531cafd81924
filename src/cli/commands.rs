use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[cfg(feature = "unstable-dynamic")]
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate, ValueCompleter};

#[derive(Parser, Debug)]
#[command(name = "netgpt")]
#[command(version)]
#[command(about = "Chat with a NetGPT server from the terminal")]
#[command(
    long_about = "netgpt - A terminal client for NetGPT, the network assistant.\n\n\
    Launch without a subcommand for the interactive chat. Replies are split into\n\
    text and code sections; code sections can be selected and copied.\n\n\
    Examples:\n  \
    netgpt config server https://netgpt.example.com   # Point at a server\n  \
    netgpt login --username admin                     # Sign in\n  \
    netgpt                                            # Interactive chat\n  \
    netgpt ask show interfaces on core-1              # One-shot question\n  \
    netgpt parse reply.md -o json                     # Sectionize offline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Use this config file instead of the default location
    ///
    /// Credentials are kept in `auth.json` next to the config file.
    #[arg(long = "config", value_name = "PATH", global = true, env = "NETGPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force color mode (auto, rgb, 256)
    ///
    /// Override automatic terminal detection:
    ///   auto - Detect terminal capabilities (default)
    ///   rgb  - Force true color (16M colors)
    ///   256  - Force 256-color palette
    #[arg(long = "color-mode", value_name = "MODE", global = true)]
    pub color_mode: Option<ColorModeArg>,

    /// Log more detail to the log file (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorModeArg {
    /// Automatically detect terminal capabilities
    Auto,
    /// Force RGB/true color mode
    Rgb,
    /// Force 256-color mode
    #[value(name = "256")]
    Color256,
}

impl ColorModeArg {
    pub fn as_setting(&self) -> &'static str {
        match self {
            ColorModeArg::Auto => "auto",
            ColorModeArg::Rgb => "rgb",
            ColorModeArg::Color256 => "256",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a Markdown reply into text and code sections
    ///
    /// Works offline. Reads the file, or stdin when the file is '-' or omitted.
    Parse {
        /// Markdown file to parse, or '-' for stdin
        #[arg(add = markdown_file_completer())]
        file: Option<PathBuf>,

        /// Output format
        ///
        ///   plain - Sections separated by headers (default)
        ///   json  - Sections with metadata, for scripting
        #[arg(short = 'o', long = "output", default_value = "plain")]
        output: OutputFormat,
    },

    /// Ask a single question and print the reply
    ///
    /// Uses the saved server, network and language settings.
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Sign in to the server's SSO provider
    Login {
        #[arg(short = 'u', long = "username")]
        username: String,

        /// Password (prompted for when omitted)
        #[arg(short = 'p', long = "password", env = "NETGPT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove stored credentials
    Logout,

    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// List the options the server supports
    Options {
        #[command(subcommand)]
        command: OptionsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current settings (secrets masked)
    Show,

    /// Set the NetGPT server URL, e.g. https://netgpt.example.com:8443
    Server { url: String },

    /// Set the credentials used to reach network devices
    Network(NetworkArgs),

    /// Choose a language model and fill in its fields
    ///
    /// Example: netgpt config language "Open AI" --field "API Key=sk-..."
    Language {
        /// Language name as listed by `netgpt options languages`
        name: String,

        /// A field value as KEY=VALUE (repeatable)
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Manage device aliases sent along with each message
    Alias {
        #[command(subcommand)]
        command: AliasCommand,
    },
}

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[arg(long = "username")]
    pub username: String,

    #[arg(long = "password", env = "NETGPT_DEVICE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Device platform as listed by `netgpt options devices`
    #[arg(long = "device-type", value_name = "TYPE")]
    pub device_type: String,

    #[arg(long = "enable-password")]
    pub enable_password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum AliasCommand {
    /// Add or replace an alias
    Set { label: String, value: String },
    /// Remove an alias
    Remove { label: String },
}

#[derive(Debug, Subcommand)]
pub enum OptionsCommand {
    /// Supported device types
    Devices,
    /// Available language models and their fields
    Languages,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(feature = "unstable-dynamic")]
fn markdown_file_completer() -> ArgValueCompleter {
    use std::ffi::OsStr;
    use std::path::Path;

    struct MarkdownCompleter;

    impl ValueCompleter for MarkdownCompleter {
        fn complete(&self, current: &OsStr) -> Vec<CompletionCandidate> {
            // e.g., "../docs/reply" -> directory="../docs", prefix="reply"
            let input_str = current.to_string_lossy();
            let input_path = Path::new(input_str.as_ref());

            let (search_dir, prefix) = if input_str.is_empty() {
                (Path::new("."), String::new())
            } else if input_str.ends_with('/') || input_str.ends_with('\\') {
                (input_path, String::new())
            } else {
                // parent() returns Some("") for bare file names
                let parent = input_path.parent().unwrap_or(Path::new("."));
                let dir = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                let prefix = input_path
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                (dir, prefix)
            };

            let Ok(entries) = std::fs::read_dir(search_dir) else {
                return vec![];
            };

            entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let path = entry.path();
                    let file_name = path.file_name()?.to_string_lossy().to_string();

                    if !prefix.is_empty()
                        && !file_name.to_lowercase().starts_with(&prefix.to_lowercase())
                    {
                        return None;
                    }

                    let completion_value = if search_dir == Path::new(".") {
                        file_name
                    } else {
                        search_dir.join(&file_name).to_string_lossy().to_string()
                    };

                    if path.is_dir() {
                        let mut dir_completion = completion_value;
                        if !dir_completion.ends_with('/') {
                            dir_completion.push('/');
                        }
                        return Some(
                            CompletionCandidate::new(dir_completion).help(Some("directory".into())),
                        );
                    }

                    let ext = path.extension()?.to_string_lossy().to_lowercase();
                    matches!(ext.as_str(), "md" | "markdown" | "txt")
                        .then(|| CompletionCandidate::new(completion_value))
                })
                .collect()
        }
    }

    ArgValueCompleter::new(MarkdownCompleter)
}

#[cfg(not(feature = "unstable-dynamic"))]
fn markdown_file_completer() -> clap::builder::ValueHint {
    clap::ValueHint::FilePath
}
