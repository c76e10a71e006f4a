use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the homeblog binary.
#[derive(Debug, Parser)]
#[command(
    name = "homeblog",
    version,
    about = "Markdown rendering and admin credential service for a personal blog"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "HOMEBLOG_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// Print the salted digest of a password and the matching environment line.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
    /// Render a Markdown file to HTML on stdout.
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Run rendered HTML through the sanitizer.
    #[arg(
        long = "render-sanitize-html",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub sanitize_html: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub render: RenderOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the admin token lifetime (e.g. 3600, 30m, 24h, 7d).
    #[arg(long = "auth-token-lifetime", value_name = "DURATION")]
    pub token_lifetime: Option<String>,

    /// Enable the password hashing helper on `GET /api/auth/login`.
    #[arg(
        long = "auth-expose-hash-tool",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub expose_hash_tool: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct HashPasswordArgs {
    /// Plaintext password to hash with the configured salt.
    #[arg(value_name = "PASSWORD")]
    pub password: String,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: RenderOverrides,

    /// Markdown file to render.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Emit the ordered content segments as JSON instead of one HTML document.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub parts: bool,
}
