//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::auth::{hash_password, is_digest};

pub use cli::{
    CliArgs, Command, HashPasswordArgs, RenderArgs, RenderOverrides, ServeArgs, ServeOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "homeblog";
const ENV_PREFIX: &str = "HOMEBLOG";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_TOKEN_LIFETIME: &str = "24h";
pub(crate) const DEFAULT_PASSWORD_SALT: &str = "home_blog_salt_change_in_production";
pub(crate) const DEFAULT_TOKEN_SECRET: &str = "home_blog_admin_secret_key_change_in_production";
pub(crate) const DEFAULT_ADMIN_PASSWORD: &str = "20060216";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub auth: AuthSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Clone)]
pub struct AuthSettings {
    pub password_salt: String,
    pub token_secret: String,
    pub token_lifetime: Duration,
    /// The lifetime exactly as configured, reported to clients.
    pub token_lifetime_label: String,
    pub admin_password_hash: String,
    /// Keys that fell back to insecure built-in values.
    pub defaulted: Vec<&'static str>,
    pub expose_hash_tool: bool,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("password_salt", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("admin_password_hash", &self.admin_password_hash)
            .field("defaulted", &self.defaulted)
            .field("expose_hash_tool", &self.expose_hash_tool)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub sanitize_html: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.auth.apply_legacy_env(|name| std::env::var(name).ok());

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_render_overrides(&args.overrides),
        Some(Command::HashPassword(_)) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    auth: RawAuthSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(lifetime) = overrides.token_lifetime.as_ref() {
            self.auth.token_lifetime = Some(lifetime.clone());
        }
        if let Some(expose) = overrides.expose_hash_tool {
            self.auth.expose_hash_tool = Some(expose);
        }
        self.apply_render_overrides(&overrides.render);
    }

    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(sanitize) = overrides.sanitize_html {
            self.render.sanitize_html = Some(sanitize);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            auth,
            render,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            auth: build_auth_settings(auth)?,
            render: build_render_settings(render),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let mut defaulted = Vec::new();

    let password_salt = match non_blank(auth.password_salt) {
        Some(salt) => salt,
        None => {
            defaulted.push("auth.password_salt");
            DEFAULT_PASSWORD_SALT.to_string()
        }
    };

    let token_secret = match non_blank(auth.token_secret) {
        Some(secret) => secret,
        None => {
            defaulted.push("auth.token_secret");
            DEFAULT_TOKEN_SECRET.to_string()
        }
    };

    let admin_password_hash = match non_blank(auth.admin_password_hash) {
        Some(hash) if is_digest(&hash) => hash.to_ascii_lowercase(),
        Some(_) => {
            return Err(LoadError::invalid(
                "auth.admin_password_hash",
                "expected a 64 character hex SHA-256 digest",
            ));
        }
        None => {
            defaulted.push("auth.admin_password_hash");
            hash_password(DEFAULT_ADMIN_PASSWORD, &password_salt)
        }
    };

    let token_lifetime_label = non_blank(auth.token_lifetime)
        .unwrap_or_else(|| DEFAULT_TOKEN_LIFETIME.to_string());
    let token_lifetime = parse_duration(&token_lifetime_label)
        .map_err(|reason| LoadError::invalid("auth.token_lifetime", reason))?;

    if auth.require_explicit_secrets.unwrap_or(false) && !defaulted.is_empty() {
        return Err(LoadError::invalid(
            "auth.require_explicit_secrets",
            format!("missing required secrets: {}", defaulted.join(", ")),
        ));
    }

    Ok(AuthSettings {
        password_salt,
        token_secret,
        token_lifetime,
        token_lifetime_label,
        admin_password_hash,
        defaulted,
        expose_hash_tool: auth.expose_hash_tool.unwrap_or(false),
    })
}

fn build_render_settings(render: RawRenderSettings) -> RenderSettings {
    RenderSettings {
        sanitize_html: render.sanitize_html.unwrap_or(false),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    password_salt: Option<String>,
    token_secret: Option<String>,
    token_lifetime: Option<String>,
    admin_password_hash: Option<String>,
    require_explicit_secrets: Option<bool>,
    expose_hash_tool: Option<bool>,
}

/// Unprefixed variable names accepted for the auth secrets, below `HOMEBLOG__AUTH__*`.
const LEGACY_AUTH_ENV: [(&str, LegacyAuthKey); 4] = [
    ("PASSWORD_SALT", LegacyAuthKey::PasswordSalt),
    ("JWT_SECRET", LegacyAuthKey::TokenSecret),
    ("JWT_EXPIRES_IN", LegacyAuthKey::TokenLifetime),
    ("ADMIN_PASSWORD_HASH", LegacyAuthKey::AdminPasswordHash),
];

#[derive(Debug, Clone, Copy)]
enum LegacyAuthKey {
    PasswordSalt,
    TokenSecret,
    TokenLifetime,
    AdminPasswordHash,
}

impl RawAuthSettings {
    fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (name, key) in LEGACY_AUTH_ENV {
            let slot = match key {
                LegacyAuthKey::PasswordSalt => &mut self.password_salt,
                LegacyAuthKey::TokenSecret => &mut self.token_secret,
                LegacyAuthKey::TokenLifetime => &mut self.token_lifetime,
                LegacyAuthKey::AdminPasswordHash => &mut self.admin_password_hash,
            };
            if slot.is_none() {
                *slot = lookup(name).map(|value| match key {
                    LegacyAuthKey::TokenLifetime => legacy_token_lifetime(value),
                    _ => value,
                });
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    sanitize_html: Option<bool>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Parse a lifetime such as `3600`, `30m`, `2.5h`, `7 days` or `1w`.
///
/// A bare number is seconds. Units are case-insensitive, may be spelled out
/// and may be separated from the number by spaces; `y` is 365.25 days.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let invalid = || format!("invalid duration `{input}`; expected e.g. 3600, 30m, 2.5h, 7 days");
    let split = input
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let unit_ms = duration_unit_millis(&unit.trim_start().to_ascii_lowercase()).ok_or_else(invalid)?;
    let value: f64 = number.parse().map_err(|_| invalid())?;

    let millis = (value * unit_ms).round();
    if !millis.is_finite() || millis >= u64::MAX as f64 {
        return Err(format!("duration `{input}` is too large"));
    }
    Ok(Duration::from_millis(millis as u64))
}

fn duration_unit_millis(unit: &str) -> Option<f64> {
    const SECOND: f64 = 1_000.0;
    const DAY: f64 = 86_400.0 * SECOND;

    let millis = match unit {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => SECOND,
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0 * SECOND,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600.0 * SECOND,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => 7.0 * DAY,
        "y" | "yr" | "yrs" | "year" | "years" => 365.25 * DAY,
        _ => return None,
    };
    Some(millis)
}

/// `JWT_EXPIRES_IN` historically read a bare number as milliseconds.
fn legacy_token_lifetime(value: String) -> String {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        format!("{trimmed}ms")
    } else {
        value
    }
}
