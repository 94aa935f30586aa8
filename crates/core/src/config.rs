use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub email: EmailConfig,
    pub messaging: MessagingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Public origin used when download links are embedded in outbound
    /// messages, e.g. `https://quotes.example.com`.
    pub public_base_url: String,
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub output_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub wkhtmltopdf_path: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub relay_url: String,
    pub api_token: Option<SecretString>,
    pub sender_name: String,
    pub sender_address: String,
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        let has_token = self
            .api_token
            .as_ref()
            .map(|token| !token.expose_secret().trim().is_empty())
            .unwrap_or(false);
        has_token && !self.sender_address.trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct MessagingConfig {
    pub api_url: String,
    pub api_key: Option<SecretString>,
    pub sender_key: String,
    pub template_code: String,
}

impl MessagingConfig {
    pub fn is_configured(&self) -> bool {
        let has_key = self
            .api_key
            .as_ref()
            .map(|key| !key.expose_secret().trim().is_empty())
            .unwrap_or(false);
        has_key && !self.sender_key.trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                public_base_url: "http://localhost:8080".to_string(),
            },
            generation: GenerationConfig {
                output_dir: PathBuf::from("artifacts"),
                template_dir: None,
                wkhtmltopdf_path: None,
            },
            email: EmailConfig {
                relay_url: "https://api.mail-relay.example.com/v1/messages".to_string(),
                api_token: None,
                sender_name: "Adpanel".to_string(),
                sender_address: String::new(),
            },
            messaging: MessagingConfig {
                api_url: "https://api.alimtalk-agency.example.com/v4/send".to_string(),
                api_key: None,
                sender_key: String::new(),
                template_code: String::new(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("adpanel.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(public_base_url) = server.public_base_url {
                self.server.public_base_url = public_base_url;
            }
        }

        if let Some(generation) = patch.generation {
            if let Some(output_dir) = generation.output_dir {
                self.generation.output_dir = PathBuf::from(output_dir);
            }
            if let Some(template_dir) = generation.template_dir {
                self.generation.template_dir = Some(PathBuf::from(template_dir));
            }
            if let Some(wkhtmltopdf_path) = generation.wkhtmltopdf_path {
                self.generation.wkhtmltopdf_path = Some(wkhtmltopdf_path);
            }
        }

        if let Some(email) = patch.email {
            if let Some(relay_url) = email.relay_url {
                self.email.relay_url = relay_url;
            }
            if let Some(api_token) = email.api_token {
                self.email.api_token = Some(api_token.into());
            }
            if let Some(sender_name) = email.sender_name {
                self.email.sender_name = sender_name;
            }
            if let Some(sender_address) = email.sender_address {
                self.email.sender_address = sender_address;
            }
        }

        if let Some(messaging) = patch.messaging {
            if let Some(api_url) = messaging.api_url {
                self.messaging.api_url = api_url;
            }
            if let Some(api_key) = messaging.api_key {
                self.messaging.api_key = Some(api_key.into());
            }
            if let Some(sender_key) = messaging.sender_key {
                self.messaging.sender_key = sender_key;
            }
            if let Some(template_code) = messaging.template_code {
                self.messaging.template_code = template_code;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ADPANEL_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ADPANEL_SERVER_PORT") {
            self.server.port = parse_u16("ADPANEL_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("ADPANEL_SERVER_PUBLIC_BASE_URL") {
            self.server.public_base_url = value;
        }

        if let Some(value) = read_env("ADPANEL_GENERATION_OUTPUT_DIR") {
            self.generation.output_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("ADPANEL_GENERATION_TEMPLATE_DIR") {
            self.generation.template_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("ADPANEL_GENERATION_WKHTMLTOPDF_PATH") {
            self.generation.wkhtmltopdf_path = Some(value);
        }

        if let Some(value) = read_env("ADPANEL_EMAIL_RELAY_URL") {
            self.email.relay_url = value;
        }
        if let Some(value) = read_env("ADPANEL_EMAIL_API_TOKEN") {
            self.email.api_token = Some(value.into());
        }
        if let Some(value) = read_env("ADPANEL_EMAIL_SENDER_NAME") {
            self.email.sender_name = value;
        }
        if let Some(value) = read_env("ADPANEL_EMAIL_SENDER_ADDRESS") {
            self.email.sender_address = value;
        }

        if let Some(value) = read_env("ADPANEL_MESSAGING_API_URL") {
            self.messaging.api_url = value;
        }
        if let Some(value) = read_env("ADPANEL_MESSAGING_API_KEY") {
            self.messaging.api_key = Some(value.into());
        }
        if let Some(value) = read_env("ADPANEL_MESSAGING_SENDER_KEY") {
            self.messaging.sender_key = value;
        }
        if let Some(value) = read_env("ADPANEL_MESSAGING_TEMPLATE_CODE") {
            self.messaging.template_code = value;
        }

        let log_level = read_env("ADPANEL_LOGGING_LEVEL").or_else(|| read_env("ADPANEL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ADPANEL_LOGGING_FORMAT").or_else(|| read_env("ADPANEL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.generation.output_dir = output_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be greater than zero".to_string(),
            ));
        }
        validate_http_url("server.public_base_url", &self.server.public_base_url)?;

        if self.generation.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "generation.output_dir must not be empty".to_string(),
            ));
        }

        validate_http_url("email.relay_url", &self.email.relay_url)?;
        validate_http_url("messaging.api_url", &self.messaging.api_url)?;

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must start with http:// or https://")))
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("adpanel.toml"), PathBuf::from("config/adpanel.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    generation: Option<GenerationPatch>,
    email: Option<EmailPatch>,
    messaging: Option<MessagingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    public_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationPatch {
    output_dir: Option<String>,
    template_dir: Option<String>,
    wkhtmltopdf_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EmailPatch {
    relay_url: Option<String>,
    api_token: Option<String>,
    sender_name: Option<String>,
    sender_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagingPatch {
    api_url: Option<String>,
    api_key: Option<String>,
    sender_key: Option<String>,
    template_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
