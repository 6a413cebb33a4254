//! Configuration types for the HTTP service
//!
//! Configuration is read once at startup into a flat [`Settings`] record whose
//! keys match the environment variable names (case-insensitive), then
//! resolved into the structured, immutable [`ServiceConfig`].

use crate::errors::ConfigError;
use sentry_sms_core::adapters::TwilioConfig;
use sentry_sms_core::routing::parse_recipient_list;
use sentry_sms_core::{RecipientRouter, RouteTable};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

/// System-wide configuration file (YAML), optional
pub const SYSTEM_CONFIG_FILE: &str = "/etc/sentry-sms/service";

/// Deployment-local configuration file (YAML), optional
pub const LOCAL_CONFIG_FILE: &str = "config/service";

/// Environment variable naming an operator-supplied configuration file
pub const CONFIG_FILE_ENV: &str = "SENTRY_SMS_CONFIG_FILE";

/// Raw configuration values as provided by files and the environment
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    pub twilio_api_base_url: String,
    pub sms_timeout_seconds: u64,

    /// Comma-separated default recipients
    pub notification_numbers: Option<String>,

    /// JSON object mapping project slug to recipient list
    pub project_notification_numbers: Option<String>,

    pub sentry_client_secret: Option<String>,

    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
    pub shutdown_timeout_seconds: u64,

    /// Fail startup instead of degrading when the route table is unparseable
    pub strict_route_table: bool,

    pub log_format: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
            twilio_api_base_url: sentry_sms_core::adapters::twilio::DEFAULT_API_BASE_URL
                .to_string(),
            sms_timeout_seconds: 10,
            notification_numbers: None,
            project_notification_numbers: None,
            sentry_client_secret: None,
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_size: 1024 * 1024, // 1MB
            shutdown_timeout_seconds: 30,
            strict_route_table: false,
            log_format: None,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<REDACTED>");

        f.debug_struct("Settings")
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_auth_token", &redact(&self.twilio_auth_token))
            .field("twilio_from_number", &self.twilio_from_number)
            .field("twilio_api_base_url", &self.twilio_api_base_url)
            .field("sms_timeout_seconds", &self.sms_timeout_seconds)
            .field("notification_numbers", &self.notification_numbers)
            .field(
                "project_notification_numbers",
                &self.project_notification_numbers,
            )
            .field("sentry_client_secret", &redact(&self.sentry_client_secret))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_body_size", &self.max_body_size)
            .field("shutdown_timeout_seconds", &self.shutdown_timeout_seconds)
            .field("strict_route_table", &self.strict_route_table)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Settings {
    /// Load settings from the standard sources.
    ///
    /// Sources are applied in order, later ones overriding earlier ones:
    ///  1. `/etc/sentry-sms/service.yaml` (optional)
    ///  2. `./config/service.yaml` (optional)
    ///  3. the file named by `explicit_file` (required when given)
    ///  4. environment variables; `env_override` replaces the process
    ///     environment when provided
    pub fn load(
        explicit_file: Option<&str>,
        env_override: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(
                config::File::with_name(SYSTEM_CONFIG_FILE)
                    .required(false)
                    .format(config::FileFormat::Yaml),
            )
            .add_source(
                config::File::with_name(LOCAL_CONFIG_FILE)
                    .required(false)
                    .format(config::FileFormat::Yaml),
            );

        if let Some(path) = explicit_file.filter(|p| !p.is_empty()) {
            info!(path = %path, "Loading configuration from explicit path");
            builder = builder.add_source(
                config::File::with_name(path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }

        let settings = builder
            .add_source(config::Environment::default().source(env_override))
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            host: settings.host,
            port: settings.port,
            shutdown_timeout_seconds: settings.shutdown_timeout_seconds,
            max_body_size: settings.max_body_size,
        }
    }
}

/// Who gets notified
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub routes: RouteTable,
    pub default_recipients: Vec<String>,
}

impl NotificationConfig {
    pub fn router(&self) -> RecipientRouter {
        RecipientRouter::new(self.routes.clone(), self.default_recipients.clone())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable text
    pub json: bool,
}

/// Service configuration
#[derive(Clone, Default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub notifications: NotificationConfig,

    /// `None` when any Twilio credential is missing
    pub twilio: Option<TwilioConfig>,

    /// Shared secret for webhook signatures; `None` disables verification
    pub webhook_secret: Option<Zeroizing<String>>,

    pub logging: LoggingConfig,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("server", &self.server)
            .field("notifications", &self.notifications)
            .field("twilio", &self.twilio)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .field("logging", &self.logging)
            .finish()
    }
}

impl ServiceConfig {
    /// Resolve raw settings into a service configuration.
    ///
    /// An unparseable route table is logged and replaced by an empty table,
    /// unless `strict_route_table` is set.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        if settings.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "max_body_size must be greater than zero".to_string(),
            });
        }

        let routes = match settings.project_notification_numbers.as_deref() {
            None => RouteTable::default(),
            Some(raw) if raw.trim().is_empty() => RouteTable::default(),
            Some(raw) => match RouteTable::parse(raw) {
                Ok(table) => table,
                Err(e) if settings.strict_route_table => return Err(e.into()),
                Err(e) => {
                    error!(
                        error = %e,
                        "Failed to parse PROJECT_NOTIFICATION_NUMBERS; falling back to an empty route table"
                    );
                    RouteTable::default()
                }
            },
        };

        let default_recipients = settings
            .notification_numbers
            .as_deref()
            .map(parse_recipient_list)
            .unwrap_or_default();

        let twilio = TwilioConfig::from_parts(
            settings.twilio_account_sid,
            settings.twilio_auth_token,
            settings.twilio_from_number,
        )
        .map(|c| {
            c.with_api_base_url(settings.twilio_api_base_url)
                .with_timeout(Duration::from_secs(settings.sms_timeout_seconds))
        });
        if twilio.is_none() {
            warn!("Twilio credentials incomplete; SMS delivery is disabled");
        }

        let json = settings
            .log_format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            server: ServerConfig {
                host: settings.host,
                port: settings.port,
                shutdown_timeout_seconds: settings.shutdown_timeout_seconds,
                max_body_size: settings.max_body_size,
            },
            notifications: NotificationConfig {
                routes,
                default_recipients,
            },
            twilio,
            webhook_secret: settings.sentry_client_secret.map(Zeroizing::new),
            logging: LoggingConfig { json },
        })
    }

    /// Load and resolve configuration in one step
    pub fn load(
        explicit_file: Option<&str>,
        env_override: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        Self::from_settings(Settings::load(explicit_file, env_override)?)
    }

    /// Secret as a plain string for building a signature verifier
    pub fn webhook_secret(&self) -> Option<String> {
        self.webhook_secret.as_ref().map(|s| s.as_str().to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
