//! # Sentry-SMS Service
//!
//! Binary entry point for the Sentry-SMS relay.
//!
//! This executable:
//! - Loads configuration from files and the environment
//! - Initializes structured logging
//! - Builds the Twilio sender and the relay pipeline
//! - Starts the HTTP server from sentry-sms-api

use anyhow::Context;
use sentry_sms_api::{
    build_relay, config::CONFIG_FILE_ENV, start_server, ServiceConfig, Settings,
};
use sentry_sms_core::adapters::TwilioSender;
use sentry_sms_core::SmsSender;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "sentry_sms_service=info,sentry_sms_api=info,sentry_sms_core=info,tower_http=info";

#[tokio::main]
async fn main() {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order; later sources override earlier ones):
    //  1. /etc/sentry-sms/service.yaml     system-wide defaults
    //  2. ./config/service.yaml            deployment-local override
    //  3. Path given by SENTRY_SMS_CONFIG_FILE
    //  4. Environment variables, e.g. PORT=8080 or NOTIFICATION_NUMBERS=+1555...
    //
    // Raw settings are read before logging starts because LOG_FORMAT picks the
    // log layer.
    // -------------------------------------------------------------------------
    let explicit_file = std::env::var(CONFIG_FILE_ENV).ok();
    let settings = Settings::load(explicit_file.as_deref(), None);

    let json_logs = settings
        .as_ref()
        .ok()
        .and_then(|s| s.log_format.as_deref())
        .is_some_and(|f| f.eq_ignore_ascii_case("json"));
    init_logging(json_logs);

    info!("Starting Sentry-SMS Service");

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    let config = match ServiceConfig::from_settings(settings) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Service configuration is invalid; aborting");
            std::process::exit(3);
        }
    };

    let sender = match build_sender(&config) {
        Ok(sender) => sender,
        Err(e) => {
            error!(error = ?e, "Failed to initialize SMS sender; aborting");
            std::process::exit(3);
        }
    };

    if config.webhook_secret.as_ref().map_or(true, |s| s.is_empty()) {
        warn!("SENTRY_CLIENT_SECRET is not set; webhook signatures will not be verified");
    }
    info!(
        default_recipients = config.notifications.default_recipients.len(),
        routed_projects = config.notifications.routes.len(),
        sms_enabled = sender.is_some(),
        "Relay configured"
    );

    let relay = Arc::new(build_relay(&config, sender));

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(config, relay).await {
        error!(error = %e, exit_code = e.exit_code(), "Server failed");
        std::process::exit(e.exit_code());
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Build the Twilio sender, or `None` when credentials are incomplete
fn build_sender(config: &ServiceConfig) -> anyhow::Result<Option<Arc<dyn SmsSender>>> {
    let Some(twilio) = config.twilio.clone() else {
        return Ok(None);
    };

    let sender = TwilioSender::new(twilio).context("invalid Twilio configuration")?;
    info!(endpoint = %sender.messages_url(), "Twilio SMS sender ready");

    Ok(Some(Arc::new(sender)))
}
