use api_rest::RestConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log levels for this binary and the workspace crates it drives.
const LOG_DIRECTIVES: [&str; 4] = [
    "discharge_run=info",
    "discharge_core=info",
    "api_rest=info",
    "mail_relay=info",
];

fn log_filter() -> anyhow::Result<EnvFilter> {
    LOG_DIRECTIVES
        .iter()
        .try_fold(EnvFilter::from_default_env(), |filter, directive| -> anyhow::Result<_> {
            Ok(filter.add_directive(directive.parse()?))
        })
}

/// Main entry point for the discharge assistant
///
/// Loads `.env`, resolves configuration once and serves the REST API with Swagger UI.
///
/// # Environment Variables
/// - `DC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DC_MAIL_RELAY_URL`: mail relay base URL (default: "http://localhost:5000")
/// - `DC_MAIL_RELAY_TIMEOUT_MS`: mail relay timeout (default: 10000)
/// - `DC_CHAT_DELAY_MS`: thinking delay before chat answers (default: 1200)
/// - `DC_LOGIN_DELAY_MS`: delay before demo login answers (default: 500)
/// - `DC_PATIENT_ROSTER`: roster YAML file; the built-in roster is used when unset
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RestConfig::from_env()?;
    tracing::info!(
        relay = %cfg.mail_relay_url,
        roster = ?cfg.core.roster_path(),
        "++ Discharge assistant configured"
    );

    api_rest::serve(cfg).await
}
