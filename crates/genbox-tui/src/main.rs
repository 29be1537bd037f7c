mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod widgets;

use genbox_proto::api::ApiClient;
use genbox_proto::config::Config;
use genbox_proto::poll::PollSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = genbox_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("genbox.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to info for app code but suppress
    // noisy connection-level output from HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("genbox log: {}", log_path.display());

    tracing::info!("genbox starting…");

    let config = Config::load().unwrap_or_default();
    let identity = genbox_proto::identity::resolve(&config);
    if identity.is_none() {
        tracing::warn!("no user identity available; balance will not be shown");
    }

    let api = ApiClient::new(config.api.base_url.clone());
    let settings = PollSettings::from(&config.polling);
    let ui_state_path = data_dir.join("ui_state.json");

    let app = app::App::new(api, settings, identity, ui_state_path);
    app.run().await
}
