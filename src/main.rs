use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden::{bot, config::Settings, store::SettingsStore};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Warden Discord Bot");

    // Load settings
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    // Open the settings store
    let store = match SettingsStore::open(&settings.data_dir) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open settings store: {}", e);
            std::process::exit(1);
        }
    };

    info!("Settings store ready at {}", settings.data_dir.display());

    // Start the bot
    if let Err(e) = bot::framework::run(settings, store).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}
