use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gembot::config::EngineConfig;
use gembot::engine::Engine;
use gembot::session;

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gembot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = EngineConfig::from_env()?;
    tracing::info!(?config, "Engine configured");

    let engine = Engine::new(config)?;
    session::run(engine).await?;

    Ok(())
}
