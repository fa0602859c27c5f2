use ai_lecturer::core::config::Config;
use ai_lecturer::core::io::{NativeStorage, Storage};
use ai_lecturer::services::generation::{GenerationCoordinator, HttpGenerationClient};
use ai_lecturer::services::presenter::VideoDownloader;
use anyhow::Result;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please fix or remove 'config.yml'.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());
    let client = HttpGenerationClient::new(&config)?;
    info!("Generation service: {}", client.endpoint());

    let coordinator = GenerationCoordinator::new(Arc::new(client), storage.clone());
    let downloader = VideoDownloader::new(&config, storage);

    ai_lecturer::ui::run(&config, &coordinator, &downloader).await
}
