use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use muzka::core::{config, init_logger};
use muzka::download::{DownloadConfig, SearchConfig, TrackDownloader, TrackSearcher, UserStorage};
use muzka::extractor::ytdlp::print_ytdlp_version;
use muzka::extractor::{Extractor, YtDlpExtractor};
use muzka::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, SearchSessions};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, directories, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    // A panic inside a handler must not take the dispatcher down silently
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    if let Err(e) = print_ytdlp_version().await {
        log::warn!(
            "yt-dlp check failed: {}. Downloads will not work until it is installed.",
            e
        );
    }

    // Каталоги создаём заранее: о проблеме с правами доступа лучше узнать
    // на старте, а не на первой загрузке
    std::fs::create_dir_all(&*config::DOWNLOADS_DIR)?;
    std::fs::create_dir_all(&*config::TEMP_DIR)?;

    let extractor: Arc<dyn Extractor> = Arc::new(YtDlpExtractor::new());
    let storage = UserStorage::new(config::DOWNLOADS_DIR.clone());

    let deps = HandlerDeps {
        searcher: Arc::new(TrackSearcher::new(Arc::clone(&extractor), SearchConfig::default())),
        downloader: Arc::new(TrackDownloader::new(
            Arc::clone(&extractor),
            storage.clone(),
            DownloadConfig::default(),
        )),
        storage: Arc::new(storage),
        sessions: Arc::new(SearchSessions::default()),
    };

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    log::info!("Starting muzka bot...");

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Bot stopped");
    Ok(())
}
