//! Dispatcher schema and message/callback handlers.
//!
//! A plain text message is treated as a search query; the results come back
//! as a numbered list with one inline button per track. Pressing a button
//! downloads that track into the user's scratch directory, sends the file
//! and clears the directory afterwards.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile};
use teloxide::utils::command::BotCommands;

use crate::core::error::AppError;
use crate::core::utils::format_duration;
use crate::download::error::DownloadError;
use crate::download::search::Track;
use crate::download::{TrackDownloader, TrackSearcher, UserStorage};
use crate::telegram::bot::Command;

/// Error type produced by dispatcher endpoints
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Callback data prefix for track selection buttons
const SELECT_PREFIX: &str = "dl:";

/// Telegram caps inline button labels; longer titles get cut
const MAX_BUTTON_CHARS: usize = 40;

/// Per-chat search results, kept only while the result list is on screen.
///
/// A new search replaces the previous results; a finished download drops
/// them. Nothing here survives a restart.
#[derive(Default)]
pub struct SearchSessions {
    results: DashMap<i64, Vec<Track>>,
}

impl SearchSessions {
    pub fn put(&self, chat_id: i64, tracks: Vec<Track>) {
        self.results.insert(chat_id, tracks);
    }

    pub fn get(&self, chat_id: i64, index: usize) -> Option<Track> {
        self.results.get(&chat_id).and_then(|r| r.value().get(index).cloned())
    }

    pub fn clear(&self, chat_id: i64) {
        self.results.remove(&chat_id);
    }
}

/// Shared handler dependencies
#[derive(Clone)]
pub struct HandlerDeps {
    pub searcher: Arc<TrackSearcher>,
    pub downloader: Arc<TrackDownloader>,
    pub storage: Arc<UserStorage>,
    pub sessions: Arc<SearchSessions>,
}

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same handler tree is used in production and in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start, /help)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

            match cmd {
                Command::Start => {
                    bot.send_message(
                        msg.chat.id,
                        "Привет! Напиши название трека или исполнителя, \
                         и я поищу его на YouTube и SoundCloud.",
                    )
                    .await?;
                }
                Command::Help => {
                    bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
                }
            }
            Ok(())
        },
    ))
}

/// Handler for plain text messages: every non-command text is a search query
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let deps = deps.clone();
        async move {
            if let Some(text) = msg.text() {
                let query = text.trim();
                if !query.is_empty() && !query.starts_with('/') {
                    handle_search_query(&bot, &msg, query, &deps).await?;
                }
            }
            Ok(())
        }
    })
}

/// Handler for track-selection callback buttons
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_track_selection(bot, q, deps).await?;
            Ok(())
        }
    })
}

/// Runs a search and replies with the result list and selection buttons.
async fn handle_search_query(bot: &Bot, msg: &Message, query: &str, deps: &HandlerDeps) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    log::info!("Search request from chat {}: {:?}", chat_id.0, query);

    let status = bot.send_message(chat_id, format!("🔍 Ищу «{}»...", query)).await?;

    let limit = deps.searcher.default_limit();
    let tracks = deps.searcher.search(query, limit).await;

    let _ = bot.delete_message(chat_id, status.id).await;

    if tracks.is_empty() {
        // пустой результат — не ошибка
        bot.send_message(chat_id, "Ничего не нашлось 😔 Попробуй другой запрос.")
            .await?;
        return Ok(());
    }

    let mut lines = Vec::with_capacity(tracks.len());
    let mut buttons = Vec::with_capacity(tracks.len());
    for (i, track) in tracks.iter().enumerate() {
        lines.push(format!(
            "{}. {} — {} [{}] ({})",
            i + 1,
            track.uploader,
            track.title,
            format_duration(Some(track.duration_secs)),
            track.source.as_str()
        ));
        buttons.push(vec![InlineKeyboardButton::callback(
            format!("{}. {}", i + 1, truncate_label(&track.title)),
            format!("{}{}", SELECT_PREFIX, i),
        )]);
    }

    deps.sessions.put(chat_id.0, tracks);

    bot.send_message(chat_id, format!("Вот что нашлось:\n{}", lines.join("\n")))
        .reply_markup(InlineKeyboardMarkup::new(buttons))
        .await?;

    Ok(())
}

/// Downloads the selected track and sends it to the chat.
///
/// "Nothing found" and "download failed" are different outcomes and get
/// different messages; the user's directory is cleared after a successful
/// send (the downloader already clears it on failure).
async fn handle_track_selection(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> ResponseResult<()> {
    let callback_id = q.id.clone();
    let chat_id = q.message.as_ref().map(|m| m.chat().id);

    let (Some(data), Some(chat_id)) = (q.data, chat_id) else {
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };

    let Some(index) = data.strip_prefix(SELECT_PREFIX).and_then(|s| s.parse::<usize>().ok()) else {
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };

    let _ = bot.answer_callback_query(callback_id).await;

    let Some(track) = deps.sessions.get(chat_id.0, index) else {
        bot.send_message(chat_id, "Эти результаты устарели, поищи ещё раз.").await?;
        return Ok(());
    };

    if track.url.is_empty() {
        bot.send_message(chat_id, "У этого трека нет ссылки, выбери другой.").await?;
        return Ok(());
    }

    let status = bot
        .send_message(chat_id, format!("⬇️ Скачиваю «{}»...", track.title))
        .await?;

    let user_id = chat_id.0;
    match deps.downloader.download(&track.url, user_id).await {
        Ok(Some(downloaded)) => {
            log::info!(
                "Sending {} ({} bytes) to chat {}",
                downloaded.path.display(),
                downloaded.size_bytes,
                chat_id
            );

            let send_result = bot
                .send_audio(chat_id, InputFile::file(downloaded.path.clone()))
                .title(track.title.clone())
                .performer(track.uploader.clone())
                .duration(track.duration_secs.trunc() as u32)
                .await;

            let _ = bot.delete_message(chat_id, status.id).await;

            match send_result {
                Ok(_) => {
                    log::info!("Audio sent successfully to chat {}", chat_id);
                    deps.sessions.clear(chat_id.0);
                }
                Err(e) => {
                    log::error!("Failed to send audio to chat {}: {}", chat_id, e);
                    bot.send_message(chat_id, "Не получилось отправить файл, попробуй ещё раз.")
                        .await?;
                }
            }

            deps.storage.cleanup_user_files(user_id);
        }
        Ok(None) => {
            let _ = bot.delete_message(chat_id, status.id).await;
            bot.send_message(chat_id, "Не удалось получить файл для этого трека 😔")
                .await?;
        }
        Err(AppError::Download(DownloadError::TooLarge { size_mb, limit_mb })) => {
            let _ = bot.delete_message(chat_id, status.id).await;
            bot.send_message(
                chat_id,
                format!("Файл слишком большой: {} МБ при лимите {} МБ 😔", size_mb, limit_mb),
            )
            .await?;
        }
        Err(e) => {
            log::error!("Download failed for chat {}: {}", chat_id, e);
            let _ = bot.delete_message(chat_id, status.id).await;
            bot.send_message(chat_id, "Скачивание не удалось, попробуй ещё раз позже.")
                .await?;
        }
    }

    Ok(())
}

/// Telegram ограничивает длину текста кнопки, длинные названия обрезаем
fn truncate_label(title: &str) -> String {
    if title.chars().count() <= MAX_BUTTON_CHARS {
        title.to_string()
    } else {
        let cut: String = title.chars().take(MAX_BUTTON_CHARS).collect();
        format!("{}…", cut)
    }
}
