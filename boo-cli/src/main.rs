use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, anyhow};
use boo_client::{
    API_VERSION, Boo, BooPage, ChannelSink, Credentials, DecodeFailure, LinkStatus,
    ResponseEnvelope, decode_boo_page, decode_link_status, decode_registration, decode_unlink,
    decode_upload,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "boo-cli", version, about = "Инспектор сохранённых ответов audioboo-совместимого API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Страница ленты аудиоклипов.
    Timeline {
        /// Файл с телом ответа; `-` — читать stdin.
        file: String,
    },
    /// Ответ на регистрацию источника.
    Register {
        /// Файл с телом ответа; `-` — читать stdin.
        file: String,
    },
    /// Статус привязки устройства к аккаунту.
    Status {
        /// Файл с телом ответа; `-` — читать stdin.
        file: String,
    },
    /// Подтверждение отвязки устройства.
    Unlink {
        /// Файл с телом ответа; `-` — читать stdin.
        file: String,
    },
    /// Подтверждение загрузки клипа.
    Upload {
        /// Файл с телом ответа; `-` — читать stdin.
        file: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging(DEFAULT_LOG_LEVEL)?;

    let cli = Cli::parse();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = ChannelSink::new(tx);

    match cli.command {
        Command::Timeline { file } => {
            let raw = read_input(&file)?;
            match decode_boo_page(&raw, &sink) {
                Some(envelope) => print_page(&envelope),
                None => return Err(take_failure(&mut rx).await),
            }
        }
        Command::Register { file } => {
            let raw = read_input(&file)?;
            match decode_registration(&raw, &sink) {
                Some(envelope) => print_credentials(&envelope),
                None => return Err(take_failure(&mut rx).await),
            }
        }
        Command::Status { file } => {
            let raw = read_input(&file)?;
            match decode_link_status(&raw, &sink) {
                Some(envelope) => print_status(&envelope),
                None => return Err(take_failure(&mut rx).await),
            }
        }
        Command::Unlink { file } => {
            let raw = read_input(&file)?;
            match decode_unlink(&raw, &sink) {
                Some(envelope) => {
                    print_meta(envelope.timestamp, envelope.window);
                    println!("unlinked: {}", envelope.content);
                }
                None => return Err(take_failure(&mut rx).await),
            }
        }
        Command::Upload { file } => {
            let raw = read_input(&file)?;
            match decode_upload(&raw, &sink) {
                Some(envelope) => {
                    print_meta(envelope.timestamp, envelope.window);
                    println!("audio_clip_id: {}", envelope.content);
                }
                None => return Err(take_failure(&mut rx).await),
            }
        }
    }

    Ok(())
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("не удалось прочитать stdin")?;
        return Ok(raw);
    }

    fs::read_to_string(file).with_context(|| format!("не удалось прочитать файл {file}"))
}

// Декодер уже отправил уведомление; остаётся забрать его из канала.
async fn take_failure(rx: &mut UnboundedReceiver<DecodeFailure>) -> anyhow::Error {
    match rx.recv().await {
        Some(failure) => anyhow!(describe_failure(&failure)),
        None => anyhow!("декодер не сообщил причину сбоя"),
    }
}

fn describe_failure(failure: &DecodeFailure) -> String {
    match failure {
        DecodeFailure::ParseError => {
            "ответ не удалось разобрать: некорректный JSON или нарушенная схема".to_string()
        }
        DecodeFailure::VersionMismatch => {
            format!("версия протокола не совпала (ожидается {API_VERSION})")
        }
        DecodeFailure::ApiError { code, description } => {
            format!("ошибка API [{code}]: {description}")
        }
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.to_string(),
        None => "—".to_string(),
    }
}

fn print_meta(timestamp: i64, window: i64) {
    println!("timestamp: {timestamp}, window: {window}");
}

fn print_page(envelope: &ResponseEnvelope<BooPage>) {
    print_meta(envelope.timestamp, envelope.window);

    let page = &envelope.content;
    println!(
        "Клипов на странице: {} (offset={}, total={})",
        page.boos.len(),
        page.offset,
        page.total
    );

    for boo in &page.boos {
        print_boo(boo);
    }
}

fn print_boo(boo: &Boo) {
    let author = match &boo.user {
        Some(user) => user.username.as_str(),
        None => "<аноним>",
    };
    println!(
        "- [{}] {} ({:.1} c, автор: {author}, прослушиваний: {}, комментариев: {})",
        boo.id, boo.title, boo.duration, boo.plays, boo.comments
    );
    println!("  записан: {}, загружен: {}", format_time(boo.recorded_at), format_time(boo.uploaded_at));
    println!("  mp3: {}", boo.high_mp3_url);

    if let Some(tags) = &boo.tags {
        let names: Vec<&str> = tags.iter().map(|tag| tag.display.as_str()).collect();
        println!("  теги: {}", names.join(", "));
    }
    if let Some(location) = &boo.location {
        println!(
            "  место: {} ({}, {}; ±{} м)",
            location.description, location.latitude, location.longitude, location.accuracy
        );
    }
}

fn print_credentials(envelope: &ResponseEnvelope<Credentials>) {
    print_meta(envelope.timestamp, envelope.window);
    println!("api_secret: {}", envelope.content.api_secret);
    println!("api_key: {}", envelope.content.api_key);
}

fn print_status(envelope: &ResponseEnvelope<LinkStatus>) {
    print_meta(envelope.timestamp, envelope.window);
    match &envelope.content {
        LinkStatus::Linked { username, email } => {
            println!("Устройство привязано");
            println!("  username: {username}");
            println!("  email: {email}");
        }
        LinkStatus::Unlinked { link_url } => {
            println!("Устройство не привязано");
            println!("  ссылка для привязки: {link_url}");
        }
    }
}
