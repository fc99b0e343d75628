use anyhow::{Context, Result};
use finchat::config::{Config, env_flag};
use finchat::session::{ChatSession, SubmitOutcome};
use finchat::types::Role;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{Level, info, warn};

const PROMPT: &str = "> ";

fn init_tracing() {
    let level = if env_flag("FINCHAT_DEBUG") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn emit(out: &mut Stdout, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already in the environment take precedence over .env
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(err) = dotenv
        && !err.not_found()
    {
        warn!("failed to load .env: {}", err);
    }

    let config = Config::from_env();
    info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "starting finchat");
    let mut session =
        ChatSession::from_config(&config).context("failed to initialize chat session")?;

    let mut out = tokio::io::stdout();
    emit(
        &mut out,
        "Finance AI Chatbot. Ask me any finance related question.\n\
         (e.g. \"What is a stock?\", \"How does inflation affect the economy?\")\n\
         Commands: /keywords, /quit\n",
    )
    .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        emit(&mut out, PROMPT).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/keywords" => {
                let tracked = session.tracked_keywords();
                let listing = if tracked.is_empty() {
                    "—".to_string()
                } else {
                    tracked.join(", ")
                };
                emit(&mut out, &format!("Keywords tracked: {listing}\n")).await?;
                continue;
            }
            _ => {}
        }

        let seen = session.messages().len();
        session.set_input(line);
        if let SubmitOutcome::Ignored(_) = session.submit_input().await {
            continue;
        }

        for message in &session.messages()[seen..] {
            if message.role != Role::Assistant {
                continue;
            }
            let stamp = message.timestamp_label().unwrap_or_default();
            emit(&mut out, &format!("[{stamp}] {}\n", message.content)).await?;
        }
        emit(&mut out, &format!("Backend: {}\n", session.backend_label())).await?;
        if let Some(err) = session.last_error() {
            emit(&mut out, &format!("Last network error: {err}\n")).await?;
        }
    }

    Ok(())
}
