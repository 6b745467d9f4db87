//! nettirely - reference bot.
//!
//! Loads a TOML config, registers a small demonstration handler set and runs
//! until Ctrl-C.

use std::sync::Arc;

use anyhow::Context as _;
use nettirely::config::{self, BotConfig, Config};
use nettirely::{Arity, Bot, BotOptions, ConnectOptions};
use serde_json::{Value, json};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nettirely.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        nick = %config.connection.nick,
        host = %config.connection.host,
        port = config.connection.effective_port(),
        tls = config.connection.tls,
        "Starting nettirely"
    );

    let mut bot = Bot::new(BotOptions::from(&config.bot));
    register_handlers(&bot, &config.bot)?;

    let quit = bot.quit_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, quitting");
            quit.quit(None);
        }
    });

    bot.connect(&ConnectOptions::from(&config.connection))
        .await
        .map_err(|e| {
            error!(code = e.error_code(), error = %e, "Connection failed");
            e
        })?;

    let result = bot.run().await;
    bot.shutdown().context("failed to save state on shutdown")?;
    result?;

    info!("Bye");
    Ok(())
}

fn register_handlers(bot: &Bot, config: &BotConfig) -> anyhow::Result<()> {
    let prefix = &config.command_prefix;

    let channels = Arc::new(config.channels.clone());
    bot.on_connect(move |ctx| {
        let channels = channels.clone();
        async move {
            for channel in channels.iter() {
                ctx.join_channel(channel).await?;
            }
            Ok(())
        }
    });

    bot.on_command(&format!("{prefix}slap"), Arity::Exact(1), |ctx, call| async move {
        let action = format!("slaps {} around a bit with a large trout", call.args[0]);
        ctx.send_action(&call.reply_to, &action).await?;
        Ok(())
    })?;

    bot.on_command(&format!("{prefix}echo"), Arity::NoSplit, |ctx, call| async move {
        if !call.args[0].is_empty() {
            ctx.send_privmsg(&call.reply_to, &call.args[0]).await?;
        }
        Ok(())
    })?;

    // Count lines per nick in the persisted document
    bot.on_privmsg(|ctx, msg| async move {
        if let Some(nick) = msg.source_nickname() {
            ctx.with_document(|doc| {
                let seen = doc.entry("seen").or_insert_with(|| json!({}));
                if let Value::Object(seen) = seen {
                    let count = seen.get(nick).and_then(Value::as_u64).unwrap_or(0);
                    seen.insert(nick.to_owned(), json!(count + 1));
                }
            });
        }
        Ok(())
    });

    bot.on_command(&format!("{prefix}seen"), Arity::Exact(1), |ctx, call| async move {
        let nick = &call.args[0];
        let count = ctx.with_document(|doc| {
            doc.get("seen")
                .and_then(|seen| seen.get(nick))
                .and_then(Value::as_u64)
                .unwrap_or(0)
        });
        let reply = match count {
            0 => format!("I have never seen {nick} say anything."),
            1 => format!("I have seen {nick} say 1 thing."),
            n => format!("I have seen {nick} say {n} things."),
        };
        ctx.send_privmsg(&call.reply_to, &reply).await?;
        Ok(())
    })?;

    bot.on_pattern(r"https?://[^\s]+", |ctx, m| async move {
        info!(url = %m.matched, channel = %m.reply_to, "Link posted");
        ctx.send_notice(&m.reply_to, &format!("Link: {}", m.matched)).await?;
        Ok(())
    })?;

    bot.on_disconnect(|ctx| {
        let nicks = ctx.with_document(|doc| {
            doc.get("seen")
                .and_then(Value::as_object)
                .map_or(0, |seen| seen.len())
        });
        info!(nicks, "Disconnecting");
    });

    Ok(())
}
