//! The bot: handler registration, connection, dispatch loop and teardown.
//!
//! ```text
//! Bot::new ──▶ register handlers ──▶ connect (TCP/TLS, handshake, connect
//!   handlers) ──▶ run (dispatch until quit, send QUIT) ──▶ shutdown
//!   (disconnect handlers, save document)
//! ```

mod dispatch;
mod options;

pub use options::{BotOptions, ConnectOptions, SaslOptions};

use std::future::Future;
use std::sync::Arc;

use nettirely_proto::{HandshakeMachine, Message};
use tracing::{Instrument, info, warn};

use crate::error::{Error, HandlerResult, Result};
use crate::handlers::{Arity, CommandCall, Context, HandlerId, PatternMatch, Registry};
use crate::network::{self, Reader, handshake};
use crate::state::{Document, SharedState};
use crate::telemetry::spans;

struct Connection {
    reader: Reader,
    ctx: Context,
}

/// An IRC bot instance.
///
/// Owns its handler registry and connection state; nothing is global, so
/// several bots can live in one process.
pub struct Bot {
    registry: Arc<Registry>,
    state: Arc<SharedState>,
    options: BotOptions,
    connection: Option<Connection>,
    /// Set after a successful connect; cleared once teardown has run.
    shutdown_armed: bool,
}

/// Cloneable handle that stops a running bot from elsewhere (a signal
/// handler, another task).
#[derive(Clone)]
pub struct QuitHandle {
    state: Arc<SharedState>,
}

impl QuitHandle {
    pub fn quit(&self, reason: Option<&str>) {
        self.state.request_quit(reason);
    }
}

impl Bot {
    /// Create a bot, loading the persisted document from `options.state_path`.
    pub fn new(options: BotOptions) -> Self {
        let document = Document::load(&options.state_path);
        let state = SharedState::new(document);
        state.set_quit_reason(options.quit_reason.clone());

        Self {
            registry: Arc::new(Registry::new()),
            state: Arc::new(state),
            options,
            connection: None,
            shutdown_armed: false,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Context for the current connection, if connected.
    pub fn context(&self) -> Option<Context> {
        self.connection.as_ref().map(|conn| conn.ctx.clone())
    }

    pub fn quit_handle(&self) -> QuitHandle {
        QuitHandle {
            state: self.state.clone(),
        }
    }

    /// Stop the dispatch loop after the current message.
    pub fn quit(&self, reason: Option<&str>) {
        self.state.request_quit(reason);
    }

    pub fn on_connect<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_connect(handler)
    }

    pub fn on_disconnect<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        self.registry.on_disconnect(handler)
    }

    pub fn on_message<F, Fut>(&self, command: &str, handler: F) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_message(command, handler)
    }

    pub fn on_privmsg<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_message("PRIVMSG", handler)
    }

    pub fn on_join<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_message("JOIN", handler)
    }

    pub fn on_part<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_message("PART", handler)
    }

    pub fn on_quit<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_message("QUIT", handler)
    }

    pub fn on_command<F, Fut>(&self, word: &str, arity: Arity, handler: F) -> Result<HandlerId>
    where
        F: Fn(Context, CommandCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_command(word, arity, handler)
    }

    pub fn on_pattern<F, Fut>(&self, pattern: &str, handler: F) -> Result<HandlerId>
    where
        F: Fn(Context, PatternMatch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.on_pattern(pattern, handler)
    }

    /// Connect, register, and run the connect handlers.
    ///
    /// A quit requested before registration finishes is honoured: connect
    /// still succeeds, connect handlers are skipped and [`run`](Self::run)
    /// sends QUIT straight away.
    ///
    /// Fails without touching the network when the SASL mechanism is not
    /// supported. Any handshake failure is returned as is; there are no
    /// retries.
    pub async fn connect(&mut self, opts: &ConnectOptions) -> Result<()> {
        let machine = HandshakeMachine::new(opts.handshake_config())?;
        let port = opts.effective_port();
        let span = spans::connection(&opts.host, port, opts.tls);

        async {
            let stream = network::open(
                &opts.host,
                port,
                opts.tls,
                opts.accept_invalid_certs,
                opts.ca_file.as_deref(),
            )
            .await?;
            let (mut reader, writer) = network::split(stream, opts.max_line_len);

            self.state.set_nick(&opts.nick);
            let nick = handshake::register(&mut reader, &writer, machine).await?;
            self.state.set_nick(nick);
            self.state.roster.clear();
            self.state.start();

            let ctx = Context::new(writer, self.state.clone(), self.registry.clone());
            if self.state.is_running() {
                dispatch::run_connect_handlers(&ctx, &self.registry).await;
            } else {
                info!("Quit requested during registration, skipping connect handlers");
            }

            self.connection = Some(Connection { reader, ctx });
            self.shutdown_armed = true;
            Ok::<(), Error>(())
        }
        .instrument(span)
        .await
    }

    /// Run the dispatch loop until `quit`, then send QUIT.
    ///
    /// The connection is not closed; call [`shutdown`](Self::shutdown) (or
    /// drop the bot) afterwards.
    pub async fn run(&mut self) -> Result<()> {
        let Some(conn) = self.connection.as_mut() else {
            return Err(Error::NotConnected);
        };

        dispatch::run(
            &mut conn.reader,
            &conn.ctx,
            &self.registry,
            self.options.always_dispatch_privmsg,
        )
        .await
    }

    /// Feed one message through roster bookkeeping and handler dispatch as
    /// if it had just been read.
    pub async fn dispatch(&self, msg: &Message) -> Result<()> {
        let conn = self.connection.as_ref().ok_or(Error::NotConnected)?;
        dispatch::dispatch(
            &conn.ctx,
            &self.registry,
            msg,
            self.options.always_dispatch_privmsg,
        )
        .await;
        Ok(())
    }

    /// Save the persisted document now.
    pub fn save_state(&self) -> Result<()> {
        self.state.document.lock().save()
    }

    /// Run disconnect handlers and save the document.
    ///
    /// Does nothing unless a connection succeeded, and runs at most once per
    /// connection. Also runs on drop.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.shutdown_armed {
            return Ok(());
        }
        self.shutdown_armed = false;

        if let Some(conn) = &self.connection {
            for handler in self.registry.disconnect_handlers() {
                handler(&conn.ctx);
            }
        }

        self.save_state()?;
        info!(path = %self.options.state_path.display(), "State saved on shutdown");
        Ok(())
    }
}

impl Drop for Bot {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, code = e.error_code(), "Shutdown failed");
        }
    }
}
