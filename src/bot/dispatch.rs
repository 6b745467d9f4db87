//! Steady-state read → route → fan-out loop.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use nettirely_proto::Message;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, trace, warn};

use crate::error::Result;
use crate::handlers::{Context, HandlerFuture, Registry};
use crate::network::Reader;
use crate::telemetry::{HandlerTimer, spans};

/// Read and dispatch messages until `quit` is requested, then send QUIT.
///
/// Messages are handled strictly one at a time: every handler selected for a
/// message finishes before the next line is read.
pub(crate) async fn run(
    reader: &mut Reader,
    ctx: &Context,
    registry: &Registry,
    always_dispatch_privmsg: bool,
) -> Result<()> {
    let state = ctx.state();

    while state.is_running() {
        let line = tokio::select! {
            biased;
            _ = state.stopped() => {
                // A stale wakeup from an earlier quit; keep going
                if state.is_running() {
                    continue;
                }
                break;
            }
            line = reader.read_line() => line?,
        };

        let msg = match Message::parse(&line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(line = %line, error = %e, "Skipping unparseable line");
                continue;
            }
        };

        let span = spans::message(&msg.command);
        dispatch(ctx, registry, &msg, always_dispatch_privmsg)
            .instrument(span)
            .await;
    }

    let reason = state.quit_reason();
    debug!(reason = %reason, "Dispatch loop stopping");
    ctx.send(["QUIT", &format!(":{reason}")]).await?;
    state.quit_done();
    Ok(())
}

/// Update the roster, then run every handler selected for `msg`.
pub(crate) async fn dispatch(
    ctx: &Context,
    registry: &Registry,
    msg: &Message,
    always_dispatch_privmsg: bool,
) {
    let state = ctx.state();
    if let Some(new_nick) = state.roster.apply(msg, &state.nick()) {
        debug!(nick = %new_nick, "Own nickname changed");
        state.set_nick(new_nick);
    }

    let planned = registry.plan(msg, &state.nick(), always_dispatch_privmsg);
    debug!(command = %msg.command, args = ?msg.args, "Dispatching");
    trace!(handlers = planned.len(), "Handlers selected");

    let jobs = planned.into_iter().map(|job| {
        let kind = job.kind();
        let trigger = job.trigger().to_owned();
        (kind, trigger, job.invoke(ctx.clone()))
    });
    fan_out(jobs).await;
}

/// Run `connect` handlers concurrently and wait for all of them.
pub(crate) async fn run_connect_handlers(ctx: &Context, registry: &Registry) {
    let jobs = registry
        .connect_handlers()
        .into_iter()
        .map(|handler| ("connect", "001".to_owned(), handler(ctx.clone())));
    fan_out(jobs).await;
}

/// Spawn every job and join them all. Failures are logged and isolated.
async fn fan_out(jobs: impl Iterator<Item = (&'static str, String, HandlerFuture)>) {
    let mut set = JoinSet::new();

    for (kind, trigger, future) in jobs {
        let span = spans::handler(kind, &trigger);
        set.spawn(
            async move {
                let _timer = HandlerTimer::new(kind, trigger.as_str());
                let outcome = AssertUnwindSafe(future).catch_unwind().await;
                (kind, trigger, outcome)
            }
            .instrument(span),
        );
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, _, Ok(Ok(())))) => {}
            Ok((kind, trigger, Ok(Err(e)))) => {
                warn!(kind, trigger = %trigger, error = %format!("{e:#}"), "Handler failed");
            }
            Ok((kind, trigger, Err(panic))) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_owned());
                error!(kind, trigger = %trigger, panic = %message, "Handler panicked");
            }
            Err(e) => {
                error!(error = %e, "Handler task was cancelled");
            }
        }
    }
}
