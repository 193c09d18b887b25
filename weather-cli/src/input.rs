//! Commands from the host bar: lines on stdin and, on Unix, signals.
//!
//! stdin has exactly one reader. While a configuration prompt waits for an
//! answer, the next plain line goes to that prompt instead of the command
//! channel. i3bar click events always go to the command channel.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use instant_weather_core::{Command, Prompter};
use log::{debug, warn};
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::{mpsc, oneshot},
};

/// Click event as sent by i3bar / swaybar with `click_events` enabled.
#[derive(Debug, Deserialize)]
struct ClickEvent {
    button: u8,
}

/// Lines belonging to the i3bar protocol rather than to a human.
fn is_bar_event(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('[' | ',' | '{'))
}

/// Turn one stdin line into a command. Blank lines and the i3bar array
/// opener yield `None`.
fn parse_line(line: &str) -> Option<Result<Command>> {
    let line = line.trim().trim_start_matches([',', '[']).trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with('{') {
        return match serde_json::from_str::<ClickEvent>(line) {
            Ok(ClickEvent { button: 1 }) => Some(Ok(Command::SwitchMode)),
            Ok(ClickEvent { button: 3 }) => Some(Ok(Command::UpdateConfiguration)),
            Ok(ClickEvent { button }) => {
                debug!("Ignoring click with button {button}");
                None
            }
            Err(err) => Some(Err(anyhow!("Malformed click event: {err}"))),
        };
    }

    Some(line.parse())
}

#[derive(Debug, Default)]
struct RouterState {
    /// Prompt waiting for the next plain line.
    waiting: Option<oneshot::Sender<String>>,
    closed: bool,
}

/// Decides whether a stdin line answers a prompt or is a command.
#[derive(Debug, Default)]
pub struct StdinRouter {
    state: Mutex<RouterState>,
}

impl StdinRouter {
    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve the next plain line for a prompt.
    fn claim_next_line(&self) -> Result<oneshot::Receiver<String>> {
        let mut state = self.lock();
        if state.closed {
            bail!("stdin is closed, nothing can answer the prompt");
        }
        let (tx, rx) = oneshot::channel();
        state.waiting = Some(tx);
        Ok(rx)
    }

    /// Give the line to a waiting prompt. Returns it when nobody took it.
    fn route(&self, line: String) -> Option<String> {
        if is_bar_event(&line) {
            return Some(line);
        }
        let waiting = self.lock().waiting.take();
        match waiting {
            Some(tx) => tx.send(line).err(),
            None => Some(line),
        }
    }

    /// No more lines. A waiting prompt fails instead of hanging.
    fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.waiting = None;
    }
}

/// Prompts answered with one stdin line. The question goes to stderr, since
/// stdout belongs to the bar.
#[derive(Debug, Clone)]
pub struct LinePrompter {
    router: Arc<StdinRouter>,
}

impl LinePrompter {
    pub fn new(router: Arc<StdinRouter>) -> Self {
        Self { router }
    }
}

/// An empty line keeps the current value, `-` clears it.
fn read_answer(line: &str, initial: Option<&str>) -> Option<String> {
    match line.trim() {
        "" => initial.map(str::to_string),
        "-" => None,
        value => Some(value.to_string()),
    }
}

#[async_trait]
impl Prompter for LinePrompter {
    async fn prompt(&self, message: &str, initial: Option<&str>) -> Result<Option<String>> {
        let answer = self.router.claim_next_line()?;
        match initial {
            Some(current) => eprint!("{message} [{current}] (Enter keeps, - clears): "),
            None => eprint!("{message} (- skips): "),
        }

        let line = answer
            .await
            .map_err(|_| anyhow!("stdin closed before the prompt was answered"))?;
        Ok(read_answer(&line, initial))
    }
}

/// Forward stdin commands until EOF.
pub fn spawn_stdin(tx: mpsc::Sender<Command>, router: Arc<StdinRouter>) {
    spawn_reader(tokio::io::stdin(), tx, router);
}

fn spawn_reader<R>(reader: R, tx: mpsc::Sender<Command>, router: Arc<StdinRouter>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        read_lines(reader, &tx, &router).await;
        router.close();
    });
}

async fn read_lines<R>(reader: R, tx: &mpsc::Sender<Command>, router: &StdinRouter)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(line) = router.route(line) else {
                    continue;
                };
                match parse_line(&line) {
                    Some(Ok(command)) => {
                        if tx.send(command).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(err)) => warn!("{err}"),
                    None => {}
                }
            }
            Ok(None) => {
                debug!("stdin closed");
                return;
            }
            Err(err) => {
                warn!("Failed to read stdin: {err}");
                return;
            }
        }
    }
}

/// `SIGUSR1` switches the display mode, `SIGUSR2` opens the configuration.
#[cfg(unix)]
pub fn spawn_signals(tx: mpsc::Sender<Command>) -> Result<()> {
    use anyhow::Context;
    use tokio::signal::unix::{SignalKind, signal};

    let mut usr1 =
        signal(SignalKind::user_defined1()).context("Failed to listen for SIGUSR1")?;
    let mut usr2 =
        signal(SignalKind::user_defined2()).context("Failed to listen for SIGUSR2")?;

    tokio::spawn(async move {
        loop {
            let command = tokio::select! {
                Some(()) = usr1.recv() => Command::SwitchMode,
                Some(()) = usr2.recv() => Command::UpdateConfiguration,
                else => break,
            };
            if tx.send(command).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}
