use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use liveview_core::{update, Msg, PageKind, PageState};
use liveview_logging::{live_info, live_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::render::{parse_input, render, Input};

const TICK_INTERVAL: Duration = Duration::from_millis(150);

/// Events reaching the page loop from the terminal, the tick thread and the
/// synchronizer.
enum LoopEvent {
    Msg(Msg),
    Notice(String),
    Quit,
}

pub fn run_app(kind: PageKind, config: AppConfig) -> Result<()> {
    let settings = config
        .backend_settings()
        .context("invalid backend url in config")?;
    let identity = config.identity();

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (loop_tx, loop_rx) = mpsc::channel::<LoopEvent>();

    let runner = EffectRunner::new(settings, kind, identity.clone(), msg_tx.clone())
        .context("failed to start synchronizer")?;

    spawn_msg_forwarder(msg_rx, loop_tx.clone());
    spawn_stdin_reader(kind, loop_tx.clone());
    // Background tick to coalesce redraws.
    thread::spawn(move || {
        while loop_tx.send(LoopEvent::Msg(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let mut page = PageLoop {
        state: PageState::new(kind, identity),
        runner,
        needs_render: true,
    };
    page.dispatch(Msg::Mounted);

    for event in loop_rx {
        match event {
            LoopEvent::Msg(msg) => page.dispatch(msg),
            LoopEvent::Notice(text) => println!("{text}"),
            LoopEvent::Quit => break,
        }
    }

    page.dispatch(Msg::Unmounted);
    page.runner.finish();
    live_info!("{} page closed", kind.as_str());
    Ok(())
}

struct PageLoop {
    state: PageState,
    runner: EffectRunner,
    needs_render: bool,
}

impl PageLoop {
    fn dispatch(&mut self, msg: Msg) {
        let is_tick = matches!(msg, Msg::Tick);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);

        if self.state.consume_dirty() {
            self.needs_render = true;
        }
        if is_tick && self.needs_render {
            self.needs_render = false;
            draw(&render(&self.state.view()));
        }
    }
}

fn draw(frame: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{frame}");
    let _ = stdout.flush();
}

fn spawn_msg_forwarder(msg_rx: mpsc::Receiver<Msg>, loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        for msg in msg_rx {
            if loop_tx.send(LoopEvent::Msg(msg)).is_err() {
                break;
            }
        }
    });
}

/// EOF on stdin unmounts the page like `/quit`.
fn spawn_stdin_reader(kind: PageKind, loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    live_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            let now = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
            let event = match parse_input(kind, &line, &now) {
                Input::Msgs(msgs) => {
                    for msg in msgs {
                        if loop_tx.send(LoopEvent::Msg(msg)).is_err() {
                            return;
                        }
                    }
                    continue;
                }
                Input::Rejected(text) => LoopEvent::Notice(text),
                Input::Quit => break,
            };
            if loop_tx.send(event).is_err() {
                return;
            }
        }
        let _ = loop_tx.send(LoopEvent::Quit);
    });
}
