//! The Roaster - a crowdwork comedian chat session
//!
//! Terminal front end over a session runtime: the runtime reveals replies
//! word by word and animates the comedian's presence, this binary just
//! renders watch-channel state and forwards stdin lines.

mod ledger;
mod llm;
mod persona;
mod presence;
mod reveal;
mod runtime;
mod state_machine;

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledger::{Role, Turn};
use llm::{GeminiClient, DEFAULT_MODEL};
use presence::{PresenceFrame, PresenceMode};
use runtime::SessionRuntime;
use state_machine::SessionContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr; stdout belongs to the conversation.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roaster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| "GEMINI_API_KEY is not set; the session needs a Gemini API key")?;
    let model = std::env::var("ROASTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    tracing::info!(model = %model, "starting session");

    let generator = GeminiClient::new(api_key, &model);
    let (session, handle) = SessionRuntime::new(SessionContext::new("terminal"), generator);
    tokio::spawn(session.run());

    // Clones start with the current value already seen, so the initial guard
    // value does not produce a premature prompt.
    let mut transcript_rx = handle.transcript.clone();
    let mut presence_rx = handle.presence.clone();
    let mut input_rx = handle.input_enabled.clone();

    let mut terminal = Terminal::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    handle.open().await?;

    loop {
        tokio::select! {
            changed = transcript_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let transcript = transcript_rx.borrow_and_update().clone();
                terminal.render_transcript(&transcript)?;
            }
            changed = presence_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let presence = *presence_rx.borrow_and_update();
                terminal.render_presence(presence.mode, presence.frame)?;
            }
            changed = input_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if *input_rx.borrow_and_update() {
                    terminal.prompt()?;
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if line.trim() == "/quit" {
                            break;
                        }
                        // Blank and mid-turn lines are dropped by the runtime.
                        handle.submit(line).await?;
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}

/// Incremental transcript renderer.
///
/// User turns are already on screen (the terminal echoes stdin), so only
/// assistant turns are printed. The trailing assistant turn grows in place:
/// each transcript update extends the previous prefix, so printing the byte
/// tail is enough.
struct Terminal {
    stdout: io::Stdout,
    /// Turns already fully rendered.
    shown: usize,
    /// Bytes of the trailing assistant turn already printed.
    partial: usize,
    /// An assistant line is mid-render.
    line_open: bool,
    /// A thinking indicator occupies the current line.
    indicator: bool,
}

impl Terminal {
    fn new() -> Self {
        Self {
            stdout: io::stdout(),
            shown: 0,
            partial: 0,
            line_open: false,
            indicator: false,
        }
    }

    fn render_transcript(&mut self, turns: &[Turn]) -> io::Result<()> {
        while self.shown < turns.len() {
            let turn = &turns[self.shown];
            let is_last = self.shown + 1 == turns.len();
            match turn.role {
                Role::User => {
                    self.shown += 1;
                }
                Role::Assistant => {
                    if !self.line_open {
                        self.clear_indicator()?;
                        write!(self.stdout, "roaster> ")?;
                        self.line_open = true;
                        self.partial = 0;
                    }
                    write!(self.stdout, "{}", &turn.text[self.partial..])?;
                    self.partial = turn.text.len();
                    if is_last {
                        break;
                    }
                    writeln!(self.stdout)?;
                    self.line_open = false;
                    self.shown += 1;
                }
            }
        }
        self.stdout.flush()
    }

    fn render_presence(&mut self, mode: PresenceMode, frame: PresenceFrame) -> io::Result<()> {
        // Talking is visualized by the reveal itself; only thinking gets an
        // indicator, and never over a line being revealed.
        if self.line_open || mode != PresenceMode::Thinking {
            return Ok(());
        }
        let dots = match frame {
            PresenceFrame::Thinking1 => ".",
            PresenceFrame::Thinking2 => "..",
            _ => return Ok(()),
        };
        write!(self.stdout, "\r\x1b[2K(thinking{dots})")?;
        self.indicator = true;
        self.stdout.flush()
    }

    /// Close out any revealed line and show the input prompt.
    fn prompt(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.stdout)?;
            self.line_open = false;
            self.partial = 0;
            self.shown += 1;
        }
        self.clear_indicator()?;
        write!(self.stdout, "you> ")?;
        self.stdout.flush()
    }

    fn clear_indicator(&mut self) -> io::Result<()> {
        if self.indicator {
            write!(self.stdout, "\r\x1b[2K")?;
            self.indicator = false;
        }
        Ok(())
    }
}
