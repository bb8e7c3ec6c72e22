//! Avatar presence state machine
//!
//! Tracks the avatar's discrete animation state and owns the single active
//! oscillation timer. The rendering layer subscribes to a watch channel and
//! picks an image per frame; this module knows nothing about the conversation
//! itself.

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Frame period while thinking (two alternating frames).
pub const THINKING_PERIOD: Duration = Duration::from_millis(300);

/// Frame period while talking (mouth open/closed).
pub const TALKING_PERIOD: Duration = Duration::from_millis(100);

/// Cycle count used when talking is started without a pace hint.
const DEFAULT_TALK_WORDS: usize = 10;

/// Discrete animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceMode {
    Idle,
    Thinking,
    Talking,
}

/// Frame sub-phase, used only for image selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceFrame {
    /// Shown before the session produces its first reply.
    LightsOff,
    Neutral,
    Thinking1,
    Thinking2,
    Talking,
}

/// Published animation state: mode plus the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub mode: PresenceMode,
    pub frame: PresenceFrame,
}

impl Presence {
    fn initial() -> Self {
        Self {
            mode: PresenceMode::Idle,
            frame: PresenceFrame::LightsOff,
        }
    }

    fn idle() -> Self {
        Self {
            mode: PresenceMode::Idle,
            frame: PresenceFrame::Neutral,
        }
    }
}

/// Owns the avatar's single oscillation timer.
///
/// At most one timer task is alive at any instant: `start` cancels the
/// previous task's token before arming a new one, so a superseded task can
/// never publish a frame after its replacement has been installed.
pub struct PresenceDriver {
    tx: watch::Sender<Presence>,
    active: Option<CancellationToken>,
    thinking_period: Duration,
    talking_period: Duration,
}

impl PresenceDriver {
    pub fn new() -> (Self, watch::Receiver<Presence>) {
        let (tx, rx) = watch::channel(Presence::initial());
        (
            Self {
                tx,
                active: None,
                thinking_period: THINKING_PERIOD,
                talking_period: TALKING_PERIOD,
            },
            rx,
        )
    }

    /// Override the frame periods (short periods keep tests fast).
    #[allow(dead_code)]
    pub fn with_periods(mut self, thinking: Duration, talking: Duration) -> Self {
        self.thinking_period = thinking;
        self.talking_period = talking;
        self
    }

    /// Start oscillating in the given mode, cancelling any live timer first.
    ///
    /// Talking runs for roughly `pace_hint / 2` full cycles and then settles
    /// to the neutral frame on its own, so a caller that forgets to `stop`
    /// cannot leak an oscillation.
    pub fn start(&mut self, mode: PresenceMode, pace_hint: Option<usize>) {
        self.cancel_active();
        match mode {
            PresenceMode::Idle => {
                self.tx.send_replace(Presence::idle());
            }
            PresenceMode::Thinking => {
                let token = CancellationToken::new();
                self.active = Some(token.clone());
                tokio::spawn(run_thinking(self.tx.clone(), token, self.thinking_period));
            }
            PresenceMode::Talking => {
                let words = pace_hint.unwrap_or(DEFAULT_TALK_WORDS);
                let token = CancellationToken::new();
                self.active = Some(token.clone());
                tokio::spawn(run_talking(
                    self.tx.clone(),
                    token,
                    self.talking_period,
                    words,
                ));
            }
        }
    }

    /// Cancel any live timer and settle to the neutral idle frame.
    /// Idempotent: stopping an already-idle driver is a no-op.
    pub fn stop(&mut self) {
        self.cancel_active();
        self.tx.send_replace(Presence::idle());
    }

    /// Whether a timer task is currently armed.
    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    fn cancel_active(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

async fn run_thinking(tx: watch::Sender<Presence>, token: CancellationToken, period: Duration) {
    let mut frame = PresenceFrame::Thinking1;
    publish(&tx, &token, PresenceMode::Thinking, frame);
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            () = tokio::time::sleep(period) => {}
        }
        frame = match frame {
            PresenceFrame::Thinking1 => PresenceFrame::Thinking2,
            _ => PresenceFrame::Thinking1,
        };
        if !publish(&tx, &token, PresenceMode::Thinking, frame) {
            return;
        }
    }
}

async fn run_talking(
    tx: watch::Sender<Presence>,
    token: CancellationToken,
    period: Duration,
    words: usize,
) {
    // Roughly one open/close cycle per two revealed words.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cycles = ((words as f64) / 2.0).round() as usize;
    let flips = cycles * 2;

    let mut frame = PresenceFrame::Talking;
    publish(&tx, &token, PresenceMode::Talking, frame);
    for _ in 0..flips {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            () = tokio::time::sleep(period) => {}
        }
        frame = match frame {
            PresenceFrame::Talking => PresenceFrame::Neutral,
            _ => PresenceFrame::Talking,
        };
        if !publish(&tx, &token, PresenceMode::Talking, frame) {
            return;
        }
    }
    // Deterministic settle even if nobody calls stop().
    publish(&tx, &token, PresenceMode::Idle, PresenceFrame::Neutral);
}

/// Publish a frame unless the task has been superseded. Returns false when
/// the task should exit.
fn publish(
    tx: &watch::Sender<Presence>,
    token: &CancellationToken,
    mode: PresenceMode,
    frame: PresenceFrame,
) -> bool {
    if token.is_cancelled() {
        return false;
    }
    tx.send_replace(Presence { mode, frame });
    true
}
