use dipolar::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Owns the terminal while a command runs. Progress events and log lines arrive on one
/// channel so that log output is printed above the bars instead of tearing them.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: BarState,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    phase: String,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());

        let manager = Self {
            mp,
            state: BarState::default(),
            events,
            shutdown,
            _sentinel_bar,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Whatever was queued before shutdown still gets printed.
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(bar) = self.state.active_bar.take() {
            bar.finish_and_clear();
        }
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => {
                self.mp.println(line).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_message(name);

                self.state.active_bar = Some(pb);
                self.state.phase = name.to_string();
            }
            Progress::PhaseFinish => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }
                self.mp.println(format!("✓ {}", self.state.phase)).ok();
                self.state.phase.clear();
            }
            Progress::TaskStart { total } => {
                if let Some(bar) = &self.state.active_bar {
                    bar.disable_steady_tick();
                    bar.set_style(Self::bar_style());
                    bar.set_length(total);
                    bar.set_position(0);
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(bar) = &self.state.active_bar {
                    bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = &self.state.active_bar {
                    bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(bar) = &self.state.active_bar {
                    bar.set_message(format!("{} ({})", self.state.phase, text));
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:<36} [{bar:40.cyan/blue}] {human_pos}/{human_len} {per_sec} ({eta})",
        )
        .expect("Invalid template")
        .with_key(
            "eta",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            },
        )
        .progress_chars("━╸ ")
    }
}

/// Bridges the engine's progress callback onto the UI event channel.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            // A rejected event is lost; the manager still clears any open bar on shutdown.
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}
