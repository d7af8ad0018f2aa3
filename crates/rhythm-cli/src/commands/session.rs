use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use tokio::time::{interval, Duration};

use rhythm_core::format::{format_amount, format_clock, format_distance, format_session_estimate};
use rhythm_core::{
    Config, Countdown, CountdownStep, Cue, CueError, CueSink, Event, LocationProvider,
    Measurement, Phase, ReplayProvider, SessionClock, SessionConfig,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session in the terminal
    Run(RunArgs),
    /// Print the session plan without running it
    Preview(SetupArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    Time,
    Distance,
}

impl From<Mode> for Measurement {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Time => Measurement::Time,
            Mode::Distance => Measurement::Distance,
        }
    }
}

#[derive(Args)]
pub struct SetupArgs {
    /// Work+recovery repetitions (1-20)
    #[arg(long)]
    intervals: Option<u32>,
    /// Measure phases by time or distance
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Work amount: seconds in time mode, meters in distance mode
    #[arg(long)]
    work: Option<f64>,
    /// Recovery amount: seconds in time mode, meters in distance mode
    #[arg(long)]
    rest: Option<f64>,
    /// Disable audio cues
    #[arg(long)]
    no_audio: bool,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    setup: SetupArgs,
    /// Fix log (JSON array) replayed as the location source in distance mode
    #[arg(long)]
    fixes: Option<PathBuf>,
    /// Lead-in countdown seconds (0 disables)
    #[arg(long, default_value_t = Countdown::DEFAULT_SECS)]
    countdown: u32,
    /// Emit events as JSON lines instead of human-readable output
    #[arg(long)]
    json: bool,
}

/// Rings the terminal bell in place of the mobile chime: one bell per pulse
/// in the cue's vibration pattern.
#[derive(Debug, Default)]
struct TerminalBellSink;

impl CueSink for TerminalBellSink {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        use std::io::Write;

        tracing::debug!(cue = ?cue, tone_hz = cue.tone_hz(), "cue requested");
        let pulses = cue.vibration_pattern_ms().len().div_ceil(2);
        let mut stdout = std::io::stdout();
        for _ in 0..pulses {
            stdout
                .write_all(b"\x07")
                .map_err(|e| CueError::PlaybackUnavailable(e.to_string()))?;
        }
        stdout
            .flush()
            .map_err(|e| CueError::PlaybackUnavailable(e.to_string()))?;
        Ok(())
    }
}

/// Layer CLI flags over the stored setup defaults.
fn build_config(setup: &SetupArgs, app: &Config) -> SessionConfig {
    let mut config = app.session_config(setup.mode.map(Measurement::from));
    if let Some(n) = setup.intervals {
        config.interval_count = n;
    }
    if let Some(work) = setup.work {
        config.work_amount = work;
    }
    if let Some(rest) = setup.rest {
        config.rest_amount = rest;
    }
    if setup.no_audio {
        config.audio_enabled = false;
    }
    config
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Preview(setup) => preview(&setup),
        SessionAction::Run(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_session(args))
        }
    }
}

fn preview(setup: &SetupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = Config::load_or_default();
    let config = build_config(setup, &app);
    config.validate()?;

    println!(
        "{} intervals × {} fast + {} easy",
        config.interval_count,
        format_amount(config.work_amount, config.measurement),
        format_amount(config.rest_amount, config.measurement),
    );
    println!("Total session: {}", format_session_estimate(&config));
    Ok(())
}

async fn run_session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let app = Config::load_or_default();
    let config = build_config(&args.setup, &app);
    let json = args.json;

    let mut clock = SessionClock::new(config.clone(), Box::new(TerminalBellSink))?;

    let provider = match config.measurement {
        Measurement::Distance => {
            let path = args
                .fixes
                .as_deref()
                .ok_or("distance mode needs --fixes <path> (a JSON fix log)")?;
            let mut provider = ReplayProvider::from_path(path)?;
            match provider.start() {
                Ok(()) => {}
                Err(err) if err.is_terminal() && config.block_on_denied => return Err(err.into()),
                Err(err) => {
                    tracing::warn!("location unavailable, session will wait for fixes: {err}");
                    emit(&Event::location_failed(&err), json);
                }
            }
            Some(provider)
        }
        Measurement::Time => None,
    };

    if args.countdown > 0 && !json {
        lead_in(args.countdown).await;
    }

    if let Some(event) = clock.start() {
        emit(&event, json);
    }

    match provider {
        Some(provider) => distance_loop(&mut clock, provider, json).await,
        None => time_loop(&mut clock, json).await,
    }

    if clock.cue_failures() > 0 {
        tracing::warn!(
            failures = clock.cue_failures(),
            "some cues could not be delivered"
        );
    }
    Ok(())
}

async fn lead_in(secs: u32) {
    let mut countdown = Countdown::new(secs);
    println!("Get ready");
    println!("  {}", countdown.remaining());

    let mut ticker = interval(Duration::from_secs(1));
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match countdown.tick() {
            CountdownStep::Counting(n) => println!("  {n}"),
            CountdownStep::Go => {
                println!("  GO!");
                break;
            }
        }
    }
}

async fn time_loop(clock: &mut SessionClock, json: bool) {
    // A fixed-period interval, not chained sleeps: ticks do not drift.
    let mut ticker = interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match clock.tick() {
                    Some(event @ Event::SessionCompleted { .. }) => {
                        emit(&event, json);
                        break;
                    }
                    Some(event) => emit(&event, json),
                    None => {
                        if !json {
                            render_status(clock);
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = clock.stop() {
                    emit(&event, json);
                }
                break;
            }
        }
    }
}

async fn distance_loop(clock: &mut SessionClock, mut provider: ReplayProvider, json: bool) {
    loop {
        tokio::select! {
            fix = provider.next_paced() => match fix {
                Ok(Some(fix)) => {
                    let mut done = false;
                    for event in clock.record_fix(fix) {
                        if matches!(event, Event::SessionCompleted { .. }) {
                            done = true;
                        }
                        emit(&event, json);
                    }
                    if done {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::warn!("fix log exhausted before the session completed");
                    if let Some(event) = clock.stop() {
                        emit(&event, json);
                    }
                    break;
                }
                Err(err) => {
                    emit(&Event::location_failed(&err), json);
                    if err.is_terminal() {
                        if let Some(event) = clock.stop() {
                            emit(&event, json);
                        }
                        break;
                    }
                    // Back off, then retry observation.
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    if let Err(retry) = provider.start() {
                        tracing::warn!("location retry failed: {retry}");
                    }
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = clock.stop() {
                    emit(&event, json);
                }
                break;
            }
        }
    }
    provider.stop();
}

fn emit(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!("cannot serialize event: {e}"),
        }
    } else {
        render_event(event);
    }
}

fn render_status(clock: &SessionClock) {
    let remaining = match clock.config().measurement {
        Measurement::Time => format_clock(clock.remaining()),
        Measurement::Distance => format_distance(clock.remaining()),
    };
    println!(
        "  {:<7} {}/{}  {} remaining",
        phase_label(clock.phase()),
        clock.current_interval(),
        clock.config().interval_count,
        remaining,
    );
}

fn render_event(event: &Event) {
    match event {
        Event::SessionStarted {
            interval_count,
            measurement,
            remaining,
            ..
        } => {
            println!(
                "Session started: {} intervals, first work phase {}",
                interval_count,
                format_amount(*remaining, *measurement),
            );
        }
        Event::PhaseChanged {
            phase,
            interval,
            remaining,
            ..
        } => {
            println!("→ {}  interval {}  {:.0} to go", phase_label(*phase), interval, remaining);
        }
        Event::SessionCompleted {
            intervals_completed,
            elapsed_secs,
            total_distance_m,
            ..
        } => {
            println!();
            println!("Well done! Session complete.");
            println!("  Intervals completed: {intervals_completed}");
            println!("  Total time: {}", format_clock(*elapsed_secs as f64));
            if let Some(total) = total_distance_m {
                println!("  Total distance: {}", format_distance(*total));
            }
        }
        Event::DistanceUpdated {
            total_m,
            remaining_m,
            ..
        } => {
            println!(
                "  {} covered, {} remaining in phase",
                format_distance(*total_m),
                format_distance(*remaining_m),
            );
        }
        Event::SessionPaused { .. } => println!("Paused"),
        Event::SessionResumed { .. } => println!("Resumed"),
        Event::SessionReset { .. } => println!("Reset to start"),
        Event::SessionStopped { .. } => println!("Session stopped"),
        Event::LocationFailed { message, terminal, .. } => {
            if *terminal {
                println!("Location lost for good: {message}");
            } else {
                println!("Location hiccup: {message}");
            }
        }
        Event::StateSnapshot { .. } => {}
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Work => "WORK",
        Phase::Recover => "RECOVER",
        Phase::Complete => "DONE",
    }
}
