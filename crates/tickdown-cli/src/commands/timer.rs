use clap::Subcommand;
use serde::Serialize;
use tickdown_core::error::Result;
use tickdown_core::timer::{format_seconds, parse_duration, NextTick, Preload};
use tickdown_core::{
    ConfigStore, CountdownRun, CountdownSession, DisplaySink, EngineOutcome, Event,
    FileConfigStore, MemoryConfigStore, NullSoundPlayer, Presenter, SoundPlayer, TimerController,
};

use crate::terminal::{BellPlayer, SilentDisplay, TerminalDisplay, TerminalErrors};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Count down from DURATION seconds, ticking near the end
    Run {
        /// Duration in seconds, e.g. "90" or "2.5"
        duration: String,
        /// Print one JSON event per line instead of redrawing the display
        #[arg(long)]
        json: bool,
        /// With --json, also print a progress event for every poll
        #[arg(long, requires = "json")]
        progress: bool,
        /// Tick lead in seconds for this run only (default: stored setting)
        #[arg(long)]
        lead: Option<u32>,
        /// Do not ring the terminal bell
        #[arg(long)]
        quiet: bool,
    },
    /// Print when ticking and preloading would happen, without running
    Plan {
        /// Duration in seconds
        duration: String,
        /// Tick lead in seconds (default: stored setting)
        #[arg(long)]
        lead: Option<u32>,
    },
}

#[derive(Serialize)]
struct Plan {
    duration_ns: i64,
    display: String,
    tick_lead_seconds: u32,
    next_tick: NextTick,
    preload: Preload,
}

pub fn run(action: TimerAction) -> Result<()> {
    let store = FileConfigStore::open_default()?;
    match action {
        TimerAction::Run {
            duration,
            json,
            progress,
            lead,
            quiet,
        } => {
            let opts = RunOptions {
                json,
                progress,
                quiet,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            match lead {
                // A one-off lead must not be written back to the config file.
                Some(lead) => {
                    let mut store = MemoryConfigStore::new(store.snapshot());
                    store.set_tick_lead_seconds(lead)?;
                    runtime.block_on(run_countdown(store, &duration, opts))
                }
                None => runtime.block_on(run_countdown(store, &duration, opts)),
            }
        }
        TimerAction::Plan { duration, lead } => {
            let config = store.snapshot();
            let lead = lead.unwrap_or(config.timer.tick_lead_seconds);
            let nanos = parse_duration(&duration)?;
            let session = CountdownSession::begin(nanos, lead, 0);
            let plan = Plan {
                duration_ns: session.duration(),
                display: format_seconds(session.duration(), config.timer.display_decimals),
                tick_lead_seconds: lead,
                next_tick: session.next_tick(),
                preload: session.preload(),
            };
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RunOptions {
    json: bool,
    progress: bool,
    quiet: bool,
}

async fn run_countdown<S: ConfigStore>(store: S, duration: &str, opts: RunOptions) -> Result<()> {
    let decimals = store.display_decimals();
    let mut controller = TimerController::new(store, TerminalErrors);

    let mut run = match controller.start(duration) {
        Ok(run) => run,
        Err(err) => {
            // The error sink has already printed the reason.
            if opts.json {
                print_event(&Event::rejected(err));
            }
            std::process::exit(1);
        }
    };

    let player: Box<dyn SoundPlayer> = if opts.quiet {
        Box::new(NullSoundPlayer::default())
    } else {
        Box::new(BellPlayer::new())
    };
    let display: Box<dyn DisplaySink> = if opts.json {
        Box::new(SilentDisplay)
    } else {
        Box::new(TerminalDisplay::default())
    };
    let presenter = Presenter::new(player, display).with_decimals(decimals);

    if opts.json {
        print_event(&Event::started(run.session()));
    }
    let last = drive(&mut controller, &mut run, presenter, |outcome| {
        if !opts.json {
            return;
        }
        let event = Event::from_outcome(outcome, decimals);
        if opts.progress || !event.is_progress() {
            print_event(&event);
        }
    })
    .await;

    let finished = last == Some(EngineOutcome::PlayDone);
    if opts.json {
        if !finished && last != Some(EngineOutcome::AlreadyTerminated) {
            print_event(&Event::from_outcome(&EngineOutcome::AlreadyTerminated, decimals));
        }
    } else if finished {
        println!("\n🔔 Time's up!");
    } else {
        println!("\n🛑 Stopped.");
    }
    Ok(())
}

/// Drive the run to completion, stopping it on Ctrl-C.
async fn drive<S, P, D>(
    controller: &mut TimerController<S>,
    run: &mut CountdownRun,
    mut presenter: Presenter<P, D>,
    observe: impl FnMut(&EngineOutcome),
) -> Option<EngineOutcome>
where
    S: ConfigStore,
    P: SoundPlayer,
    D: DisplaySink,
{
    let driving = run.drive(&mut presenter, observe);
    tokio::pin!(driving);
    tokio::select! {
        last = &mut driving => last,
        Ok(()) = tokio::signal::ctrl_c() => {
            controller.stop();
            driving.await
        }
    }
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(err) => tracing::warn!(%err, "failed to serialize event"),
    }
}
