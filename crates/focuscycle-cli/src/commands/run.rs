//! Interactive session loop: the thin caller that mediates between the
//! countdown engine and the cycle state machine. It reads the configured
//! duration for the cycle's current mode, primes the engine, lets the tick
//! driver evaluate it, and on expiry advances the cycle and re-primes.

use std::io::Write;
use std::sync::{mpsc, Arc, Mutex};

use chrono::Utc;
use clap::Args;
use focuscycle_core::timer::format_clock;
use focuscycle_core::{Config, CountdownEngine, Cycle, Event, SessionMode, TickDriver};

#[derive(Args)]
pub struct RunArgs {
    /// Session mode to start in (focus, short-break, long-break)
    #[arg(long, default_value = "focus")]
    mode: String,
    /// Stop after this many completed sessions; runs until interrupted
    /// when omitted
    #[arg(long)]
    sessions: Option<u32>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mode: SessionMode = args.mode.parse()?;
    let config = Config::load_or_default();
    let mut cycle = Cycle::new(config.long_break_interval);
    cycle.set_mode(mode);

    let expiry = config.expiry_from(Utc::now(), cycle.mode());
    let engine = Arc::new(Mutex::new(CountdownEngine::new(expiry, true)));

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let (tx, rx) = mpsc::channel();
    let mut driver = TickDriver::spawn(Arc::clone(&engine), move |event| {
        let _ = tx.send(event);
    });

    let mut completed = 0u32;
    let mut label = cycle.session_label(true);
    let result = loop {
        let event = match rx.recv() {
            Ok(event) => event,
            Err(e) => break Err(e.into()),
        };
        match event {
            Event::StateSnapshot {
                display_seconds,
                progress,
                ..
            } => {
                print!(
                    "\r[{}] {} {} ({:3.0}%)  ",
                    cycle.mode(),
                    label,
                    format_clock(display_seconds),
                    progress * 100.0
                );
                std::io::stdout().flush()?;
            }
            Event::Expired { .. } => {
                completed += 1;
                println!();
                println!("[{}] session complete", cycle.mode());
                if let Some(limit) = args.sessions {
                    if completed >= limit {
                        break Ok(());
                    }
                }
                cycle.advance();
                let expiry = config.expiry_from(Utc::now(), cycle.mode());
                let mut engine = engine
                    .lock()
                    .map_err(|_| "timer state lock poisoned")?;
                engine.restart(expiry, true);
                label = cycle.session_label(true);
            }
            _ => {}
        }
    };
    driver.stop();
    result
}
