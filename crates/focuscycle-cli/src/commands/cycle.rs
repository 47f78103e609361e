use clap::{Args, Subcommand};
use focuscycle_core::{Cycle, SessionMode};

#[derive(Subcommand)]
pub enum CycleAction {
    /// Advance to the next session
    Next(StateArgs),
    /// Go back to the previous session
    Previous(StateArgs),
    /// Reset the cycle to its starting state
    Reset(StateArgs),
}

/// Cycle transitions are pure functions of the observable state, so the
/// state travels on the command line and the result prints as JSON.
#[derive(Args)]
pub struct StateArgs {
    /// Current session mode (focus, short-break, long-break)
    #[arg(long, default_value = "focus")]
    mode: String,
    /// Completed focus sessions so far
    #[arg(long, default_value_t = 0)]
    count: u32,
    /// Focus sessions per long break
    #[arg(long, default_value_t = 4)]
    interval: u32,
}

impl StateArgs {
    fn build(&self) -> Result<Cycle, Box<dyn std::error::Error>> {
        let mode: SessionMode = self.mode.parse()?;
        Ok(Cycle::from_parts(mode, self.count, self.interval))
    }
}

pub fn run(action: CycleAction) -> Result<(), Box<dyn std::error::Error>> {
    let cycle = match action {
        CycleAction::Next(args) => {
            let mut cycle = args.build()?;
            cycle.advance();
            cycle
        }
        CycleAction::Previous(args) => {
            let mut cycle = args.build()?;
            cycle.retreat();
            cycle
        }
        CycleAction::Reset(args) => {
            let mut cycle = args.build()?;
            cycle.reset();
            cycle
        }
    };
    println!("{}", serde_json::to_string_pretty(&cycle)?);
    Ok(())
}
