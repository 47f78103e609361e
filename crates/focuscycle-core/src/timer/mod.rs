mod clock;
mod countdown;
mod driver;

pub use clock::{alignment_delay, format_clock, Clock, ManualClock, SystemClock, TICK_INTERVAL};
pub use countdown::CountdownEngine;
pub use driver::TickDriver;
