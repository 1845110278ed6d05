pub mod clock;
pub mod daemon;
pub mod day;

pub use clock::Clock;
pub use daemon::Daemon;
pub use day::{DailyCycle, KickoffPlan};
