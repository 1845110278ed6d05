pub mod format;
pub mod ft;
pub mod live;
pub mod poster;

pub use ft::FullTimeTracker;
pub use live::LivePoller;
pub use poster::UpsertPoster;
