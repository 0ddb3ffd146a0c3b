pub mod builder;
pub mod status;

pub use builder::TimelineBuilder;
pub use status::{status_of, subtitle_for, with_statuses};
