#![forbid(unsafe_code)]

pub mod interchange;
pub mod mastery;
pub mod model;
pub mod planner;
pub mod search;
pub mod stats;
pub mod time;
pub mod timer;

pub use time::Clock;
