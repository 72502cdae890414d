pub mod recording;
pub mod timer;
