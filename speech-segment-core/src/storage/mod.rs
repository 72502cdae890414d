pub mod metadata;
pub mod segment_writer;
