pub mod capture_source;
pub mod segment_sink;
pub mod session_delegate;
pub mod speech_service;
