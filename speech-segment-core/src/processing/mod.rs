pub mod encoder;
pub mod frame_buffer;
pub mod wav_format;
