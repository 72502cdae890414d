//! Synthetic capture source.
//!
//! Stands in for a microphone: a dedicated thread generates a sine tone and
//! delivers it in fixed-size chunks at real-time pace.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use speech_segment_core::{CaptureError, CaptureSource, ChunkCallback, ContainerFormatParams};

/// Phase-continuous sine generator producing interleaved chunks.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    format: ContainerFormatParams,
    frequency: f32,
    amplitude: f32,
    phase: f32,
}

impl ToneGenerator {
    pub fn new(format: ContainerFormatParams, frequency: f32, amplitude: f32) -> Self {
        Self {
            format,
            frequency,
            amplitude,
            phase: 0.0,
        }
    }

    /// Next `frames` frames, each sample repeated across all channels.
    pub fn next_chunk(&mut self, frames: usize) -> Vec<f32> {
        let channels = self.format.channels as usize;
        let step = TAU * self.frequency / self.format.sample_rate as f32;
        let mut chunk = Vec::with_capacity(frames * channels);
        for _ in 0..frames {
            let value = self.amplitude * self.phase.sin();
            chunk.extend(std::iter::repeat(value).take(channels));
            self.phase = (self.phase + step) % TAU;
        }
        chunk
    }
}

/// Capture source backed by a [`ToneGenerator`] thread.
pub struct ToneSource {
    generator: ToneGenerator,
    chunk_duration: Duration,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ToneSource {
    pub fn new(format: ContainerFormatParams, frequency: f32, chunk_duration: Duration) -> Self {
        Self {
            generator: ToneGenerator::new(format, frequency, 0.5),
            chunk_duration,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    fn frames_per_chunk(&self) -> usize {
        let rate = self.generator.format.sample_rate as f64;
        ((rate * self.chunk_duration.as_secs_f64()).round() as usize).max(1)
    }
}

impl CaptureSource for ToneSource {
    fn is_available(&self) -> bool {
        !self.chunk_duration.is_zero()
    }

    fn start(&mut self, callback: ChunkCallback) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::InvalidState("tone capture already running".into()));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let mut generator = self.generator.clone();
        let frames = self.frames_per_chunk();
        let period = self.chunk_duration;

        let handle = thread::Builder::new()
            .name("tone-capture".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    next += period;
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    callback(&generator.next_chunk(frames));
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn tone thread: {}", e)))?;

        *self.capture_handle.lock() = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn device_name(&self) -> String {
        format!("{:.0} Hz test tone", self.generator.frequency)
    }
}
