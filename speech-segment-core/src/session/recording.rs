use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::models::config::{SessionConfiguration, StopPolicy};
use crate::models::error::CaptureError;
use crate::models::segment::{EncodedSegment, SegmentInfo};
use crate::models::state::SessionState;
use crate::processing::encoder::ContainerEncoder;
use crate::processing::frame_buffer::FrameBuffer;
use crate::session::timer::DrainTimer;
use crate::traits::capture_source::{CaptureSource, ChunkCallback};
use crate::traits::segment_sink::SegmentSink;
use crate::traits::session_delegate::SessionDelegate;

/// Counters for debugging a recording session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionDiagnostics {
    pub chunks_received: u64,
    pub samples_received: u64,
    pub segments_delivered: u64,
    pub deliveries_failed: u64,
    pub empty_drains: u64,
}

/// Returned when a session stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub segments_delivered: u64,
    pub samples_captured: u64,
    pub audio_secs: f64,
    pub wall_secs: f64,
    pub diagnostics: SessionDiagnostics,
}

#[derive(Default)]
struct Counters {
    chunks_received: AtomicU64,
    samples_received: AtomicU64,
    segments_delivered: AtomicU64,
    deliveries_failed: AtomicU64,
    empty_drains: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SessionDiagnostics {
        SessionDiagnostics {
            chunks_received: self.chunks_received.load(Ordering::Relaxed),
            samples_received: self.samples_received.load(Ordering::Relaxed),
            segments_delivered: self.segments_delivered.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
            empty_drains: self.empty_drains.load(Ordering::Relaxed),
        }
    }
}

/// One drain → encode → deliver pass, shared by the timer thread and the
/// stopping thread.
struct DrainCycle {
    session_id: Uuid,
    buffer: Arc<Mutex<FrameBuffer>>,
    encoder: ContainerEncoder,
    sink: Arc<dyn SegmentSink>,
    delegate: Option<Arc<dyn SessionDelegate>>,
    state: Arc<Mutex<SessionState>>,
    counters: Arc<Counters>,
    // Serializes cycles; holds the next segment index.
    next_index: Mutex<u64>,
}

impl DrainCycle {
    fn run(&self) -> Result<Option<SegmentInfo>, CaptureError> {
        let mut next_index = self.next_index.lock();

        let Some(segment) = self.buffer.lock().drain_and_reset() else {
            self.counters.empty_drains.fetch_add(1, Ordering::Relaxed);
            log::trace!("session {}: nothing captured, skipping drain", self.session_id);
            return Ok(None);
        };

        let index = *next_index;
        *next_index += 1;

        let container = self.encoder.encode(&segment);
        let encoded = EncodedSegment::new(self.session_id, index, &segment, container);
        log::debug!(
            "session {}: segment {} with {} samples ({:.2}s, {} bytes)",
            self.session_id,
            index,
            encoded.info.sample_count,
            encoded.info.duration_secs,
            encoded.info.byte_length
        );

        match self.sink.deliver(&encoded) {
            Ok(()) => {
                let delivered = self.counters.segments_delivered.fetch_add(1, Ordering::Relaxed) + 1;
                {
                    let mut state = self.state.lock();
                    if state.is_recording() {
                        *state = SessionState::Recording {
                            segments_delivered: delivered,
                        };
                    }
                }
                if let Some(ref delegate) = self.delegate {
                    delegate.on_segment_delivered(&encoded.info);
                }
                Ok(Some(encoded.info))
            }
            Err(e) => {
                self.counters.deliveries_failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("session {}: segment {} not delivered: {}", self.session_id, index, e);
                if let Some(ref delegate) = self.delegate {
                    delegate.on_error(&e);
                }
                Err(e)
            }
        }
    }
}

/// A recording session owning its capture source and drain timer.
///
/// Data flow:
/// ```text
/// [CaptureSource] → append → [FrameBuffer] ← drain every interval ← [DrainTimer]
///                                   ↓
///                        [ContainerEncoder] → [SegmentSink]
/// ```
///
/// Capture and timer are acquired together in `start` and released together
/// in `stop`. Dropping a recording session performs the same teardown, so
/// the timer can never outlive the session.
pub struct RecordingSession<S: CaptureSource> {
    source: S,
    config: SessionConfiguration,
    encoder: ContainerEncoder,
    session_id: Uuid,
    buffer: Arc<Mutex<FrameBuffer>>,
    sink: Arc<dyn SegmentSink>,
    delegate: Option<Arc<dyn SessionDelegate>>,
    state: Arc<Mutex<SessionState>>,
    counters: Arc<Counters>,
    cycle: Option<Arc<DrainCycle>>,
    timer: Option<DrainTimer>,
    started_at: Option<Instant>,
}

impl<S: CaptureSource> RecordingSession<S> {
    pub fn new(
        source: S,
        config: SessionConfiguration,
        sink: Arc<dyn SegmentSink>,
    ) -> Result<Self, CaptureError> {
        config.validate()?;
        let encoder = ContainerEncoder::new(config.format)?;
        let buffer = FrameBuffer::with_capacity(config.buffer_capacity()?);

        Ok(Self {
            source,
            config,
            encoder,
            session_id: Uuid::new_v4(),
            buffer: Arc::new(Mutex::new(buffer)),
            sink,
            delegate: None,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            counters: Arc::new(Counters::default()),
            cycle: None,
            timer: None,
            started_at: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.counters.snapshot()
    }

    /// Samples captured since the last drain.
    pub fn pending_samples(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Start capture and the drain timer. Transitions: idle → recording.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if !self.state.lock().is_idle() {
            return Err(CaptureError::InvalidState(
                "can only start from idle state".into(),
            ));
        }
        if !self.source.is_available() {
            return self.fail_start(CaptureError::DeviceNotAvailable);
        }

        let cycle = Arc::new(DrainCycle {
            session_id: self.session_id,
            buffer: Arc::clone(&self.buffer),
            encoder: self.encoder,
            sink: Arc::clone(&self.sink),
            delegate: self.delegate.clone(),
            state: Arc::clone(&self.state),
            counters: Arc::clone(&self.counters),
            next_index: Mutex::new(0),
        });

        let buffer = Arc::clone(&self.buffer);
        let counters = Arc::clone(&self.counters);
        let callback: ChunkCallback = Arc::new(move |chunk: &[f32]| {
            buffer.lock().append(chunk);
            counters.chunks_received.fetch_add(1, Ordering::Relaxed);
            counters.samples_received.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        });

        if let Err(e) = self.source.start(callback) {
            return self.fail_start(e);
        }

        let tick_cycle = Arc::clone(&cycle);
        let timer = match DrainTimer::start("segment-drain", self.config.drain_interval(), move || {
            // Failures were already logged and reported to the delegate.
            let _ = tick_cycle.run();
        }) {
            Ok(timer) => timer,
            Err(e) => {
                let _ = self.source.stop();
                self.buffer.lock().clear();
                return self.fail_start(e);
            }
        };

        self.cycle = Some(cycle);
        self.timer = Some(timer);
        self.started_at = Some(Instant::now());
        self.set_state(SessionState::Recording {
            segments_delivered: 0,
        });

        log::info!(
            "session {} recording from {} ({} Hz, {} ch, {}-bit, drain every {} ms)",
            self.session_id,
            self.source.device_name(),
            self.config.format.sample_rate,
            self.config.format.channels,
            self.config.format.bits_per_sample,
            self.config.drain_interval_ms
        );
        Ok(())
    }

    /// Drain, encode and deliver right now, outside the timer cadence.
    ///
    /// Returns `Ok(None)` when nothing was captured since the last drain.
    pub fn drain_now(&self) -> Result<Option<SegmentInfo>, CaptureError> {
        let recording = self.state.lock().is_recording();
        match (&self.cycle, recording) {
            (Some(cycle), true) => cycle.run(),
            _ => Err(CaptureError::InvalidState(
                "can only drain while recording".into(),
            )),
        }
    }

    /// Stop capture and the timer, then flush or discard the partial segment
    /// per the configured `StopPolicy`. Transitions: recording → stopping → stopped.
    pub fn stop(&mut self) -> Result<SessionSummary, CaptureError> {
        if !self.state.lock().is_recording() {
            return Err(CaptureError::InvalidState(
                "can only stop while recording".into(),
            ));
        }
        self.teardown();
        Ok(self.summary())
    }

    fn teardown(&mut self) {
        self.set_state(SessionState::Stopping);

        if let Err(e) = self.source.stop() {
            log::error!("session {}: failed to stop capture: {}", self.session_id, e);
            if let Some(ref delegate) = self.delegate {
                delegate.on_error(&e);
            }
        }

        // Joins the drain thread; no tick runs after this.
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        match self.config.stop_policy {
            StopPolicy::Flush => {
                if let Some(cycle) = self.cycle.take() {
                    let _ = cycle.run();
                }
            }
            StopPolicy::Discard => {
                let mut buffer = self.buffer.lock();
                if !buffer.is_empty() {
                    log::debug!(
                        "session {}: discarding {} pending samples",
                        self.session_id,
                        buffer.len()
                    );
                }
                buffer.clear();
            }
        }
        self.cycle = None;

        let delivered = self.counters.segments_delivered.load(Ordering::Relaxed);
        self.set_state(SessionState::Stopped {
            segments_delivered: delivered,
        });
        log::info!("session {} stopped after {} segments", self.session_id, delivered);
    }

    fn summary(&self) -> SessionSummary {
        let diagnostics = self.counters.snapshot();
        let samples = diagnostics.samples_received;
        SessionSummary {
            session_id: self.session_id,
            segments_delivered: diagnostics.segments_delivered,
            samples_captured: samples,
            audio_secs: self.config.format.duration_secs(samples as usize),
            wall_secs: self.started_at.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0),
            diagnostics,
        }
    }

    fn fail_start(&self, error: CaptureError) -> Result<(), CaptureError> {
        log::error!("session {}: failed to start: {}", self.session_id, error);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
        Err(error)
    }

    fn set_state(&self, new_state: SessionState) {
        {
            let mut state = self.state.lock();
            *state = new_state.clone();
        }
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&new_state);
        }
    }
}

impl<S: CaptureSource> Drop for RecordingSession<S> {
    fn drop(&mut self) {
        if self.state.lock().is_recording() {
            log::debug!("session {} dropped while recording", self.session_id);
            self.teardown();
        }
    }
}
