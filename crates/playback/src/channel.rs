//! Audio output channel: owns the I²S bus and its DMA ring.
//!
//! ```text
//! Uninitialized ──configure──▶ Configured ──play──▶ Streaming
//!       ▲                          ▲                   │
//!       └─ configure failure       └──── Draining ◀────┘
//! ```
//!
//! Starting and stopping an I²S stream on a class-D amplifier clicks unless
//! the ring is full of silence on both sides of the payload. `configure`
//! therefore primes the ring with at least one cycle of silence, and every
//! `play` ends with a staged drain, regardless of how streaming ended.

use embassy_futures::yield_now;
use embedded_hal_async::delay::DelayNs;
use platform::{AudioBus, AudioChannelConfig, Clock, File, I2sPins, QuietEnvironment, WriteTimeout};

use crate::chunk::{ChunkBuffer, CHUNK_BYTES};
use crate::error::{AudioError, ConfigStage};
use crate::session::{PlaybackReport, PlaybackSession};

/// Wait after releasing the pins before the driver is installed.
pub const PIN_SETTLE_MS: u32 = 100;

/// Wait after zeroing the ring before priming.
pub const PRIME_SETTLE_MS: u32 = 100;

/// Lower bound on silence buffers written while priming.
pub const MIN_PRIME_BUFFERS: usize = 15;

/// Timeout of each priming write.
pub const PRIME_WRITE_TIMEOUT_MS: u32 = 1000;

/// Gap between priming writes.
pub const PRIME_GAP_MS: u32 = 5;

static SILENCE: [u8; CHUNK_BYTES] = [0u8; CHUNK_BYTES];

/// Lifecycle of an [`AudioOutputChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// No driver installed.
    Uninitialized,
    /// Driver installed and primed; ready for a session.
    Configured,
    /// A session is writing PCM.
    Streaming,
    /// Silence is being written after a session.
    Draining,
}

/// One step of the post-playback drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrainStage {
    /// Silence writes issued.
    pub bursts: u8,
    /// Bytes per silence write.
    pub burst_bytes: usize,
    /// Timeout of each write.
    pub timeout_ms: u32,
    /// Wait after each write.
    pub gap_ms: u32,
    /// Wait after the ring is zeroed at the end of the stage.
    pub settle_ms: u32,
}

/// Sequence of silence bursts and ring clears run after every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrainProfile {
    /// Stages, run in order.
    pub stages: [DrainStage; 2],
}

impl Default for DrainProfile {
    fn default() -> Self {
        Self {
            stages: [
                DrainStage { bursts: 3, burst_bytes: 512, timeout_ms: 100, gap_ms: 5, settle_ms: 50 },
                DrainStage { bursts: 5, burst_bytes: 512, timeout_ms: 50, gap_ms: 10, settle_ms: 20 },
            ],
        }
    }
}

/// Counters exposed for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStats {
    /// Successful configurations.
    pub configurations: u32,
    /// Sessions that started streaming.
    pub sessions_started: u32,
    /// Drains run.
    pub drains: u32,
}

/// Exclusive owner of the I²S bus.
///
/// Every operation takes `&mut self`; a session that was abandoned mid-stream
/// leaves the channel `Streaming` and later sessions are refused with
/// [`AudioError::Busy`] until it is reconfigured.
pub struct AudioOutputChannel<B, E, D, C> {
    bus: B,
    environment: E,
    delay: D,
    clock: C,
    pins: I2sPins,
    config: Option<AudioChannelConfig>,
    state: ChannelState,
    environment_prepared: bool,
    drain: DrainProfile,
    chunk: ChunkBuffer<CHUNK_BYTES>,
    stats: ChannelStats,
}

impl<B, E, D, C> AudioOutputChannel<B, E, D, C>
where
    B: AudioBus,
    E: QuietEnvironment,
    D: DelayNs,
    C: Clock,
{
    /// Create an unconfigured channel.
    pub fn new(bus: B, environment: E, delay: D, clock: C, pins: I2sPins) -> Self {
        Self {
            bus,
            environment,
            delay,
            clock,
            pins,
            config: None,
            state: ChannelState::Uninitialized,
            environment_prepared: false,
            drain: DrainProfile::default(),
            chunk: ChunkBuffer::new(),
            stats: ChannelStats::default(),
        }
    }

    /// Replace the default drain sequence.
    #[must_use]
    pub fn with_drain_profile(mut self, drain: DrainProfile) -> Self {
        self.drain = drain;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Configuration in effect, if any.
    pub fn config(&self) -> Option<AudioChannelConfig> {
        self.config
    }

    /// Counters.
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// The owned bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// The owned bus, mutably.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// The owned quiet-environment collaborator.
    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// The owned delay.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// The clock session deadlines are measured against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Tear down any existing driver and bring the channel up with `config`.
    ///
    /// Priming failures are logged and do not fail configuration.
    ///
    /// # Errors
    ///
    /// [`AudioError::Configuration`] naming the failed stage. The channel is
    /// left [`ChannelState::Uninitialized`].
    pub async fn configure(&mut self, config: AudioChannelConfig) -> Result<(), AudioError> {
        if self.bus.uninstall_driver().await.is_err() {
            debug!("uninstall before configure failed; continuing");
        }
        self.state = ChannelState::Uninitialized;
        self.config = None;

        if config.validate().is_err() {
            warn!("rejected audio configuration {:?}", config);
            return Err(AudioError::Configuration { stage: ConfigStage::Validate });
        }

        if !self.environment_prepared {
            self.environment_prepared = true;
            if self.environment.prepare_quiet_environment().await.is_err() {
                warn!("quiet environment preparation failed");
            }
        }

        if self.bus.release_pins(&self.pins).await.is_err() {
            warn!("could not release I2S pins");
        }
        self.delay.delay_ms(PIN_SETTLE_MS).await;

        if let Err(stage) = self.bring_up(&config).await {
            warn!("audio configuration failed at {:?}", stage);
            if self.bus.uninstall_driver().await.is_err() {
                debug!("cleanup uninstall failed");
            }
            return Err(AudioError::Configuration { stage });
        }

        self.config = Some(config);
        self.state = ChannelState::Configured;
        self.stats.configurations = self.stats.configurations.saturating_add(1);
        info!(
            "I2S configured: {} Hz, {} bit, {} ch, {} x {} frames",
            config.sample_rate_hz,
            config.bit_depth,
            config.channels,
            config.buffer_count,
            config.buffer_frames
        );

        self.prime(&config).await;
        Ok(())
    }

    /// Stream `session` to the bus, then drain.
    ///
    /// Each read of up to [`CHUNK_BYTES`] is truncated to whole frames and
    /// written with no timeout; the partial frame is carried into the next
    /// read. A short write is retried with the remainder until the whole
    /// chunk is accepted. The task yields after every chunk.
    ///
    /// # Errors
    ///
    /// - [`AudioError::NotConfigured`] before a successful `configure`; nothing is written.
    /// - [`AudioError::Busy`] while an earlier session is unfinished; nothing is written.
    /// - [`AudioError::Write`] on a bus error or a write that accepts nothing,
    ///   [`AudioError::SourceRead`] or
    ///   [`AudioError::DeadlineExceeded`] when streaming stops early. The
    ///   channel has been drained and is `Configured` again.
    pub async fn play<F: File>(
        &mut self,
        session: PlaybackSession<F>,
    ) -> Result<PlaybackReport, AudioError> {
        match self.state {
            ChannelState::Configured => {}
            ChannelState::Uninitialized => {
                debug!("play ignored: channel not configured");
                return Err(AudioError::NotConfigured);
            }
            ChannelState::Streaming | ChannelState::Draining => {
                warn!("play refused: channel busy ({:?})", self.state);
                return Err(AudioError::Busy);
            }
        }

        self.state = ChannelState::Streaming;
        self.stats.sessions_started = self.stats.sessions_started.saturating_add(1);
        let result = self.stream(session).await;

        self.state = ChannelState::Draining;
        self.drain().await;
        self.state = ChannelState::Configured;

        match &result {
            Ok(report) => info!(
                "played {} bytes in {} chunks ({} ms)",
                report.bytes_written,
                report.chunks_written,
                report.elapsed_ms
            ),
            Err(e) => warn!("playback stopped: {:?}", e),
        }
        result
    }

    /// Uninstall the driver and return to [`ChannelState::Uninitialized`].
    pub async fn shutdown(&mut self) {
        if self.bus.uninstall_driver().await.is_err() {
            debug!("uninstall on shutdown failed");
        }
        self.config = None;
        self.state = ChannelState::Uninitialized;
    }

    async fn bring_up(&mut self, config: &AudioChannelConfig) -> Result<(), ConfigStage> {
        self.bus.install_driver(config).await.map_err(|_| ConfigStage::DriverInstall)?;
        self.bus.set_pins(&self.pins).await.map_err(|_| ConfigStage::PinRouting)?;
        self.bus.set_clock(config).await.map_err(|_| ConfigStage::Clock)?;
        Ok(())
    }

    async fn prime(&mut self, config: &AudioChannelConfig) {
        if self.bus.zero_dma_buffer().await.is_err() {
            warn!("zeroing DMA ring before prime failed");
        }
        self.delay.delay_ms(PRIME_SETTLE_MS).await;

        let buffers = MIN_PRIME_BUFFERS.max(usize::from(config.buffer_count));
        let timeout = WriteTimeout::Millis(PRIME_WRITE_TIMEOUT_MS);
        for i in 0..buffers {
            if write_silence(&mut self.bus, config.buffer_bytes(), timeout).await.is_err() {
                warn!("priming write {} of {} failed", i, buffers);
            }
            self.delay.delay_ms(PRIME_GAP_MS).await;
        }
        debug!("primed DMA ring with {} silent buffers", buffers);
    }

    async fn stream<F: File>(
        &mut self,
        mut session: PlaybackSession<F>,
    ) -> Result<PlaybackReport, AudioError> {
        let started = self.clock.now_ms();
        let bytes_per_frame = session.bytes_per_frame;
        let mut report = PlaybackReport::default();
        self.chunk.clear();

        loop {
            if self.clock.now_ms() >= session.deadline_ms {
                warn!("playback deadline reached after {} bytes", report.bytes_written);
                return Err(AudioError::DeadlineExceeded);
            }

            let read = session.source.read(self.chunk.spare_mut()).await?;
            self.chunk.commit(read.len);

            let aligned = self.chunk.aligned(bytes_per_frame).len();
            if aligned > 0 {
                let mut offset = 0;
                while offset < aligned {
                    let piece = self.chunk.aligned(bytes_per_frame).get(offset..).unwrap_or(&[]);
                    let written = self
                        .bus
                        .write(piece, WriteTimeout::Forever)
                        .await
                        .map_err(|_| AudioError::Write)?;
                    if written == 0 {
                        warn!("bus stopped accepting after {} of {} bytes", offset, aligned);
                        return Err(AudioError::Write);
                    }
                    if written < piece.len() {
                        trace!("short blocking write: {} of {}", written, piece.len());
                    }
                    offset = offset.saturating_add(written);
                }
                self.chunk.consume(aligned);
                report.bytes_written = report.bytes_written.saturating_add(aligned);
                report.chunks_written = report.chunks_written.saturating_add(1);
            }

            if read.end {
                if !self.chunk.is_empty() {
                    debug!("discarding {} byte partial frame at end of stream", self.chunk.len());
                }
                self.chunk.clear();
                report.elapsed_ms = self.clock.now_ms().saturating_sub(started);
                return Ok(report);
            }

            yield_now().await;
        }
    }

    async fn drain(&mut self) {
        for stage in self.drain.stages {
            let timeout = WriteTimeout::Millis(stage.timeout_ms);
            for _ in 0..stage.bursts {
                if write_silence(&mut self.bus, stage.burst_bytes, timeout).await.is_err() {
                    trace!("drain burst failed");
                }
                self.delay.delay_ms(stage.gap_ms).await;
            }
            if self.bus.zero_dma_buffer().await.is_err() {
                trace!("drain ring clear failed");
            }
            self.delay.delay_ms(stage.settle_ms).await;
        }
        self.stats.drains = self.stats.drains.saturating_add(1);
    }
}

/// Write `len` bytes of silence, giving up early if the bus stops accepting.
async fn write_silence<B: AudioBus>(
    bus: &mut B,
    len: usize,
    timeout: WriteTimeout,
) -> Result<(), B::Error> {
    let mut left = len;
    while left > 0 {
        let piece = SILENCE.get(..left.min(SILENCE.len())).unwrap_or(&[]);
        let written = bus.write(piece, timeout).await?;
        if written == 0 {
            break;
        }
        left = left.saturating_sub(written);
    }
    Ok(())
}
