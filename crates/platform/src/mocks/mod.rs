//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests. Every mock records what was asked
//! of it and can be told to fail at a chosen step.

#![cfg(any(test, feature = "std"))]

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;

use crate::*;

/// Failure injected by a mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
pub enum MockError {
    /// The test asked for this call to fail.
    #[error("injected mock failure")]
    Injected,
}

// ---------------------------------------------------------------------------
// Clock / delay
// ---------------------------------------------------------------------------

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
}

impl MockClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self { now: Rc::new(Cell::new(start_ms)) }
    }

    /// Move time forward.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Delay that returns immediately and records the requested time.
///
/// When linked to a [`MockClock`] the clock advances by every delay.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    clock: Option<MockClock>,
    total_ns: u64,
    calls: usize,
}

impl MockDelay {
    /// Create a delay with no linked clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a delay that advances `clock`.
    pub fn with_clock(clock: MockClock) -> Self {
        Self { clock: Some(clock), total_ns: 0, calls: 0 }
    }

    /// Total time requested, in whole milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }

    /// Number of delays requested.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns = self.total_ns.saturating_add(u64::from(ns));
        self.calls = self.calls.saturating_add(1);
        if let Some(clock) = &self.clock {
            clock.advance(u64::from(ns) / 1_000_000);
        }
    }
}

// ---------------------------------------------------------------------------
// Audio bus
// ---------------------------------------------------------------------------

/// One call made on a [`MockAudioBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// `release_pins`
    ReleasePins,
    /// `install_driver`
    InstallDriver,
    /// `set_pins`
    SetPins,
    /// `set_clock`
    SetClock,
    /// `uninstall_driver`
    UninstallDriver,
    /// `write` of `len` bytes; `silent` when every byte was zero.
    Write {
        /// Bytes offered.
        len: usize,
        /// Timeout requested.
        timeout: WriteTimeout,
        /// All bytes were zero.
        silent: bool,
    },
    /// `zero_dma_buffer`
    ZeroDma,
}

/// Step of the bus protocol a failure can be injected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStep {
    /// `release_pins`
    ReleasePins,
    /// `install_driver`
    InstallDriver,
    /// `set_pins`
    SetPins,
    /// `set_clock`
    SetClock,
    /// `zero_dma_buffer`
    ZeroDma,
}

/// Recording [`AudioBus`].
#[derive(Debug, Default)]
pub struct MockAudioBus {
    events: Vec<BusEvent>,
    written: Vec<u8>,
    installed: Option<AudioChannelConfig>,
    fail_step: Option<BusStep>,
    fail_write_after: Option<usize>,
    writes: usize,
    clock: Option<MockClock>,
    write_cost_ms: u64,
    max_write: Option<usize>,
}

impl MockAudioBus {
    /// Create a bus on which every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `step`.
    #[must_use]
    pub fn failing_at(mut self, step: BusStep) -> Self {
        self.fail_step = Some(step);
        self
    }

    /// Let `n` writes succeed, then fail every later one.
    #[must_use]
    pub fn failing_writes_after(mut self, n: usize) -> Self {
        self.fail_write_after = Some(n);
        self
    }

    /// Advance `clock` by `ms` on every successful write, standing in for the
    /// time a full DMA ring blocks the caller.
    #[must_use]
    pub fn with_write_cost(mut self, clock: MockClock, ms: u64) -> Self {
        self.clock = Some(clock);
        self.write_cost_ms = ms;
        self
    }

    /// Accept at most `n` bytes per write, like a timed-out DMA wait.
    #[must_use]
    pub fn with_max_write(mut self, n: usize) -> Self {
        self.max_write = Some(n);
        self
    }

    /// Stop failing.
    pub fn heal(&mut self) {
        self.fail_step = None;
        self.fail_write_after = None;
    }

    /// Every call made so far.
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Forget recorded calls and bytes.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.written.clear();
    }

    /// Every byte accepted by `write`.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Configuration of the currently installed driver.
    pub fn installed(&self) -> Option<AudioChannelConfig> {
        self.installed
    }

    /// Number of non-silent writes (audio payload) recorded.
    pub fn payload_writes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BusEvent::Write { silent: false, .. }))
            .count()
    }

    fn step(&mut self, step: BusStep, event: BusEvent) -> Result<(), MockError> {
        self.events.push(event);
        if self.fail_step == Some(step) {
            return Err(MockError::Injected);
        }
        Ok(())
    }
}

impl AudioBus for MockAudioBus {
    type Error = MockError;

    async fn release_pins(&mut self, _pins: &I2sPins) -> Result<(), Self::Error> {
        self.step(BusStep::ReleasePins, BusEvent::ReleasePins)
    }

    async fn install_driver(&mut self, config: &AudioChannelConfig) -> Result<(), Self::Error> {
        self.step(BusStep::InstallDriver, BusEvent::InstallDriver)?;
        self.installed = Some(*config);
        Ok(())
    }

    async fn set_pins(&mut self, _pins: &I2sPins) -> Result<(), Self::Error> {
        self.step(BusStep::SetPins, BusEvent::SetPins)
    }

    async fn set_clock(&mut self, _config: &AudioChannelConfig) -> Result<(), Self::Error> {
        self.step(BusStep::SetClock, BusEvent::SetClock)
    }

    async fn uninstall_driver(&mut self) -> Result<(), Self::Error> {
        self.events.push(BusEvent::UninstallDriver);
        self.installed = None;
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8], timeout: WriteTimeout) -> Result<usize, Self::Error> {
        let silent = bytes.iter().all(|b| *b == 0);
        self.events.push(BusEvent::Write { len: bytes.len(), timeout, silent });
        if self.fail_write_after.is_some_and(|n| self.writes >= n) {
            return Err(MockError::Injected);
        }
        self.writes = self.writes.saturating_add(1);
        let accepted = self.max_write.map_or(bytes.len(), |max| max.min(bytes.len()));
        self.written.extend_from_slice(bytes.get(..accepted).unwrap_or(bytes));
        if let Some(clock) = &self.clock {
            clock.advance(self.write_cost_ms);
        }
        Ok(accepted)
    }

    async fn zero_dma_buffer(&mut self) -> Result<(), Self::Error> {
        self.step(BusStep::ZeroDma, BusEvent::ZeroDma)
    }
}

// ---------------------------------------------------------------------------
// Quiet environment
// ---------------------------------------------------------------------------

/// Counting [`QuietEnvironment`].
#[derive(Debug, Default)]
pub struct MockQuietEnvironment {
    calls: usize,
    fail: bool,
}

impl MockQuietEnvironment {
    /// Create an environment whose preparation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment whose preparation fails.
    pub fn failing() -> Self {
        Self { calls: 0, fail: true }
    }

    /// Number of times preparation was requested.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl QuietEnvironment for MockQuietEnvironment {
    type Error = MockError;

    async fn prepare_quiet_environment(&mut self) -> Result<(), Self::Error> {
        self.calls = self.calls.saturating_add(1);
        if self.fail {
            return Err(MockError::Injected);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// In-memory [`Storage`].
#[derive(Debug, Default)]
pub struct MockStorage {
    files: HashMap<String, Rc<[u8]>>,
    exists_error: bool,
    open_error: bool,
    max_read: Option<usize>,
    read_error_at: Option<u64>,
    opened: usize,
}

impl MockStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_owned(), Rc::from(bytes.into()));
        self
    }

    /// Make `exists` return an error.
    #[must_use]
    pub fn with_exists_error(mut self) -> Self {
        self.exists_error = true;
        self
    }

    /// Make `open_file` return an error even for present files.
    #[must_use]
    pub fn with_open_error(mut self) -> Self {
        self.open_error = true;
        self
    }

    /// Cap every read at `n` bytes.
    #[must_use]
    pub fn with_short_reads(mut self, n: usize) -> Self {
        self.max_read = Some(n);
        self
    }

    /// Fail reads once the file position reaches `pos`.
    #[must_use]
    pub fn with_read_error_at(mut self, pos: u64) -> Self {
        self.read_error_at = Some(pos);
        self
    }

    /// Number of files opened so far.
    pub fn opened(&self) -> usize {
        self.opened
    }
}

impl Storage for MockStorage {
    type Error = MockError;
    type File = MockFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        if self.open_error {
            return Err(MockError::Injected);
        }
        let data = self.files.get(path).cloned().ok_or(MockError::Injected)?;
        self.opened = self.opened.saturating_add(1);
        Ok(MockFile { data, pos: 0, max_read: self.max_read, read_error_at: self.read_error_at })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        if self.exists_error {
            return Err(MockError::Injected);
        }
        Ok(self.files.contains_key(path))
    }
}

/// File handed out by [`MockStorage`].
#[derive(Debug)]
pub struct MockFile {
    data: Rc<[u8]>,
    pos: usize,
    max_read: Option<usize>,
    read_error_at: Option<u64>,
}

impl File for MockFile {
    type Error = MockError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.read_error_at.is_some_and(|at| self.pos as u64 >= at) {
            return Err(MockError::Injected);
        }
        let remaining = self.data.get(self.pos..).unwrap_or(&[]);
        let mut n = remaining.len().min(buf.len());
        if let Some(max) = self.max_read {
            n = n.min(max);
        }
        let (Some(dst), Some(src)) = (buf.get_mut(..n), remaining.get(..n)) else {
            return Ok(0);
        };
        dst.copy_from_slice(src);
        self.pos = self.pos.saturating_add(n);
        Ok(n)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        let len = self.data.len() as u64;
        let clamped = pos.min(len);
        self.pos = usize::try_from(clamped).map_err(|_| MockError::Injected)?;
        Ok(clamped)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Recording [`FrameSink`].
#[derive(Debug, Default)]
pub struct MockFrameSink {
    frames: usize,
    last: Vec<u8>,
    fail: bool,
}

impl MockFrameSink {
    /// Create a sink that accepts every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that rejects every frame.
    pub fn failing() -> Self {
        Self { frames: 0, last: Vec::new(), fail: true }
    }

    /// Number of frames accepted.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Bytes of the most recent accepted frame.
    pub fn last_frame(&self) -> &[u8] {
        &self.last
    }

    /// RGB565 value of pixel (`x`, `y`) in the most recent frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        let idx = (y as usize)
            .checked_mul(crate::display::DISPLAY_WIDTH as usize)?
            .checked_add(x as usize)?
            .checked_mul(crate::display::BYTES_PER_PIXEL)?;
        let hi = *self.last.get(idx)?;
        let lo = *self.last.get(idx.checked_add(1)?)?;
        Some(u16::from_be_bytes([hi, lo]))
    }
}

impl FrameSink for MockFrameSink {
    type Error = crate::display::DisplayError;

    async fn push_frame(&mut self, pixels: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(crate::display::DisplayError::Communication);
        }
        if pixels.len() != crate::display::FRAME_BYTES {
            return Err(crate::display::DisplayError::FrameSize(pixels.len()));
        }
        self.frames = self.frames.saturating_add(1);
        self.last.clear();
        self.last.extend_from_slice(pixels);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_bus_records_and_fails() {
        let mut bus = MockAudioBus::new().failing_at(BusStep::SetClock);
        let cfg = AudioChannelConfig::money_eyes();
        bus.install_driver(&cfg).await.unwrap();
        assert_eq!(bus.installed(), Some(cfg));
        assert_eq!(bus.set_clock(&cfg).await, Err(MockError::Injected));
        bus.uninstall_driver().await.unwrap();
        assert_eq!(bus.installed(), None);
        assert_eq!(
            bus.events(),
            &[BusEvent::InstallDriver, BusEvent::SetClock, BusEvent::UninstallDriver]
        );
    }

    #[tokio::test]
    async fn test_mock_bus_write_failure_after_n() {
        let mut bus = MockAudioBus::new().failing_writes_after(1);
        assert_eq!(bus.write(&[1, 2], WriteTimeout::Forever).await, Ok(2));
        assert!(bus.write(&[3, 4], WriteTimeout::Forever).await.is_err());
        assert_eq!(bus.written(), &[1, 2]);
        assert_eq!(bus.payload_writes(), 2);
    }

    #[tokio::test]
    async fn test_mock_storage_short_reads() {
        let mut storage = MockStorage::new().with_file("/a", vec![1u8, 2, 3, 4, 5]).with_short_reads(2);
        assert!(storage.exists("/a").await.unwrap());
        assert!(!storage.exists("/b").await.unwrap());
        let mut file = storage.open_file("/a").await.unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf).await.unwrap(), 2);
        assert_eq!(file.seek(4).await.unwrap(), 4);
        assert_eq!(file.read(&mut buf).await.unwrap(), 1);
        assert_eq!(buf[0], 5);
        assert_eq!(file.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_delay_advances_clock() {
        let clock = MockClock::new(10);
        let mut delay = MockDelay::with_clock(clock.clone());
        delay.delay_ms(100).await;
        assert_eq!(clock.now_ms(), 110);
        assert_eq!(delay.total_ms(), 100);
        assert_eq!(delay.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_frame_sink_rejects_wrong_size() {
        let mut sink = MockFrameSink::new();
        assert!(sink.push_frame(&[0u8; 4]).await.is_err());
        let frame = vec![0xFFu8; crate::display::FRAME_BYTES];
        sink.push_frame(&frame).await.unwrap();
        assert_eq!(sink.frames(), 1);
        assert_eq!(sink.pixel(319, 239), Some(0xFFFF));
        assert_eq!(sink.pixel(320, 239), None);
    }
}
