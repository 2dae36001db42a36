//! Raw PCM asset reader.
//!
//! The asset is a 44-byte header followed by little-endian interleaved
//! frames. The header is skipped by position; its canonical format fields
//! are decoded only so a mismatch with the channel configuration can be
//! reported.

use platform::config::PCM_HEADER_BYTES;
use platform::{AudioChannelConfig, File, Storage};

use crate::error::AudioError;

/// Result of one [`PcmSource::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PcmChunk {
    /// Bytes placed at the start of the caller's buffer.
    pub len: usize,
    /// No more bytes will follow.
    pub end: bool,
}

/// Format fields of a canonical 44-byte RIFF/WAVE header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PcmHeader {
    /// Interleaved channel count.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate_hz: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl PcmHeader {
    /// Decode the format fields when the `RIFF`/`WAVE`/`fmt ` tags are in their
    /// canonical places. Anything else yields `None`.
    pub fn parse(bytes: &[u8; PCM_HEADER_BYTES]) -> Option<Self> {
        let tag = |at: usize| bytes.get(at..at.checked_add(4)?);
        if tag(0)? != b"RIFF" || tag(8)? != b"WAVE" || tag(12)? != b"fmt " {
            return None;
        }
        let u16_at = |at: usize| -> Option<u16> {
            let b = bytes.get(at..at.checked_add(2)?)?;
            Some(u16::from_le_bytes([*b.first()?, *b.get(1)?]))
        };
        let u32_at = |at: usize| -> Option<u32> {
            let b = bytes.get(at..at.checked_add(4)?)?;
            Some(u32::from_le_bytes([*b.first()?, *b.get(1)?, *b.get(2)?, *b.get(3)?]))
        };
        Some(Self {
            channels: u16_at(22)?,
            sample_rate_hz: u32_at(24)?,
            bits_per_sample: u16_at(34)?,
        })
    }

    /// `true` when the header describes the same stream layout as `config`.
    pub fn matches(&self, config: &AudioChannelConfig) -> bool {
        self.channels == u16::from(config.channels)
            && self.sample_rate_hz == config.sample_rate_hz
            && self.bits_per_sample == u16::from(config.bit_depth)
    }
}

/// Finite, non-restartable stream of PCM bytes following the header.
pub struct PcmSource<F: File> {
    file: F,
    remaining: u64,
    header: Option<PcmHeader>,
}

impl<F: File> PcmSource<F> {
    /// Open `path` on `storage` and position the stream after the header.
    ///
    /// # Errors
    ///
    /// [`AudioError::SourceUnavailable`] when the asset does not exist, the
    /// existence check fails, or the file cannot be opened.
    pub async fn open<S>(storage: &mut S, path: &str) -> Result<Self, AudioError>
    where
        S: Storage<File = F>,
    {
        match storage.exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("sound asset {} not found", path);
                return Err(AudioError::SourceUnavailable);
            }
            Err(_) => {
                warn!("existence check failed for {}", path);
                return Err(AudioError::SourceUnavailable);
            }
        }
        let mut file = storage.open_file(path).await.map_err(|_| {
            warn!("failed to open {}", path);
            AudioError::SourceUnavailable
        })?;

        let mut raw = [0u8; PCM_HEADER_BYTES];
        let header = match read_full(&mut file, &mut raw).await {
            Ok(n) if n == PCM_HEADER_BYTES => PcmHeader::parse(&raw),
            _ => None,
        };

        let header_len = PCM_HEADER_BYTES as u64;
        let size = file.size();
        let remaining = if size > header_len {
            match file.seek(header_len).await {
                Ok(pos) if pos == header_len => size.saturating_sub(header_len),
                _ => 0,
            }
        } else {
            0
        };
        debug!("opened {}: {} PCM bytes after header", path, remaining);

        Ok(Self { file, remaining, header })
    }

    /// Read the next bytes into `buf`.
    ///
    /// A zero-length read while bytes remain ends the stream.
    ///
    /// # Errors
    ///
    /// [`AudioError::SourceRead`] when the underlying read fails.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<PcmChunk, AudioError> {
        if self.remaining == 0 {
            return Ok(PcmChunk { len: 0, end: true });
        }
        let want = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let Some(dst) = buf.get_mut(..want) else {
            return Ok(PcmChunk { len: 0, end: true });
        };
        if dst.is_empty() {
            return Ok(PcmChunk { len: 0, end: false });
        }
        let n = self.file.read(dst).await.map_err(|_| AudioError::SourceRead)?;
        if n == 0 {
            trace!("source returned no bytes with {} remaining", self.remaining);
            self.remaining = 0;
            return Ok(PcmChunk { len: 0, end: true });
        }
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(PcmChunk { len: n, end: self.remaining == 0 })
    }

    /// `true` while bytes remain to be read.
    pub fn is_available(&self) -> bool {
        self.remaining > 0
    }

    /// PCM bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Decoded header, when it was canonical.
    pub fn header(&self) -> Option<PcmHeader> {
        self.header
    }
}

async fn read_full<F: File>(file: &mut F, buf: &mut [u8]) -> Result<usize, F::Error> {
    let mut filled = 0usize;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        let n = file.read(rest).await?;
        if n == 0 {
            break;
        }
        filled = filled.saturating_add(n);
    }
    Ok(filled)
}
