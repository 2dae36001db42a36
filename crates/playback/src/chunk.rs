//! Fixed-capacity staging buffer between the PCM source and the I²S bus.
//!
//! Reads land at the tail of the buffer. Only whole frames are handed to the
//! bus; a trailing partial frame is moved to the front and completed by the
//! next read, so short reads never shift the channel interleave.

/// Bytes requested from the source per read.
pub const CHUNK_BYTES: usize = 4096;

/// Const-generic byte buffer with partial-frame carry-over.
pub struct ChunkBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> ChunkBuffer<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self { buf: [0u8; N], len: 0 }
    }

    /// Bytes currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop everything held.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Free space after the held bytes, to be filled by a read.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        self.buf.get_mut(self.len..).unwrap_or(&mut [])
    }

    /// Mark `n` bytes of [`spare_mut`](Self::spare_mut) as filled.
    ///
    /// Clamped to the buffer capacity.
    pub fn commit(&mut self, n: usize) {
        self.len = self.len.saturating_add(n).min(N);
    }

    /// Longest prefix made of whole frames of `bytes_per_frame` bytes.
    pub fn aligned(&self, bytes_per_frame: usize) -> &[u8] {
        let whole = self
            .len
            .checked_div(bytes_per_frame)
            .and_then(|frames| frames.checked_mul(bytes_per_frame))
            .unwrap_or(0);
        self.buf.get(..whole).unwrap_or(&[])
    }

    /// Discard the first `n` bytes and move the rest to the front.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len = self.len.saturating_sub(n);
    }
}

impl<const N: usize> Default for ChunkBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
