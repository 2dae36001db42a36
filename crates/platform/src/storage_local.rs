//! Sound assets served from a host directory.
//!
//! On the device the WAV assets sit at the root of the SD card and are named
//! by absolute paths such as `/cash_44_stereo.wav`. [`AssetDir`] maps that
//! namespace onto a directory on the host so the emulator and tests open the
//! same paths the hardware does.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::storage::{File, Storage};

/// Environment variable naming the emulator's asset directory.
pub const ASSETS_ENV: &str = "MONEY_EYES_ASSETS";

/// Failure reaching an asset on the host.
#[derive(Debug, thiserror_no_std::Error)]
pub enum AssetDirError {
    /// The asset could not be opened or its length could not be read.
    #[error("cannot open asset {path}: {source}")]
    Open {
        /// Host path that was tried.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Reading or seeking an open asset failed.
    #[error("asset I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One asset opened from an [`AssetDir`].
pub struct AssetFile {
    inner: std::fs::File,
    len: u64,
}

impl File for AssetFile {
    type Error = AssetDirError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.inner.read(buf)?)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        Ok(self.inner.seek(SeekFrom::Start(pos))?)
    }

    fn size(&self) -> u64 {
        self.len
    }
}

/// Host directory standing in for the SD card root.
///
/// ```no_run
/// # async fn demo() -> Result<(), platform::storage_local::AssetDirError> {
/// use platform::storage_local::AssetDir;
/// use platform::{File, Storage};
///
/// let mut assets = AssetDir::from_env_or("assets");
/// let cash = assets.open_file("/cash_44_stereo.wav").await?;
/// assert!(cash.size() >= 44);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    /// Serve assets from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Serve assets from the directory named by [`ASSETS_ENV`], if set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var_os(ASSETS_ENV).map(Self::new)
    }

    /// [`AssetDir::from_env`], falling back to `fallback`.
    #[must_use]
    pub fn from_env_or(fallback: impl Into<PathBuf>) -> Self {
        Self::from_env().unwrap_or_else(|| Self::new(fallback))
    }

    /// Directory the card root maps to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path for a card path. `/cash.wav` and `cash.wav` name the same asset.
    pub fn host_path(&self, card_path: &str) -> PathBuf {
        self.root.join(card_path.trim_start_matches('/'))
    }
}

impl Storage for AssetDir {
    type Error = AssetDirError;
    type File = AssetFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let path = self.host_path(path);
        let opened = std::fs::File::open(&path).and_then(|f| Ok((f.metadata()?.len(), f)));
        match opened {
            Ok((len, inner)) => Ok(AssetFile { inner, len }),
            Err(source) => Err(AssetDirError::Open { path, source }),
        }
    }

    /// Only regular files count; a directory with an asset's name does not.
    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.host_path(path).is_file())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::SOUND_ASSET_PATH;
    use tempfile::TempDir;

    const HEADER: usize = 44;

    /// A card root holding the cash asset: 44-byte header plus `payload`.
    fn card_with_cash(payload: &[u8]) -> TempDir {
        let card = TempDir::new().unwrap();
        let mut wav = vec![0u8; HEADER];
        wav[0..4].copy_from_slice(b"RIFF");
        wav[8..12].copy_from_slice(b"WAVE");
        wav.extend_from_slice(payload);
        std::fs::write(card.path().join("cash_44_stereo.wav"), wav).unwrap();
        card
    }

    #[tokio::test]
    async fn cash_asset_opens_by_its_card_path() {
        let card = card_with_cash(&[7u8; 300]);
        let mut assets = AssetDir::new(card.path());

        assert!(assets.exists(SOUND_ASSET_PATH).await.unwrap());
        let file = assets.open_file(SOUND_ASSET_PATH).await.unwrap();
        assert_eq!(file.size(), (HEADER + 300) as u64);
    }

    #[tokio::test]
    async fn payload_starts_after_the_header() {
        let payload: Vec<u8> = (1..=200u8).collect();
        let card = card_with_cash(&payload);
        let mut assets = AssetDir::new(card.path());
        let mut file = assets.open_file(SOUND_ASSET_PATH).await.unwrap();

        let mut riff = [0u8; 4];
        assert_eq!(file.read(&mut riff).await.unwrap(), 4);
        assert_eq!(&riff, b"RIFF");

        assert_eq!(file.seek(HEADER as u64).await.unwrap(), HEADER as u64);
        let mut buf = vec![0u8; 200];
        assert_eq!(file.read(&mut buf).await.unwrap(), 200);
        assert_eq!(buf, payload);
        assert_eq!(file.read(&mut buf).await.unwrap(), 0);
    }

    #[test]
    fn relative_and_absolute_card_paths_agree() {
        let card = card_with_cash(&[1u8; 8]);
        let assets = AssetDir::new(card.path());
        assert_eq!(assets.host_path("/cash_44_stereo.wav"), assets.host_path("cash_44_stereo.wav"));
        assert!(assets.host_path(SOUND_ASSET_PATH).starts_with(assets.root()));
    }

    #[tokio::test]
    async fn missing_asset_is_absent_and_fails_to_open() {
        let card = card_with_cash(&[1u8; 8]);
        let mut assets = AssetDir::new(card.path());

        assert!(!assets.exists("/cash_22_mono.wav").await.unwrap());
        match assets.open_file("/cash_22_mono.wav").await {
            Err(AssetDirError::Open { path, .. }) => {
                assert_eq!(path, card.path().join("cash_22_mono.wav"));
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("missing asset opened"),
        }
    }

    #[tokio::test]
    async fn directory_named_like_an_asset_is_not_an_asset() {
        let card = TempDir::new().unwrap();
        std::fs::create_dir(card.path().join("cash_44_stereo.wav")).unwrap();
        let mut assets = AssetDir::new(card.path());
        assert!(!assets.exists(SOUND_ASSET_PATH).await.unwrap());
    }

    #[test]
    fn fallback_root_is_used_without_the_env_var() {
        if std::env::var_os(ASSETS_ENV).is_none() {
            assert_eq!(AssetDir::from_env_or("assets").root(), Path::new("assets"));
        }
    }
}
