//! PCM source reader against mock and on-disk storage.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use platform::mocks::MockStorage;
use platform::storage_local::AssetDir;
use playback::{AudioError, PcmChunk, PcmSource};

const ASSET: &str = "/cash_44_stereo.wav";

fn wav(channels: u16, rate: u32, bits: u16, payload: &[u8]) -> Vec<u8> {
    let mut h = vec![0u8; 44];
    h[0..4].copy_from_slice(b"RIFF");
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[22..24].copy_from_slice(&channels.to_le_bytes());
    h[24..28].copy_from_slice(&rate.to_le_bytes());
    h[34..36].copy_from_slice(&bits.to_le_bytes());
    h.extend_from_slice(payload);
    h
}

#[tokio::test]
async fn missing_asset_is_unavailable() {
    let mut storage = MockStorage::new();
    let result = PcmSource::open(&mut storage, ASSET).await;
    assert_eq!(result.err(), Some(AudioError::SourceUnavailable));
    assert_eq!(storage.opened(), 0);
}

#[tokio::test]
async fn failing_existence_check_is_unavailable() {
    let mut storage = MockStorage::new().with_file(ASSET, wav(2, 44_100, 16, &[1; 8])).with_exists_error();
    let result = PcmSource::open(&mut storage, ASSET).await;
    assert_eq!(result.err(), Some(AudioError::SourceUnavailable));
}

#[tokio::test]
async fn failing_open_is_unavailable() {
    let mut storage = MockStorage::new().with_file(ASSET, wav(2, 44_100, 16, &[1; 8])).with_open_error();
    let result = PcmSource::open(&mut storage, ASSET).await;
    assert_eq!(result.err(), Some(AudioError::SourceUnavailable));
}

#[tokio::test]
async fn header_is_skipped_and_decoded() {
    let payload: Vec<u8> = (1..=12).collect();
    let mut storage = MockStorage::new().with_file(ASSET, wav(2, 44_100, 16, &payload));
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();

    let header = source.header().expect("canonical header");
    assert_eq!((header.channels, header.sample_rate_hz, header.bits_per_sample), (2, 44_100, 16));
    assert!(source.is_available());
    assert_eq!(source.remaining(), 12);

    let mut buf = [0u8; 64];
    let chunk = source.read(&mut buf).await.unwrap();
    assert_eq!(chunk, PcmChunk { len: 12, end: true });
    assert_eq!(&buf[..12], payload.as_slice());
    assert!(!source.is_available());
}

#[tokio::test]
async fn garbage_header_is_still_skipped() {
    let mut bytes = vec![0xAAu8; 44];
    bytes.extend_from_slice(&[7, 7, 7, 7]);
    let mut storage = MockStorage::new().with_file(ASSET, bytes);
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();
    assert_eq!(source.header(), None);

    let mut buf = [0u8; 8];
    let chunk = source.read(&mut buf).await.unwrap();
    assert_eq!(chunk.len, 4);
    assert_eq!(&buf[..4], &[7, 7, 7, 7]);
}

#[tokio::test]
async fn file_shorter_than_header_is_empty_stream() {
    let mut storage = MockStorage::new().with_file(ASSET, vec![1u8; 20]);
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();
    assert!(!source.is_available());
    let mut buf = [0u8; 8];
    assert_eq!(source.read(&mut buf).await.unwrap(), PcmChunk { len: 0, end: true });
}

#[tokio::test]
async fn reads_are_finite_and_flag_the_end() {
    let payload = vec![3u8; 10];
    let mut storage = MockStorage::new().with_file(ASSET, wav(2, 44_100, 16, &payload));
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(source.read(&mut buf).await.unwrap(), PcmChunk { len: 4, end: false });
    assert_eq!(source.read(&mut buf).await.unwrap(), PcmChunk { len: 4, end: false });
    assert_eq!(source.read(&mut buf).await.unwrap(), PcmChunk { len: 2, end: true });
    // Non-restartable: further reads stay at the end.
    assert_eq!(source.read(&mut buf).await.unwrap(), PcmChunk { len: 0, end: true });
}

#[tokio::test]
async fn short_reads_report_actual_length() {
    let payload = vec![9u8; 10];
    let mut storage = MockStorage::new().with_file(ASSET, wav(2, 44_100, 16, &payload)).with_short_reads(3);
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();
    assert!(source.header().is_some());

    let mut buf = [0u8; 64];
    let mut total = 0;
    loop {
        let chunk = source.read(&mut buf).await.unwrap();
        assert!(chunk.len <= 3);
        total += chunk.len;
        if chunk.end {
            break;
        }
    }
    assert_eq!(total, 10);
}

#[tokio::test]
async fn read_failure_is_source_read() {
    let payload = vec![5u8; 100];
    let mut storage = MockStorage::new().with_file(ASSET, wav(2, 44_100, 16, &payload)).with_read_error_at(64);
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();

    let mut buf = [0u8; 20];
    assert_eq!(source.read(&mut buf).await.unwrap().len, 20);
    assert_eq!(source.read(&mut buf).await, Err(AudioError::SourceRead));
}

#[tokio::test]
async fn reads_asset_from_local_directory() {
    let tmp = tempfile::TempDir::new().unwrap();
    let payload: Vec<u8> = (0..=255).collect();
    std::fs::write(tmp.path().join("cash_44_stereo.wav"), wav(2, 44_100, 16, &payload)).unwrap();

    let mut storage = AssetDir::new(tmp.path());
    let mut source = PcmSource::open(&mut storage, ASSET).await.unwrap();
    assert_eq!(source.remaining(), 256);

    let mut out = Vec::new();
    let mut buf = [0u8; 100];
    loop {
        let chunk = source.read(&mut buf).await.unwrap();
        out.extend_from_slice(&buf[..chunk.len]);
        if chunk.end {
            break;
        }
    }
    assert_eq!(out, payload);
}
