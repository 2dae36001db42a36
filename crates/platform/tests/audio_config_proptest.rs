//! Property-based tests for audio channel configuration math.
//! Verifies invariants hold for ALL inputs, not just the reference board.

use platform::{AudioChannelConfig, AudioConfigError};

proptest::proptest! {
    /// validate never panics for any field combination.
    #[test]
    fn validate_never_panics(
        rate in 0u32..=u32::MAX,
        depth in 0u8..=255u8,
        channels in 0u8..=255u8,
        frames in 0u16..=u16::MAX,
        count in 0u8..=255u8,
    ) {
        let cfg = AudioChannelConfig {
            sample_rate_hz: rate,
            bit_depth: depth,
            channels,
            buffer_frames: frames,
            buffer_count: count,
        };
        let _ = cfg.validate();
        let _ = cfg.bclk_hz();
        let _ = cfg.duration_ms(usize::MAX);
    }

    /// Every accepted configuration has a non-zero frame size and buffer length.
    #[test]
    fn accepted_configs_have_whole_frames(
        rate in 1u32..=192_000u32,
        depth_bytes in 1u8..=4u8,
        channels in 1u8..=2u8,
        frames in 1u16..=4096u16,
        count in 2u8..=32u8,
    ) {
        let cfg = AudioChannelConfig {
            sample_rate_hz: rate,
            bit_depth: depth_bytes * 8,
            channels,
            buffer_frames: frames,
            buffer_count: count,
        };
        assert_eq!(cfg.validate(), Ok(()));
        let bpf = cfg.bytes_per_frame();
        assert_eq!(bpf, usize::from(depth_bytes) * usize::from(channels));
        assert_eq!(cfg.buffer_bytes() % bpf, 0);
    }

    /// Bit depths that are not whole bytes are always rejected.
    #[test]
    fn partial_byte_depths_rejected(depth in 1u8..=255u8) {
        proptest::prop_assume!(depth % 8 != 0);
        let cfg = AudioChannelConfig { bit_depth: depth, ..AudioChannelConfig::money_eyes() };
        assert_eq!(cfg.validate(), Err(AudioConfigError::UnsupportedBitDepth(depth)));
    }

    /// Playback duration never decreases as more bytes are queued.
    #[test]
    fn duration_is_monotone(a in 0usize..=10_000_000usize, b in 0usize..=10_000_000usize) {
        let cfg = AudioChannelConfig::money_eyes();
        if a <= b {
            assert!(cfg.duration_ms(a) <= cfg.duration_ms(b));
        }
    }
}
