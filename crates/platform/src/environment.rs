//! Electrical noise reduction before the audio path is powered

/// One-time measures that keep the speaker output quiet.
///
/// On the reference board this disables the Wi-Fi and Bluetooth radios and
/// pulls the legacy speaker pins ([`crate::I2sPins::LEGACY_SPEAKER_PINS`])
/// low. Implementations must be idempotent: calling twice is harmless.
pub trait QuietEnvironment {
    /// Error type
    type Error: core::fmt::Debug;

    /// Apply the noise-reduction measures.
    fn prepare_quiet_environment(
        &mut self,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
