//! Money-Eyes desktop emulator
//!
//! Renders the face in a window and plays the episode sound through a paced
//! stand-in for the I²S bus, so Special episodes take as long as on the board.
//!
//! Run with:
//! `MONEY_EYES_ASSETS=./assets cargo run -p firmware --example face_emulator --features emulator`
//!
//! Set `RUST_LOG=debug` for channel and compositor logs.

#![allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use std::cell::Cell;
use std::rc::Rc;

use embassy_time::{Delay, Timer};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use tracing_subscriber::EnvFilter;

use firmware::{boot, idle_forever, FaceApp, FaceConfig, Frame, DISPLAY_WIDTH, FRAME_BYTES};
use platform::storage_local::AssetDir;
use platform::{
    config, AudioBus, AudioChannelConfig, Clock, DisplayError, EmbassyClock, FrameSink, I2sPins,
    QuietEnvironment, WriteTimeout,
};
use playback::AudioOutputChannel;

/// Window-backed [`FrameSink`]. Sets `quit` when the window is closed.
struct WindowSink {
    display: SimulatorDisplay<Rgb565>,
    window: Window,
    quit: Rc<Cell<bool>>,
}

impl FrameSink for WindowSink {
    type Error = DisplayError;

    async fn push_frame(&mut self, pixels: &[u8]) -> Result<(), Self::Error> {
        if pixels.len() != FRAME_BYTES {
            return Err(DisplayError::FrameSize(pixels.len()));
        }
        let width = DISPLAY_WIDTH as usize;
        let decoded = pixels.chunks_exact(2).enumerate().map(|(i, px)| {
            let color = Rgb565::from(RawU16::new(u16::from_be_bytes([px[0], px[1]])));
            Pixel(Point::new((i % width) as i32, (i / width) as i32), color)
        });
        if let Err(never) = self.display.draw_iter(decoded) {
            match never {}
        }
        self.window.update(&self.display);
        if self.window.events().any(|e| matches!(e, SimulatorEvent::Quit)) {
            self.quit.set(true);
        }
        Ok(())
    }
}

/// Write issued before `install_driver`.
#[derive(Debug)]
struct NotInstalled;

/// I²S stand-in that takes as long to accept bytes as the DAC takes to play them.
#[derive(Default)]
struct PacedAudioBus {
    config: Option<AudioChannelConfig>,
}

impl AudioBus for PacedAudioBus {
    type Error = NotInstalled;

    async fn release_pins(&mut self, pins: &I2sPins) -> Result<(), Self::Error> {
        tracing::debug!(?pins, "release pins");
        Ok(())
    }

    async fn install_driver(&mut self, config: &AudioChannelConfig) -> Result<(), Self::Error> {
        self.config = Some(*config);
        Ok(())
    }

    async fn set_pins(&mut self, _pins: &I2sPins) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn set_clock(&mut self, config: &AudioChannelConfig) -> Result<(), Self::Error> {
        tracing::debug!(bclk_hz = config.bclk_hz(), "clock set");
        Ok(())
    }

    async fn uninstall_driver(&mut self) -> Result<(), Self::Error> {
        self.config = None;
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8], _timeout: WriteTimeout) -> Result<usize, Self::Error> {
        let config = self.config.ok_or(NotInstalled)?;
        Timer::after_millis(config.duration_ms(bytes.len())).await;
        Ok(bytes.len())
    }

    async fn zero_dma_buffer(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Nothing to silence on a desktop.
struct DesktopEnvironment;

impl QuietEnvironment for DesktopEnvironment {
    type Error = core::convert::Infallible;

    async fn prepare_quiet_environment(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let face = FaceConfig::default();
    let storage = AssetDir::from_env_or("assets");
    let channel = AudioOutputChannel::new(
        PacedAudioBus::default(),
        DesktopEnvironment,
        Delay,
        EmbassyClock,
        face.pins,
    );

    let (cue, report) = match boot(storage, channel, &face).await {
        Ok(booted) => booted,
        Err(e) => {
            tracing::error!("{e}");
            idle_forever(Delay).await
        }
    };
    tracing::info!(?report, "booted");

    let quit = Rc::new(Cell::new(false));
    let sink = WindowSink {
        display: SimulatorDisplay::new(Size::new(firmware::DISPLAY_WIDTH, firmware::DISPLAY_HEIGHT)),
        window: Window::new(config::app_title(), &OutputSettingsBuilder::new().scale(2).build()),
        quit: Rc::clone(&quit),
    };

    let mut pixels = vec![0u8; FRAME_BYTES];
    let frame = Frame::new(&mut pixels)?;
    let seed = EmbassyClock.now_ms();
    let mut app = FaceApp::new(frame, sink, cue, EmbassyClock, seed, &face);

    while !quit.get() {
        let started = EmbassyClock.now_ms();
        let rendered = app.tick(started).await;
        if let Some(outcome) = rendered.sound {
            tracing::info!(?outcome, "episode sound");
        }
        let elapsed = EmbassyClock.now_ms().saturating_sub(started);
        Timer::after_millis(face.frame_period_ms.saturating_sub(elapsed)).await;
    }

    Ok(())
}
