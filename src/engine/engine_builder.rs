use maudio_sys::ffi as sys;

use crate::{audio::sample_rate::SampleRate, engine::Engine, Binding, Result};

/// Builder over `ma_engine_config`.
///
/// The default configuration (see [`Engine::new`]) opens the default
/// playback device with one listener and starts the engine immediately;
/// the builder is only needed to deviate from that.
pub struct EngineBuilder {
    inner: sys::ma_engine_config,
}

impl Binding for EngineBuilder {
    type Raw = sys::ma_engine_config;

    fn from_ptr(raw: Self::Raw) -> Self {
        Self { inner: raw }
    }

    fn to_raw(&self) -> Self::Raw {
        self.inner
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        let raw = unsafe { sys::ma_engine_config_init() };
        Self::from_ptr(raw)
    }

    /// Sets how many listeners the engine will create.
    ///
    /// The default is `1` listener (index `0`).
    pub fn listener_count(mut self, count: u32) -> Self {
        self.inner.listenerCount = count;
        self
    }

    /// Sets up the engine without a playback device.
    ///
    /// Mixed output is pulled manually with [`Engine::read_pcm_frames`].
    ///
    /// `channels` and `sample_rate` must be set manually.
    pub fn no_device(mut self, enabled: bool) -> Self {
        self.inner.noDevice = enabled as u32;
        self
    }

    /// The number of channels to use when mixing and spatializing.
    ///
    /// When set to 0, will use the native channel count of the device.
    pub fn set_channels(mut self, channels: u32) -> Self {
        self.inner.channels = channels;
        self
    }

    /// When set to 0 will use the native sample rate of the device.
    pub fn set_sample_rate(mut self, sample_rate: SampleRate) -> Self {
        self.inner.sampleRate = sample_rate.into();
        self
    }

    /// False by default, meaning the engine will be started automatically on
    /// creation. Setting this requires a call to [`Engine::start`].
    pub fn no_auto_start(mut self, yes: bool) -> Self {
        self.inner.noAutoStart = yes as u32;
        self
    }

    pub fn build(self) -> Result<Engine> {
        Engine::new_with_config(Some(&self))
    }
}
