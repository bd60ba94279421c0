//! High level audio engine.
//!
//! [`Engine`] wraps miniaudio's `ma_engine` and is the entry point for
//! everything else in the crate: sound sources and sounds are created from it
//! and borrow it for their whole lifetime. It owns the output device (or no
//! device at all, see [`EngineBuilder::no_device`]), the listener, and the
//! global engine clock.
//!
//! ## Quick start
//! ```no_run
//! # use minisfx::buffer::SoundBuffer;
//! # use minisfx::engine::Engine;
//! # use minisfx::sound::source::ChannelMode;
//! # fn main() -> minisfx::Result<()> {
//! let engine = Engine::new()?;
//! let buffer = SoundBuffer::from_samples(vec![0.0; 48_000], 1, 48_000)?;
//! let mut sound = engine.new_sound_with_buffer(ChannelMode::Mono, &buffer)?;
//! sound.play()?;
//! /* block the main thread while the sound is playing */
//! # Ok(())
//! # }
//! ```
//!
//! ## Listener
//! Spatialization is computed against the engine's listener(s). Listener
//! accessors take a listener index; engines have one listener (index `0`)
//! unless configured otherwise via [`EngineBuilder::listener_count`].
//!
//! ## Time
//! The engine maintains a global timeline that advances as audio is
//! processed. It can be queried or modified in PCM frames and is independent
//! of any individual sound's playback position.

use std::{cell::Cell, marker::PhantomData, mem::MaybeUninit};

use log::debug;
use maudio_sys::ffi as sys;

use crate::{
    audio::{math::vec3::Vec3, sample_rate::SampleRate},
    buffer::SoundBuffer,
    engine::engine_builder::EngineBuilder,
    sound::{
        source::{ChannelMode, SoundSource},
        Sound,
    },
    Binding, Result,
};

pub mod engine_builder;

/// High-level audio engine.
///
/// Wraps a `ma_engine`, which owns (or coordinates) the output device, the
/// listener state and the global engine clock. Sources and sounds created
/// from an engine borrow it and cannot outlive it.
pub struct Engine {
    inner: *mut sys::ma_engine,
    _not_sync: PhantomData<Cell<()>>,
}

impl Binding for Engine {
    type Raw = *mut sys::ma_engine;

    fn from_ptr(_raw: Self::Raw) -> Self {
        unimplemented!("Engine is always created through Engine::new or EngineBuilder")
    }

    fn to_raw(&self) -> Self::Raw {
        self.inner
    }
}

unsafe impl Send for Engine {}

impl Engine {
    /// Creates an engine with the default configuration: default playback
    /// device, one listener, auto-started.
    pub fn new() -> Result<Self> {
        Self::new_with_config(None)
    }

    /// A deviceless engine for unit tests; audio is pulled manually with
    /// [`Engine::read_pcm_frames`] instead of being driven by a device
    /// callback, so tests run on machines with no audio hardware.
    pub(crate) fn new_for_tests() -> Result<Self> {
        EngineBuilder::new()
            .no_device(true)
            .set_channels(2)
            .set_sample_rate(SampleRate::Sr48000)
            .build()
    }

    pub(crate) fn new_with_config(config: Option<&EngineBuilder>) -> Result<Self> {
        let mut mem: Box<MaybeUninit<sys::ma_engine>> = Box::new(MaybeUninit::uninit());
        engine_ffi::engine_init(config, mem.as_mut_ptr())?;
        // Safety: If mem is not initialized, engine_init will return an error
        let mem: Box<sys::ma_engine> = unsafe { mem.assume_init() };
        let inner = Box::into_raw(mem);
        let engine = Self {
            inner,
            _not_sync: PhantomData,
        };
        debug!(
            "audio engine initialized: {} ch @ {} Hz",
            engine.channels(),
            engine.sample_rate()
        );
        Ok(engine)
    }

    /// Creates a sound source with no data bound to it yet.
    pub fn new_source(&self, mode: ChannelMode) -> Result<SoundSource<'_>> {
        SoundSource::new(self, mode)
    }

    /// Creates a sound with no buffer; assign one later with
    /// [`Sound::set_buffer`].
    pub fn new_sound(&self, mode: ChannelMode) -> Result<Sound<'_>> {
        let source = SoundSource::new(self, mode)?;
        Ok(Sound::new(source))
    }

    /// Creates a sound and binds `buffer` to it in one step.
    pub fn new_sound_with_buffer(
        &self,
        mode: ChannelMode,
        buffer: &SoundBuffer,
    ) -> Result<Sound<'_>> {
        let mut sound = self.new_sound(mode)?;
        sound.set_buffer(buffer)?;
        Ok(sound)
    }

    /// Manually starts the engine.
    ///
    /// By default an engine starts automatically on creation; see
    /// [`EngineBuilder::no_auto_start`]. Start and stop operations on an
    /// engine with no device result in an error.
    pub fn start(&self) -> Result<()> {
        engine_ffi::ma_engine_start(self)
    }

    /// Manually stops the engine.
    pub fn stop(&self) -> Result<()> {
        engine_ffi::ma_engine_stop(self)
    }

    /// Master volume applied to everything the engine mixes.
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        engine_ffi::ma_engine_set_volume(self, volume)
    }

    pub fn volume(&self) -> f32 {
        engine_ffi::ma_engine_get_volume(self)
    }

    pub fn listener_count(&self) -> u32 {
        engine_ffi::ma_engine_get_listener_count(self)
    }

    pub fn set_listener_position(&self, listener: u32, position: Vec3) {
        engine_ffi::ma_engine_listener_set_position(self, listener, position);
    }

    pub fn listener_position(&self, listener: u32) -> Vec3 {
        engine_ffi::ma_engine_listener_get_position(self, listener)
    }

    pub fn set_listener_direction(&self, listener: u32, direction: Vec3) {
        engine_ffi::ma_engine_listener_set_direction(self, listener, direction);
    }

    pub fn listener_direction(&self, listener: u32) -> Vec3 {
        engine_ffi::ma_engine_listener_get_direction(self, listener)
    }

    pub fn set_listener_velocity(&self, listener: u32, velocity: Vec3) {
        engine_ffi::ma_engine_listener_set_velocity(self, listener, velocity);
    }

    pub fn listener_velocity(&self, listener: u32) -> Vec3 {
        engine_ffi::ma_engine_listener_get_velocity(self, listener)
    }

    pub fn set_listener_world_up(&self, listener: u32, up: Vec3) {
        engine_ffi::ma_engine_listener_set_world_up(self, listener, up);
    }

    pub fn listener_world_up(&self, listener: u32) -> Vec3 {
        engine_ffi::ma_engine_listener_get_world_up(self, listener)
    }

    /// A disabled listener is ignored by spatialization.
    pub fn set_listener_enabled(&self, listener: u32, enabled: bool) {
        engine_ffi::ma_engine_listener_set_enabled(self, listener, enabled);
    }

    pub fn listener_enabled(&self, listener: u32) -> bool {
        engine_ffi::ma_engine_listener_is_enabled(self, listener)
    }

    /// Number of output channels used when mixing and spatializing.
    pub fn channels(&self) -> u32 {
        engine_ffi::ma_engine_get_channels(self)
    }

    /// The engine's sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        engine_ffi::ma_engine_get_sample_rate(self)
    }

    /// Current engine time in PCM frames at the engine's sample rate.
    pub fn time_pcm(&self) -> u64 {
        engine_ffi::ma_engine_get_time_in_pcm_frames(self)
    }

    /// Moves the engine's global timeline. Sounds scheduled against engine
    /// time observe the new value.
    pub fn set_time_pcm(&self, time: u64) {
        engine_ffi::ma_engine_set_time_in_pcm_frames(self, time);
    }

    /// Pulls up to `frame_count` frames of interleaved mixed output.
    ///
    /// This is how audio leaves a deviceless engine. Fewer frames than
    /// requested may be rendered; the actual count is returned alongside the
    /// samples.
    pub fn read_pcm_frames(&self, frame_count: u64) -> Result<(Vec<f32>, u64)> {
        engine_ffi::ma_engine_read_pcm_frames(self, frame_count)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        debug!("audio engine shutting down");
        engine_ffi::engine_uninit(self);
        drop(unsafe { Box::from_raw(self.to_raw()) });
    }
}

pub(crate) mod engine_ffi {
    use maudio_sys::ffi as sys;

    use crate::{
        audio::math::vec3::Vec3,
        engine::{engine_builder::EngineBuilder, Engine},
        Binding, ErrorKind, RawResult, Result,
    };

    #[inline]
    pub fn engine_init(config: Option<&EngineBuilder>, engine: *mut sys::ma_engine) -> Result<()> {
        // The raw config must stay alive across the native call.
        let raw = config.map(|c| c.to_raw());
        let p_config: *const sys::ma_engine_config =
            raw.as_ref().map_or(core::ptr::null(), |c| c as *const _);
        let res = unsafe { sys::ma_engine_init(p_config, engine) };
        RawResult::check(res)
    }

    #[inline]
    pub fn engine_uninit(engine: &Engine) {
        unsafe {
            sys::ma_engine_uninit(engine.to_raw());
        }
    }

    #[inline]
    pub fn ma_engine_start(engine: &Engine) -> Result<()> {
        let res = unsafe { sys::ma_engine_start(engine.to_raw()) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_engine_stop(engine: &Engine) -> Result<()> {
        let res = unsafe { sys::ma_engine_stop(engine.to_raw()) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_engine_set_volume(engine: &Engine, volume: f32) -> Result<()> {
        let res = unsafe { sys::ma_engine_set_volume(engine.to_raw(), volume) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_engine_get_volume(engine: &Engine) -> f32 {
        unsafe { sys::ma_engine_get_volume(engine.to_raw()) }
    }

    #[inline]
    pub fn ma_engine_get_listener_count(engine: &Engine) -> u32 {
        unsafe { sys::ma_engine_get_listener_count(engine.to_raw() as *const _) }
    }

    #[inline]
    pub fn ma_engine_listener_set_position(engine: &Engine, listener: u32, position: Vec3) {
        unsafe {
            sys::ma_engine_listener_set_position(
                engine.to_raw(),
                listener,
                position.x,
                position.y,
                position.z,
            )
        };
    }

    #[inline]
    pub fn ma_engine_listener_get_position(engine: &Engine, listener: u32) -> Vec3 {
        let vec =
            unsafe { sys::ma_engine_listener_get_position(engine.to_raw() as *const _, listener) };
        vec.into()
    }

    #[inline]
    pub fn ma_engine_listener_set_direction(engine: &Engine, listener: u32, direction: Vec3) {
        unsafe {
            sys::ma_engine_listener_set_direction(
                engine.to_raw(),
                listener,
                direction.x,
                direction.y,
                direction.z,
            )
        };
    }

    #[inline]
    pub fn ma_engine_listener_get_direction(engine: &Engine, listener: u32) -> Vec3 {
        let vec =
            unsafe { sys::ma_engine_listener_get_direction(engine.to_raw() as *const _, listener) };
        vec.into()
    }

    #[inline]
    pub fn ma_engine_listener_set_velocity(engine: &Engine, listener: u32, velocity: Vec3) {
        unsafe {
            sys::ma_engine_listener_set_velocity(
                engine.to_raw(),
                listener,
                velocity.x,
                velocity.y,
                velocity.z,
            )
        };
    }

    #[inline]
    pub fn ma_engine_listener_get_velocity(engine: &Engine, listener: u32) -> Vec3 {
        let vec =
            unsafe { sys::ma_engine_listener_get_velocity(engine.to_raw() as *const _, listener) };
        vec.into()
    }

    #[inline]
    pub fn ma_engine_listener_set_world_up(engine: &Engine, listener: u32, up: Vec3) {
        unsafe {
            sys::ma_engine_listener_set_world_up(engine.to_raw(), listener, up.x, up.y, up.z);
        }
    }

    #[inline]
    pub fn ma_engine_listener_get_world_up(engine: &Engine, listener: u32) -> Vec3 {
        let vec =
            unsafe { sys::ma_engine_listener_get_world_up(engine.to_raw() as *const _, listener) };
        vec.into()
    }

    #[inline]
    pub fn ma_engine_listener_set_enabled(engine: &Engine, listener: u32, enabled: bool) {
        unsafe {
            sys::ma_engine_listener_set_enabled(engine.to_raw(), listener, enabled as u32);
        }
    }

    #[inline]
    pub fn ma_engine_listener_is_enabled(engine: &Engine, listener: u32) -> bool {
        let res =
            unsafe { sys::ma_engine_listener_is_enabled(engine.to_raw() as *const _, listener) };
        res == 1
    }

    #[inline]
    pub fn ma_engine_get_channels(engine: &Engine) -> u32 {
        unsafe { sys::ma_engine_get_channels(engine.to_raw() as *const _) }
    }

    #[inline]
    pub fn ma_engine_get_sample_rate(engine: &Engine) -> u32 {
        unsafe { sys::ma_engine_get_sample_rate(engine.to_raw() as *const _) }
    }

    #[inline]
    pub fn ma_engine_get_time_in_pcm_frames(engine: &Engine) -> u64 {
        unsafe { sys::ma_engine_get_time_in_pcm_frames(engine.to_raw() as *const _) }
    }

    #[inline]
    pub fn ma_engine_set_time_in_pcm_frames(engine: &Engine, time: u64) {
        unsafe { sys::ma_engine_set_time_in_pcm_frames(engine.to_raw(), time) };
    }

    #[inline]
    pub fn ma_engine_read_pcm_frames(engine: &Engine, frame_count: u64) -> Result<(Vec<f32>, u64)> {
        let channels = engine.channels();
        let len = frame_count
            .checked_mul(channels as u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(ErrorKind::FrameCountTooLarge)?;
        let mut buffer = vec![0.0f32; len];
        let mut frames_read = 0;
        let res = unsafe {
            sys::ma_engine_read_pcm_frames(
                engine.to_raw(),
                buffer.as_mut_ptr() as *mut std::ffi::c_void,
                frame_count,
                &mut frames_read,
            )
        };
        RawResult::check(res)?;
        buffer.truncate((frames_read * channels as u64) as usize);
        Ok((buffer, frames_read))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_f32_eq(a: f32, b: f32) {
        assert!(
            (a - b).abs() <= 1.0e-6,
            "expected {a} ~= {b}, diff={}",
            (a - b).abs()
        );
    }

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_f32_eq(a.x, b.x);
        assert_f32_eq(a.y, b.y);
        assert_f32_eq(a.z, b.z);
    }

    #[test]
    fn engine_init_without_device() {
        let engine = Engine::new_for_tests().unwrap();
        assert_eq!(engine.channels(), 2);
        assert_eq!(engine.sample_rate(), 48_000);
    }

    #[test]
    fn engine_volume_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();

        engine.set_volume(0.25).unwrap();
        assert_f32_eq(engine.volume(), 0.25);

        engine.set_volume(1.0).unwrap();
        assert_f32_eq(engine.volume(), 1.0);
    }

    #[test]
    fn listener_count_and_enabled_toggle() {
        let engine = Engine::new_for_tests().unwrap();

        assert!(engine.listener_count() >= 1);

        engine.set_listener_enabled(0, false);
        assert!(!engine.listener_enabled(0));

        engine.set_listener_enabled(0, true);
        assert!(engine.listener_enabled(0));
    }

    #[test]
    fn listener_position_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();

        let p = Vec3::new(1.0, 2.0, 3.0);
        engine.set_listener_position(0, p);
        assert_vec3_eq(engine.listener_position(0), p);
    }

    #[test]
    fn listener_direction_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();

        let dir = Vec3::new(0.0, 0.0, -1.0);
        engine.set_listener_direction(0, dir);
        assert_vec3_eq(engine.listener_direction(0), dir);
    }

    #[test]
    fn listener_velocity_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();

        let v = Vec3::new(-1.0, 0.5, 10.0);
        engine.set_listener_velocity(0, v);
        assert_vec3_eq(engine.listener_velocity(0), v);
    }

    #[test]
    fn listener_world_up_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();

        let up = Vec3::new(0.0, 1.0, 0.0);
        engine.set_listener_world_up(0, up);
        assert_vec3_eq(engine.listener_world_up(0), up);
    }

    #[test]
    fn time_pcm_set_get() {
        let engine = Engine::new_for_tests().unwrap();

        engine.set_time_pcm(12_345);
        assert_eq!(engine.time_pcm(), 12_345);

        engine.set_time_pcm(0);
        assert_eq!(engine.time_pcm(), 0);
    }

    #[test]
    fn read_pcm_frames_shapes_output() {
        let engine = Engine::new_for_tests().unwrap();

        let requested = 256u64;
        let (samples, frames) = engine.read_pcm_frames(requested).unwrap();

        assert!(frames <= requested);

        let channels = engine.channels() as u64;
        assert_eq!(
            samples.len(),
            (frames * channels) as usize,
            "samples must be interleaved: len == frames * channels"
        );
    }

    #[test]
    fn read_pcm_frames_rejects_oversized_requests() {
        let engine = Engine::new_for_tests().unwrap();
        assert!(engine.read_pcm_frames(u64::MAX).is_err());
    }
}
