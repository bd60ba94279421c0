//! The sound-source parameter wrapper.
//!
//! [`SoundSource`] owns one or two native `ma_sound` handles and exposes a
//! uniform set of parameter accessors over them. In [`ChannelMode::Mono`]
//! there is a single handle and every accessor forwards straight to it. In
//! [`ChannelMode::StereoSplit`] (double-source mode) there are two handles
//! hard-panned left and right; setters fan out to both, getters read the
//! left handle, and panning is emulated by scaling the per-handle gains:
//!
//! ```text
//! left  = clamp(1 - pan, 0, 1) * volume
//! right = clamp(1 + pan, 0, 1) * volume
//! ```
//!
//! Split mode exists for the spatial tricks it allows (each ear can be
//! positioned independently relative to the listener); for plain panning the
//! native control in mono mode is the better choice.

use std::marker::PhantomData;
use std::mem::MaybeUninit;

use log::debug;
use maudio_sys::ffi as sys;

use crate::audio::dsp::pan::PanMode;
use crate::audio::math::vec3::Vec3;
use crate::audio::spatial::attenuation::AttenuationModel;
use crate::audio::spatial::positioning::Positioning;
use crate::buffer::NativeBuffer;
use crate::engine::Engine;
use crate::{Binding, Result};

/// How many native handles back a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// One handle; panning uses the native pan control.
    Mono,
    /// Two mono handles hard-panned left/right; panning is emulated by
    /// scaling the per-handle gains.
    StereoSplit,
}

impl ChannelMode {
    pub(crate) fn handle_count(self) -> usize {
        match self {
            ChannelMode::Mono => 1,
            ChannelMode::StereoSplit => 2,
        }
    }
}

const LEFT: usize = 0;
const RIGHT: usize = 1;

#[derive(Clone, Copy)]
enum Handles {
    Single(*mut sys::ma_sound),
    Split([*mut sys::ma_sound; 2]),
}

impl Handles {
    fn all(&self) -> &[*mut sys::ma_sound] {
        match self {
            Handles::Single(h) => std::slice::from_ref(h),
            Handles::Split(hs) => hs,
        }
    }

    /// The handle getters read from: the only one, or the left one.
    fn primary(&self) -> *mut sys::ma_sound {
        match self {
            Handles::Single(h) => *h,
            Handles::Split(hs) => hs[LEFT],
        }
    }
}

/// A wrapper over one or two native playback handles.
///
/// Sources are created from an [`Engine`] and must not outlive it. All
/// parameter accessors are direct calls into miniaudio, except for volume
/// and pan in split mode, which go through the gain law described in the
/// module docs.
pub struct SoundSource<'a> {
    handles: Handles,
    mode: ChannelMode,
    engine: *mut sys::ma_engine,
    volume: f32,
    pan: f32,
    /// A source must not outlive its engine
    _engine: PhantomData<&'a Engine>,
}

impl<'a> SoundSource<'a> {
    pub(crate) fn new(engine: &'a Engine, mode: ChannelMode) -> Result<Self> {
        let handles = init_handles(engine.to_raw(), mode, None)?;
        let source = Self {
            handles,
            mode,
            engine: engine.to_raw(),
            volume: 1.0,
            pan: 0.0,
            _engine: PhantomData,
        };
        source.apply_split_hard_pan();
        Ok(source)
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_pitch(h, pitch);
        }
    }

    pub fn pitch(&self) -> f32 {
        sound_ffi::ma_sound_get_pitch(self.handles.primary())
    }

    /// Sets the linear volume, `0.0..=1.0` being the useful range.
    ///
    /// In split mode the value is combined with the current pan before being
    /// written to the two handles.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.apply_volume();
    }

    /// The most recently set volume. In split mode this is the value before
    /// the pan law is applied, not the per-handle gain.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the stereo pan, `-1.0` (full left) to `1.0` (full right).
    ///
    /// Mono mode forwards to the native pan control; split mode re-derives
    /// the per-handle gains.
    pub fn set_pan(&mut self, pan: f32) {
        let pan = pan.clamp(-1.0, 1.0);
        self.pan = pan;
        match self.mode {
            ChannelMode::Mono => sound_ffi::ma_sound_set_pan(self.handles.primary(), pan),
            ChannelMode::StereoSplit => self.apply_volume(),
        }
    }

    pub fn pan(&self) -> f32 {
        match self.mode {
            ChannelMode::Mono => sound_ffi::ma_sound_get_pan(self.handles.primary()),
            ChannelMode::StereoSplit => self.pan,
        }
    }

    /// See [`PanMode`]. Only meaningful in mono mode; split mode manages the
    /// per-handle pan internally.
    pub fn set_pan_mode(&mut self, pan_mode: PanMode) {
        if self.mode == ChannelMode::Mono {
            sound_ffi::ma_sound_set_pan_mode(self.handles.primary(), pan_mode);
        }
    }

    pub fn pan_mode(&self) -> Result<PanMode> {
        sound_ffi::ma_sound_get_pan_mode(self.handles.primary())
    }

    /// Sets the 3D position of the source.
    ///
    /// In split mode the write is ignored while the source is
    /// listener-relative, because the two handles are pinned to the ears.
    pub fn set_position(&mut self, position: Vec3) {
        if self.mode == ChannelMode::StereoSplit && self.is_relative_to_listener() {
            return;
        }
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_position(h, position);
        }
    }

    pub fn position(&self) -> Vec3 {
        sound_ffi::ma_sound_get_position(self.handles.primary())
    }

    /// Makes the source position relative to the listener instead of
    /// absolute in world space.
    ///
    /// Entering relative mode on a split source pins the two handles to
    /// (-1, 0, 0) and (+1, 0, 0), one per ear.
    pub fn set_relative_to_listener(&mut self, relative: bool) {
        let positioning = if relative {
            Positioning::Relative
        } else {
            Positioning::Absolute
        };
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_positioning(h, positioning);
        }
        if relative {
            if let Handles::Split(hs) = self.handles {
                sound_ffi::ma_sound_set_position(hs[LEFT], Vec3::new(-1.0, 0.0, 0.0));
                sound_ffi::ma_sound_set_position(hs[RIGHT], Vec3::new(1.0, 0.0, 0.0));
            }
        }
    }

    pub fn is_relative_to_listener(&self) -> bool {
        sound_ffi::ma_sound_get_positioning(self.handles.primary())
            .map(|p| p == Positioning::Relative)
            .unwrap_or(false)
    }

    /// Distance below which the source is heard at full volume.
    pub fn set_min_distance(&mut self, distance: f32) {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_min_distance(h, distance);
        }
    }

    pub fn min_distance(&self) -> f32 {
        sound_ffi::ma_sound_get_min_distance(self.handles.primary())
    }

    /// Rolloff factor of the distance attenuation; higher values make the
    /// sound fade faster with distance.
    pub fn set_rolloff(&mut self, rolloff: f32) {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_rolloff(h, rolloff);
        }
    }

    pub fn rolloff(&self) -> f32 {
        sound_ffi::ma_sound_get_rolloff(self.handles.primary())
    }

    pub fn set_attenuation_model(&mut self, model: AttenuationModel) {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_attenuation_model(h, model);
        }
    }

    pub fn attenuation_model(&self) -> Result<AttenuationModel> {
        sound_ffi::ma_sound_get_attenuation_model(self.handles.primary())
    }

    /// Disabling spatialization makes the source ignore position, distance
    /// and the listener entirely.
    pub fn set_spatialization(&mut self, enabled: bool) {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_spatialization_enabled(h, enabled);
        }
    }

    pub fn spatialization(&self) -> bool {
        sound_ffi::ma_sound_is_spatialization_enabled(self.handles.primary())
    }

    fn apply_volume(&self) {
        match &self.handles {
            Handles::Single(h) => sound_ffi::ma_sound_set_volume(*h, self.volume),
            Handles::Split(hs) => {
                let left = (1.0 - self.pan).clamp(0.0, 1.0) * self.volume;
                let right = (1.0 + self.pan).clamp(0.0, 1.0) * self.volume;
                sound_ffi::ma_sound_set_volume(hs[LEFT], left);
                sound_ffi::ma_sound_set_volume(hs[RIGHT], right);
            }
        }
    }

    fn apply_split_hard_pan(&self) {
        if let Handles::Split(hs) = self.handles {
            sound_ffi::ma_sound_set_pan(hs[LEFT], -1.0);
            sound_ffi::ma_sound_set_pan(hs[RIGHT], 1.0);
        }
    }

    /// Swaps the data source under the handles.
    ///
    /// miniaudio binds a sound to its data source at init time, so the
    /// handles are torn down and reinitialized; all parameters are
    /// snapshotted first and reapplied to the new handles. The new handles
    /// are fully initialized before the old ones are destroyed, so a failure
    /// leaves the source untouched.
    pub(crate) fn rebind(&mut self, sources: Option<&[NativeBuffer]>) -> Result<()> {
        let snapshot = self.snapshot();
        let new_handles = init_handles(self.engine, self.mode, sources)?;

        for &h in self.handles.all() {
            destroy_handle(h);
        }
        self.handles = new_handles;

        self.apply_split_hard_pan();
        self.restore(snapshot);
        debug!(
            "rebound {} handle(s) to {}",
            self.mode.handle_count(),
            if sources.is_some() {
                "a sample buffer"
            } else {
                "no data source"
            }
        );
        Ok(())
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            pitch: self.pitch(),
            position: self.position(),
            relative: self.is_relative_to_listener(),
            min_distance: self.min_distance(),
            rolloff: self.rolloff(),
            model: self.attenuation_model().ok(),
            spatialization: self.spatialization(),
            looping: self.looping(),
        }
    }

    fn restore(&mut self, snapshot: ParamSnapshot) {
        self.set_pitch(snapshot.pitch);
        self.set_min_distance(snapshot.min_distance);
        self.set_rolloff(snapshot.rolloff);
        if let Some(model) = snapshot.model {
            self.set_attenuation_model(model);
        }
        self.set_spatialization(snapshot.spatialization);
        self.set_looping_all(snapshot.looping);
        self.set_relative_to_listener(snapshot.relative);
        self.set_position(snapshot.position);
        if self.mode == ChannelMode::Mono {
            sound_ffi::ma_sound_set_pan(self.handles.primary(), self.pan);
        }
        self.apply_volume();
    }

    // Transport primitives used by Sound.

    pub(crate) fn start_all(&mut self) -> Result<()> {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_start(h)?;
        }
        Ok(())
    }

    pub(crate) fn stop_all(&mut self) -> Result<()> {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_stop(h)?;
        }
        Ok(())
    }

    pub(crate) fn seek_all(&mut self, frame: u64) -> Result<()> {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_seek_to_pcm_frame(h, frame)?;
        }
        Ok(())
    }

    pub(crate) fn set_looping_all(&mut self, looping: bool) {
        for &h in self.handles.all() {
            sound_ffi::ma_sound_set_looping(h, looping);
        }
    }

    pub(crate) fn looping(&self) -> bool {
        sound_ffi::ma_sound_is_looping(self.handles.primary())
    }

    pub(crate) fn playing(&self) -> bool {
        sound_ffi::ma_sound_is_playing(self.handles.primary())
    }

    pub(crate) fn at_end(&self) -> bool {
        sound_ffi::ma_sound_at_end(self.handles.primary())
    }

    pub(crate) fn cursor_pcm(&self) -> Result<u64> {
        sound_ffi::ma_sound_get_cursor_in_pcm_frames(self.handles.primary())
    }
}

impl Drop for SoundSource<'_> {
    fn drop(&mut self) {
        for &h in self.handles.all() {
            destroy_handle(h);
        }
    }
}

struct ParamSnapshot {
    pitch: f32,
    position: Vec3,
    relative: bool,
    min_distance: f32,
    rolloff: f32,
    model: Option<AttenuationModel>,
    spatialization: bool,
    looping: bool,
}

fn init_handles(
    engine: *mut sys::ma_engine,
    mode: ChannelMode,
    sources: Option<&[NativeBuffer]>,
) -> Result<Handles> {
    let count = mode.handle_count();
    debug_assert!(sources.map_or(true, |s| s.len() == count));

    let mut raw: Vec<*mut sys::ma_sound> = Vec::with_capacity(count);
    for i in 0..count {
        let res = match sources {
            Some(srcs) => init_one_from_source(engine, srcs[i].data_source_ptr()),
            None => init_one_detached(engine),
        };
        match res {
            Ok(ptr) => raw.push(ptr),
            Err(e) => {
                for ptr in raw {
                    destroy_handle(ptr);
                }
                return Err(e);
            }
        }
    }

    Ok(match mode {
        ChannelMode::Mono => Handles::Single(raw[0]),
        ChannelMode::StereoSplit => Handles::Split([raw[LEFT], raw[RIGHT]]),
    })
}

/// Initializes a handle with no data source (a bare engine node); a data
/// source is bound later through `rebind`.
fn init_one_detached(engine: *mut sys::ma_engine) -> Result<*mut sys::ma_sound> {
    let config = sound_ffi::ma_sound_config_init_2(engine);
    let mut mem: Box<MaybeUninit<sys::ma_sound>> = Box::new(MaybeUninit::uninit());
    sound_ffi::ma_sound_init_ex(engine, &config, mem.as_mut_ptr())?;
    // Safety: a failed init returns above before assume_init
    let mem: Box<sys::ma_sound> = unsafe { mem.assume_init() };
    let ptr = Box::into_raw(mem);
    // A sourceless sound is a group-style node, and those come up in the
    // started state; a fresh handle must report itself as not playing.
    if let Err(e) = sound_ffi::ma_sound_stop(ptr) {
        destroy_handle(ptr);
        return Err(e);
    }
    Ok(ptr)
}

fn init_one_from_source(
    engine: *mut sys::ma_engine,
    source: *mut sys::ma_data_source,
) -> Result<*mut sys::ma_sound> {
    let mut mem: Box<MaybeUninit<sys::ma_sound>> = Box::new(MaybeUninit::uninit());
    sound_ffi::ma_sound_init_from_data_source(engine, source, mem.as_mut_ptr())?;
    // Safety: a failed init returns above before assume_init
    let mem: Box<sys::ma_sound> = unsafe { mem.assume_init() };
    Ok(Box::into_raw(mem))
}

fn destroy_handle(handle: *mut sys::ma_sound) {
    sound_ffi::ma_sound_uninit(handle);
    drop(unsafe { Box::from_raw(handle) });
}

pub(crate) mod sound_ffi {
    use maudio_sys::ffi as sys;

    use crate::audio::dsp::pan::PanMode;
    use crate::audio::math::vec3::Vec3;
    use crate::audio::spatial::attenuation::AttenuationModel;
    use crate::audio::spatial::positioning::Positioning;
    use crate::{RawResult, Result};

    #[inline]
    pub fn ma_sound_config_init_2(engine: *mut sys::ma_engine) -> sys::ma_sound_config {
        unsafe { sys::ma_sound_config_init_2(engine) }
    }

    #[inline]
    pub fn ma_sound_init_ex(
        engine: *mut sys::ma_engine,
        config: *const sys::ma_sound_config,
        sound: *mut sys::ma_sound,
    ) -> Result<()> {
        let res = unsafe { sys::ma_sound_init_ex(engine, config, sound) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_sound_init_from_data_source(
        engine: *mut sys::ma_engine,
        source: *mut sys::ma_data_source,
        sound: *mut sys::ma_sound,
    ) -> Result<()> {
        let res = unsafe {
            sys::ma_sound_init_from_data_source(engine, source, 0, core::ptr::null_mut(), sound)
        };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_sound_uninit(sound: *mut sys::ma_sound) {
        unsafe { sys::ma_sound_uninit(sound) };
    }

    #[inline]
    pub fn ma_sound_start(sound: *mut sys::ma_sound) -> Result<()> {
        let res = unsafe { sys::ma_sound_start(sound) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_sound_stop(sound: *mut sys::ma_sound) -> Result<()> {
        let res = unsafe { sys::ma_sound_stop(sound) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_sound_seek_to_pcm_frame(sound: *mut sys::ma_sound, frame: u64) -> Result<()> {
        let res = unsafe { sys::ma_sound_seek_to_pcm_frame(sound, frame) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_sound_get_cursor_in_pcm_frames(sound: *mut sys::ma_sound) -> Result<u64> {
        let mut cursor = 0u64;
        let res = unsafe { sys::ma_sound_get_cursor_in_pcm_frames(sound, &mut cursor) };
        RawResult::check(res)?;
        Ok(cursor)
    }

    #[inline]
    pub fn ma_sound_is_playing(sound: *mut sys::ma_sound) -> bool {
        let res = unsafe { sys::ma_sound_is_playing(sound as *const _) };
        res == 1
    }

    #[inline]
    pub fn ma_sound_at_end(sound: *mut sys::ma_sound) -> bool {
        let res = unsafe { sys::ma_sound_at_end(sound as *const _) };
        res == 1
    }

    #[inline]
    pub fn ma_sound_set_looping(sound: *mut sys::ma_sound, looping: bool) {
        unsafe { sys::ma_sound_set_looping(sound, looping as sys::ma_bool32) };
    }

    #[inline]
    pub fn ma_sound_is_looping(sound: *mut sys::ma_sound) -> bool {
        let res = unsafe { sys::ma_sound_is_looping(sound as *const _) };
        res == 1
    }

    #[inline]
    pub fn ma_sound_set_pitch(sound: *mut sys::ma_sound, pitch: f32) {
        unsafe { sys::ma_sound_set_pitch(sound, pitch) };
    }

    #[inline]
    pub fn ma_sound_get_pitch(sound: *mut sys::ma_sound) -> f32 {
        unsafe { sys::ma_sound_get_pitch(sound as *const _) }
    }

    #[inline]
    pub fn ma_sound_set_volume(sound: *mut sys::ma_sound, volume: f32) {
        unsafe { sys::ma_sound_set_volume(sound, volume) };
    }

    #[inline]
    pub fn ma_sound_get_volume(sound: *mut sys::ma_sound) -> f32 {
        unsafe { sys::ma_sound_get_volume(sound as *const _) }
    }

    #[inline]
    pub fn ma_sound_set_pan(sound: *mut sys::ma_sound, pan: f32) {
        unsafe { sys::ma_sound_set_pan(sound, pan) };
    }

    #[inline]
    pub fn ma_sound_get_pan(sound: *mut sys::ma_sound) -> f32 {
        unsafe { sys::ma_sound_get_pan(sound as *const _) }
    }

    #[inline]
    pub fn ma_sound_set_pan_mode(sound: *mut sys::ma_sound, pan_mode: PanMode) {
        unsafe { sys::ma_sound_set_pan_mode(sound, pan_mode.into()) };
    }

    #[inline]
    pub fn ma_sound_get_pan_mode(sound: *mut sys::ma_sound) -> Result<PanMode> {
        let mode = unsafe { sys::ma_sound_get_pan_mode(sound as *const _) };
        Ok(PanMode::try_from(mode)?)
    }

    #[inline]
    pub fn ma_sound_set_position(sound: *mut sys::ma_sound, position: Vec3) {
        unsafe { sys::ma_sound_set_position(sound, position.x, position.y, position.z) };
    }

    #[inline]
    pub fn ma_sound_get_position(sound: *mut sys::ma_sound) -> Vec3 {
        let vec = unsafe { sys::ma_sound_get_position(sound as *const _) };
        vec.into()
    }

    #[inline]
    pub fn ma_sound_set_positioning(sound: *mut sys::ma_sound, positioning: Positioning) {
        unsafe { sys::ma_sound_set_positioning(sound, positioning.into()) };
    }

    #[inline]
    pub fn ma_sound_get_positioning(sound: *mut sys::ma_sound) -> Result<Positioning> {
        let positioning = unsafe { sys::ma_sound_get_positioning(sound as *const _) };
        Ok(Positioning::try_from(positioning)?)
    }

    #[inline]
    pub fn ma_sound_set_min_distance(sound: *mut sys::ma_sound, distance: f32) {
        unsafe { sys::ma_sound_set_min_distance(sound, distance) };
    }

    #[inline]
    pub fn ma_sound_get_min_distance(sound: *mut sys::ma_sound) -> f32 {
        unsafe { sys::ma_sound_get_min_distance(sound as *const _) }
    }

    #[inline]
    pub fn ma_sound_set_rolloff(sound: *mut sys::ma_sound, rolloff: f32) {
        unsafe { sys::ma_sound_set_rolloff(sound, rolloff) };
    }

    #[inline]
    pub fn ma_sound_get_rolloff(sound: *mut sys::ma_sound) -> f32 {
        unsafe { sys::ma_sound_get_rolloff(sound as *const _) }
    }

    #[inline]
    pub fn ma_sound_set_attenuation_model(sound: *mut sys::ma_sound, model: AttenuationModel) {
        unsafe { sys::ma_sound_set_attenuation_model(sound, model.into()) };
    }

    #[inline]
    pub fn ma_sound_get_attenuation_model(sound: *mut sys::ma_sound) -> Result<AttenuationModel> {
        let model = unsafe { sys::ma_sound_get_attenuation_model(sound as *const _) };
        Ok(AttenuationModel::try_from(model)?)
    }

    #[inline]
    pub fn ma_sound_set_spatialization_enabled(sound: *mut sys::ma_sound, enabled: bool) {
        unsafe { sys::ma_sound_set_spatialization_enabled(sound, enabled as sys::ma_bool32) };
    }

    #[inline]
    pub fn ma_sound_is_spatialization_enabled(sound: *mut sys::ma_sound) -> bool {
        let res = unsafe { sys::ma_sound_is_spatialization_enabled(sound as *const _) };
        res == 1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::Engine;

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
    fn mono_source_init() {
        let engine = Engine::new_for_tests().unwrap();
        let source = engine.new_source(ChannelMode::Mono).unwrap();
        assert_eq!(source.mode(), ChannelMode::Mono);
        assert!(!source.playing());
    }

    #[test]
    fn split_source_init() {
        let engine = Engine::new_for_tests().unwrap();
        let source = engine.new_source(ChannelMode::StereoSplit).unwrap();
        assert_eq!(source.mode(), ChannelMode::StereoSplit);
        assert!(!source.playing());
    }

    #[test]
    fn pitch_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();
        for mode in [ChannelMode::Mono, ChannelMode::StereoSplit] {
            let mut source = engine.new_source(mode).unwrap();
            source.set_pitch(1.5);
            assert_f32_eq(source.pitch(), 1.5);
        }
    }

    #[test]
    fn volume_getter_is_pan_independent() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::StereoSplit).unwrap();

        source.set_volume(0.25);
        source.set_pan(0.5);
        assert_f32_eq(source.volume(), 0.25);
    }

    #[test]
    fn mono_pan_uses_native_control() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::Mono).unwrap();

        source.set_pan(-0.5);
        assert_f32_eq(source.pan(), -0.5);

        // Out-of-range input is clamped before it reaches the handle.
        source.set_pan(4.0);
        assert_f32_eq(source.pan(), 1.0);
    }

    #[test]
    fn split_pan_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::StereoSplit).unwrap();

        source.set_pan(0.75);
        assert_f32_eq(source.pan(), 0.75);
    }

    fn handle_gains(source: &SoundSource) -> Vec<f32> {
        source
            .handles
            .all()
            .iter()
            .map(|&h| sound_ffi::ma_sound_get_volume(h))
            .collect()
    }

    #[test]
    fn split_gain_law() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::StereoSplit).unwrap();

        source.set_volume(0.8);
        let gains = handle_gains(&source);
        assert_f32_eq(gains[LEFT], 0.8);
        assert_f32_eq(gains[RIGHT], 0.8);

        // Panning half right: the left gain drops, the right stays clamped.
        source.set_pan(0.5);
        let gains = handle_gains(&source);
        assert_f32_eq(gains[LEFT], 0.4);
        assert_f32_eq(gains[RIGHT], 0.8);

        // Hard left mutes the right handle entirely.
        source.set_pan(-1.0);
        let gains = handle_gains(&source);
        assert_f32_eq(gains[LEFT], 0.8);
        assert_f32_eq(gains[RIGHT], 0.0);
    }

    #[test]
    fn position_roundtrip_absolute() {
        let engine = Engine::new_for_tests().unwrap();
        for mode in [ChannelMode::Mono, ChannelMode::StereoSplit] {
            let mut source = engine.new_source(mode).unwrap();
            let p = Vec3::new(1.0, 2.0, 3.0);
            source.set_position(p);
            assert_vec3_eq(source.position(), p);
        }
    }

    #[test]
    fn relative_mode_pins_split_handles_to_the_ears() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::StereoSplit).unwrap();

        source.set_relative_to_listener(true);
        assert!(source.is_relative_to_listener());
        assert_vec3_eq(source.position(), Vec3::new(-1.0, 0.0, 0.0));

        // Position writes are ignored while pinned.
        source.set_position(Vec3::new(5.0, 5.0, 5.0));
        assert_vec3_eq(source.position(), Vec3::new(-1.0, 0.0, 0.0));

        // Leaving relative mode makes the source movable again.
        source.set_relative_to_listener(false);
        let p = Vec3::new(2.0, 0.0, 0.0);
        source.set_position(p);
        assert_vec3_eq(source.position(), p);
    }

    #[test]
    fn relative_roundtrip_mono() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::Mono).unwrap();

        source.set_relative_to_listener(true);
        assert!(source.is_relative_to_listener());

        source.set_relative_to_listener(false);
        assert!(!source.is_relative_to_listener());
    }

    #[test]
    fn attenuation_roundtrip() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::StereoSplit).unwrap();

        source.set_min_distance(1.25);
        assert_f32_eq(source.min_distance(), 1.25);

        source.set_rolloff(0.75);
        assert_f32_eq(source.rolloff(), 0.75);

        source.set_attenuation_model(AttenuationModel::Linear);
        assert_eq!(
            source.attenuation_model().unwrap(),
            AttenuationModel::Linear
        );
    }

    #[test]
    fn pan_mode_roundtrip_mono() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::Mono).unwrap();

        source.set_pan_mode(PanMode::Pan);
        assert_eq!(source.pan_mode().unwrap(), PanMode::Pan);

        source.set_pan_mode(PanMode::Balance);
        assert_eq!(source.pan_mode().unwrap(), PanMode::Balance);
    }

    #[test]
    fn spatialization_toggle() {
        let engine = Engine::new_for_tests().unwrap();
        let mut source = engine.new_source(ChannelMode::Mono).unwrap();

        source.set_spatialization(false);
        assert!(!source.spatialization());

        source.set_spatialization(true);
        assert!(source.spatialization());
    }
}
