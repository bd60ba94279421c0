//! Shared sample buffers.
//!
//! A [`SoundBuffer`] is an immutable block of interleaved `f32` PCM samples
//! with a channel count and sample rate. Buffers are reference counted and
//! cheap to clone; any number of sounds can play the same buffer at once.
//!
//! The buffer keeps a registry of the sound instances currently bound to it.
//! Instances register when a buffer is assigned and deregister when they are
//! rebound, reset, or dropped, so [`SoundBuffer::attachment_count`] always
//! reflects the number of live users.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use maudio_sys::ffi as sys;

use crate::{Binding, ErrorKind, Result};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_instance_id() -> u64 {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

struct BufferInner {
    samples: Vec<f32>,
    channels: u32,
    sample_rate: u32,
    attached: Mutex<BTreeSet<u64>>,
}

/// A shared, immutable block of interleaved PCM samples.
#[derive(Clone)]
pub struct SoundBuffer {
    inner: Arc<BufferInner>,
}

impl SoundBuffer {
    /// Creates a buffer from interleaved `f32` samples.
    ///
    /// `samples.len()` must be a multiple of `channels`, and both `channels`
    /// and `sample_rate` must be at least 1.
    pub fn from_samples(samples: Vec<f32>, channels: u32, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(ErrorKind::NoChannels.into());
        }
        if sample_rate == 0 {
            return Err(ErrorKind::ZeroSampleRate.into());
        }
        if samples.len() % channels as usize != 0 {
            return Err(ErrorKind::BufferSize.into());
        }
        Ok(Self {
            inner: Arc::new(BufferInner {
                samples,
                channels,
                sample_rate,
                attached: Mutex::new(BTreeSet::new()),
            }),
        })
    }

    pub fn channels(&self) -> u32 {
        self.inner.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    /// Number of PCM frames (samples per channel).
    pub fn frame_count(&self) -> u64 {
        (self.inner.samples.len() / self.inner.channels as usize) as u64
    }

    pub fn duration(&self) -> Duration {
        // sample_rate >= 1 is guaranteed by from_samples
        Duration::from_secs_f64(self.frame_count() as f64 / self.inner.sample_rate as f64)
    }

    pub fn samples(&self) -> &[f32] {
        &self.inner.samples
    }

    /// Number of sound instances currently bound to this buffer.
    pub fn attachment_count(&self) -> usize {
        self.inner.attached.lock().map(|set| set.len()).unwrap_or(0)
    }

    pub(crate) fn attach(&self, id: u64) {
        if let Ok(mut set) = self.inner.attached.lock() {
            set.insert(id);
        }
    }

    pub(crate) fn detach(&self, id: u64) {
        if let Ok(mut set) = self.inner.attached.lock() {
            set.remove(&id);
        }
    }
}

impl std::fmt::Debug for SoundBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBuffer")
            .field("channels", &self.channels())
            .field("sample_rate", &self.sample_rate())
            .field("frames", &self.frame_count())
            .field("attached", &self.attachment_count())
            .finish()
    }
}

/// A native `ma_audio_buffer` view over a [`SoundBuffer`].
///
/// Data-source read cursors live in the native buffer, so every native sound
/// handle gets its own view. The view holds a clone of the shared buffer to
/// keep the sample memory alive; the samples themselves are never copied.
pub(crate) struct NativeBuffer {
    inner: *mut sys::ma_audio_buffer,
    _samples: SoundBuffer,
}

impl Binding for NativeBuffer {
    type Raw = *mut sys::ma_audio_buffer;

    fn from_ptr(_raw: Self::Raw) -> Self {
        unimplemented!("NativeBuffer is always created through NativeBuffer::new")
    }

    fn to_raw(&self) -> Self::Raw {
        self.inner
    }
}

impl NativeBuffer {
    pub(crate) fn new(buffer: &SoundBuffer) -> Result<Self> {
        let config = buffer_ffi::ma_audio_buffer_config_init(
            buffer.channels(),
            buffer.sample_rate(),
            buffer.frame_count(),
            buffer.samples(),
        );

        let mut mem: Box<std::mem::MaybeUninit<sys::ma_audio_buffer>> =
            Box::new(std::mem::MaybeUninit::uninit());
        buffer_ffi::ma_audio_buffer_init(&config, mem.as_mut_ptr())?;

        // Safety: a failed init returns above before assume_init
        let mem: Box<sys::ma_audio_buffer> = unsafe { mem.assume_init() };
        Ok(Self {
            inner: Box::into_raw(mem),
            _samples: buffer.clone(),
        })
    }

    pub(crate) fn data_source_ptr(&self) -> *mut sys::ma_data_source {
        self.inner as *mut sys::ma_data_source
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        buffer_ffi::ma_audio_buffer_uninit(self);
        drop(unsafe { Box::from_raw(self.to_raw()) });
    }
}

pub(crate) mod buffer_ffi {
    use maudio_sys::ffi as sys;

    use crate::buffer::NativeBuffer;
    use crate::{Binding, RawResult, Result};

    #[inline]
    pub fn ma_audio_buffer_config_init(
        channels: u32,
        sample_rate: u32,
        size_in_frames: u64,
        data: &[f32],
    ) -> sys::ma_audio_buffer_config {
        let mut config = unsafe {
            sys::ma_audio_buffer_config_init(
                sys::ma_format_ma_format_f32,
                channels,
                size_in_frames,
                data.as_ptr() as *const core::ffi::c_void,
                core::ptr::null(),
            )
        };
        // ma_audio_buffer_config_init does not take a rate; without this the
        // engine assumes its own rate and resamples nothing.
        config.sampleRate = sample_rate;
        config
    }

    #[inline]
    pub fn ma_audio_buffer_init(
        config: *const sys::ma_audio_buffer_config,
        buffer: *mut sys::ma_audio_buffer,
    ) -> Result<()> {
        let res = unsafe { sys::ma_audio_buffer_init(config, buffer) };
        RawResult::check(res)
    }

    #[inline]
    pub fn ma_audio_buffer_uninit(buffer: &mut NativeBuffer) {
        unsafe {
            sys::ma_audio_buffer_uninit(buffer.to_raw());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_samples_validates_shape() {
        assert!(SoundBuffer::from_samples(vec![0.0; 6], 2, 44_100).is_ok());
        assert!(SoundBuffer::from_samples(vec![0.0; 5], 2, 44_100).is_err());
        assert!(SoundBuffer::from_samples(vec![0.0; 4], 0, 44_100).is_err());
        assert!(SoundBuffer::from_samples(vec![0.0; 4], 2, 0).is_err());
    }

    #[test]
    fn frame_count_and_duration() {
        let buffer = SoundBuffer::from_samples(vec![0.0; 88_200], 2, 44_100).unwrap();
        assert_eq!(buffer.frame_count(), 44_100);
        assert_eq!(buffer.duration(), Duration::from_secs(1));
        assert_eq!(buffer.channels(), 2);
    }

    #[test]
    fn clones_share_the_attachment_registry() {
        let buffer = SoundBuffer::from_samples(vec![0.0; 8], 1, 48_000).unwrap();
        let clone = buffer.clone();

        buffer.attach(7);
        assert_eq!(clone.attachment_count(), 1);

        clone.detach(7);
        assert_eq!(buffer.attachment_count(), 0);
    }

    #[test]
    fn native_buffer_init_and_drop() {
        let buffer = SoundBuffer::from_samples(vec![0.0; 512], 2, 48_000).unwrap();
        let native = NativeBuffer::new(&buffer).unwrap();
        assert!(!native.data_source_ptr().is_null());
    }
}
