//! Playable sound instances.
//!
//! A [`Sound`] couples a [`SoundSource`] with an optional [`SoundBuffer`] and
//! adds transport controls on top: play, pause, stop, seek, looping. The
//! buffer is shared; assigning it registers the instance in the buffer's
//! attachment registry and the registration is released when the sound is
//! rebound, reset, or dropped.
//!
//! Pausing and stopping both halt the native handles; the difference is that
//! stop also rewinds to the start of the buffer. A `paused` flag remembers
//! which of the two happened so [`Sound::status`] can tell them apart.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use log::debug;

use crate::buffer::{next_instance_id, NativeBuffer, SoundBuffer};
use crate::sound::source::SoundSource;
use crate::{ErrorKind, Result};

pub mod source;

/// Playback state of a [`Sound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Paused,
    Playing,
}

/// A bound buffer plus the per-handle native views over it.
///
/// Dropping the attachment deregisters the instance from the buffer. The
/// native views must outlive the handles reading from them, so they are
/// only dropped after a rebind has moved the handles off them.
struct Attachment {
    buffer: SoundBuffer,
    id: u64,
    _natives: Vec<NativeBuffer>,
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.buffer.detach(self.id);
    }
}

/// A playable instance of a [`SoundBuffer`].
///
/// Derefs to [`SoundSource`], so all source parameters (pitch, volume, pan,
/// position, attenuation) are available directly on the sound.
pub struct Sound<'a> {
    source: SoundSource<'a>,
    attachment: Option<Attachment>,
    id: u64,
    paused: bool,
}

impl<'a> Sound<'a> {
    pub(crate) fn new(source: SoundSource<'a>) -> Self {
        Self {
            source,
            attachment: None,
            id: next_instance_id(),
            paused: false,
        }
    }

    /// Binds `buffer` to this sound, replacing any previous buffer.
    ///
    /// Playback is stopped first. Each native handle gets its own view over
    /// the shared samples so that split-mode handles keep independent read
    /// cursors.
    pub fn set_buffer(&mut self, buffer: &SoundBuffer) -> Result<()> {
        self.stop()?;

        let natives = (0..self.source.mode().handle_count())
            .map(|_| NativeBuffer::new(buffer))
            .collect::<Result<Vec<_>>>()?;
        self.source.rebind(Some(&natives))?;

        // The old attachment must detach before the new one registers, in
        // case both point at the same buffer.
        self.attachment = None;
        buffer.attach(self.id);
        self.attachment = Some(Attachment {
            buffer: buffer.clone(),
            id: self.id,
            _natives: natives,
        });
        self.paused = false;
        debug!(
            "sound {} bound to buffer of {} frame(s)",
            self.id,
            buffer.frame_count()
        );
        Ok(())
    }

    /// Unbinds the current buffer, leaving the sound silent but reusable.
    pub fn reset_buffer(&mut self) -> Result<()> {
        if self.attachment.is_none() {
            return Ok(());
        }
        self.stop()?;
        self.source.rebind(None)?;
        self.attachment = None;
        self.paused = false;
        Ok(())
    }

    pub fn buffer(&self) -> Option<&SoundBuffer> {
        self.attachment.as_ref().map(|a| &a.buffer)
    }

    /// Starts or resumes playback from the current position.
    pub fn play(&mut self) -> Result<()> {
        self.source.start_all()?;
        self.paused = false;
        Ok(())
    }

    /// Halts playback, keeping the current position. A no-op unless the
    /// sound is playing.
    pub fn pause(&mut self) -> Result<()> {
        if self.source.playing() {
            self.source.stop_all()?;
            self.paused = true;
        }
        Ok(())
    }

    /// Halts playback and rewinds to the start of the buffer.
    pub fn stop(&mut self) -> Result<()> {
        self.source.stop_all()?;
        if self.attachment.is_some() {
            self.source.seek_all(0)?;
        }
        self.paused = false;
        Ok(())
    }

    pub fn status(&self) -> Status {
        if self.source.playing() {
            Status::Playing
        } else if self.paused {
            Status::Paused
        } else {
            Status::Stopped
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.source.set_looping_all(looping);
    }

    pub fn looping(&self) -> bool {
        self.source.looping()
    }

    /// Whether playback ran off the end of the buffer.
    pub fn at_end(&self) -> bool {
        self.source.at_end()
    }

    /// Jumps to `offset` from the start of the buffer.
    ///
    /// The offset is converted to PCM frames at the buffer's sample rate.
    /// Fails with [`ErrorKind::NoBuffer`] if no buffer is bound.
    pub fn set_playing_offset(&mut self, offset: Duration) -> Result<()> {
        let rate = self.buffer_sample_rate()?;
        let frame = (offset.as_secs_f64() * rate as f64).round() as u64;
        self.source.seek_all(frame)
    }

    /// Current playback position from the start of the buffer.
    ///
    /// Returns [`Duration::ZERO`] when no buffer is bound.
    pub fn playing_offset(&self) -> Duration {
        let rate = match self.buffer_sample_rate() {
            Ok(rate) => rate,
            Err(_) => return Duration::ZERO,
        };
        let frame = self.source.cursor_pcm().unwrap_or(0);
        Duration::from_secs_f64(frame as f64 / rate as f64)
    }

    /// Frame-accurate variant of [`Sound::set_playing_offset`].
    pub fn seek_pcm(&mut self, frame: u64) -> Result<()> {
        self.buffer_sample_rate()?;
        self.source.seek_all(frame)
    }

    /// Frame-accurate variant of [`Sound::playing_offset`].
    pub fn cursor_pcm(&self) -> Result<u64> {
        self.buffer_sample_rate()?;
        self.source.cursor_pcm()
    }

    fn buffer_sample_rate(&self) -> Result<u32> {
        match &self.attachment {
            Some(a) => Ok(a.buffer.sample_rate()),
            None => Err(ErrorKind::NoBuffer.into()),
        }
    }
}

impl<'a> Deref for Sound<'a> {
    type Target = SoundSource<'a>;

    fn deref(&self) -> &Self::Target {
        &self.source
    }
}

impl DerefMut for Sound<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.source
    }
}

impl Drop for Sound<'_> {
    fn drop(&mut self) {
        // The handles are torn down by the source; the attachment drop
        // deregisters from the buffer.
        let _ = self.source.stop_all();
    }
}
