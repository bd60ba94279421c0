//! `minisfx` is a small playback-oriented audio layer built on top of
//! miniaudio, modelled after the classic SFML audio API.
//!
//! The crate is organised around three types:
//!
//! - [`engine::Engine`] wraps `ma_engine` and owns the output device, the
//!   listener, and the engine clock. Every sound is created from an engine
//!   and must not outlive it.
//! - [`buffer::SoundBuffer`] is a shared, reference-counted block of
//!   interleaved PCM samples. Many sounds can play the same buffer at once;
//!   the buffer keeps track of which instances are bound to it.
//! - [`sound::Sound`] is a playable instance: transport controls
//!   (play / pause / stop / seek), looping, and the full set of source
//!   parameters inherited from [`sound::source::SoundSource`] (pitch, volume,
//!   pan, 3D position, listener-relative positioning, distance attenuation).
//!
//! Sounds come in two channel modes. `Mono` uses a single native handle and
//! miniaudio's own pan control. `StereoSplit` owns **two** mono handles
//! hard-panned left and right, and emulates panning by scaling the per-handle
//! gains — the double-source technique used by engines targeting backends
//! without a pan control.
//!
//! There is also a [`sensor`] module exposing the platform sensor backend.
//! On this platform the backend is not implemented and every call is a no-op.
//!
//! Decoding, mixing, DSP and streaming are out of scope; buffers are plain
//! in-memory sample blocks supplied by the caller.

pub mod audio;
pub mod buffer;
pub mod engine;
pub mod sensor;
pub mod sound;

use maudio_sys::ffi as sys;

use thiserror::Error;

pub(crate) trait Binding: Sized {
    type Raw;

    /// Construct the wrapper from a raw FFI handle.
    fn from_ptr(raw: Self::Raw) -> Self;

    fn to_raw(&self) -> Self::Raw;
}

/// A raw `ma_result` code returned by miniaudio.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MaError(pub sys::ma_result);

impl MaError {
    /// Human-readable name of the result code.
    ///
    /// Only the codes this crate can realistically surface are spelled out;
    /// anything else falls through to a generic label with the raw value
    /// still available in `self.0`.
    pub fn name(self) -> &'static str {
        match self.0 {
            sys::ma_result_MA_ERROR => "MiniaudioError",
            sys::ma_result_MA_INVALID_ARGS => "InvalidArgs",
            sys::ma_result_MA_INVALID_OPERATION => "InvalidOperation",
            sys::ma_result_MA_OUT_OF_MEMORY => "OutOfMemory",
            sys::ma_result_MA_OUT_OF_RANGE => "OutOfRange",
            sys::ma_result_MA_DOES_NOT_EXIST => "DoesNotExist",
            sys::ma_result_MA_AT_END => "AtEnd",
            sys::ma_result_MA_BUSY => "Busy",
            sys::ma_result_MA_IO_ERROR => "IoError",
            sys::ma_result_MA_INVALID_DATA => "InvalidData",
            sys::ma_result_MA_NOT_IMPLEMENTED => "NotImplemented",
            sys::ma_result_MA_FORMAT_NOT_SUPPORTED => "FormatNotSupported",
            sys::ma_result_MA_NO_BACKEND => "NoBackend",
            sys::ma_result_MA_NO_DEVICE => "NoDevice",
            sys::ma_result_MA_INVALID_DEVICE_CONFIG => "InvalidDeviceConfig",
            sys::ma_result_MA_DEVICE_NOT_INITIALIZED => "DeviceNotInitialized",
            sys::ma_result_MA_DEVICE_NOT_STARTED => "DeviceNotStarted",
            sys::ma_result_MA_FAILED_TO_INIT_BACKEND => "FailedToInitBackend",
            sys::ma_result_MA_FAILED_TO_OPEN_BACKEND_DEVICE => "FailedToOpenBackendDevice",
            sys::ma_result_MA_FAILED_TO_START_BACKEND_DEVICE => "FailedToStartBackendDevice",
            _ => "UnknownMaResult",
        }
    }
}

impl std::fmt::Display for MaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

impl std::fmt::Debug for MaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MaError({}, {})", self.name(), self.0)
    }
}

/// Errors raised by this crate before a native call is even attempted.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// `samples.len()` is not a multiple of the channel count.
    #[error("sample data length is not a multiple of the channel count")]
    BufferSize,
    #[error("channel count must be at least 1")]
    NoChannels,
    #[error("sample rate must be at least 1 Hz")]
    ZeroSampleRate,
    /// A pull request so large the sample vector length would overflow.
    #[error("requested frame count is too large")]
    FrameCountTooLarge,
    /// Seek and offset operations need a bound buffer.
    #[error("sound has no buffer bound")]
    NoBuffer,
    /// A raw value read back from miniaudio has no typed counterpart.
    #[error("native value {value} is not a valid {type_name}")]
    UnknownEnum { value: i64, type_name: &'static str },
}

impl ErrorKind {
    pub(crate) fn unknown_enum<T>(value: i64) -> Self {
        ErrorKind::UnknownEnum {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("miniaudio error: {0}")]
    Native(MaError),
    #[error(transparent)]
    Kind(#[from] ErrorKind),
}

impl PartialEq<MaError> for Error {
    fn eq(&self, other: &MaError) -> bool {
        matches!(self, Error::Native(e) if e.0 == other.0)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) struct RawResult;

impl RawResult {
    pub(crate) fn check(res: sys::ma_result) -> Result<()> {
        if res == sys::ma_result_MA_SUCCESS {
            Ok(())
        } else {
            Err(Error::Native(MaError(res)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ma_error_is_readable() {
        let err = MaError(sys::ma_result_MA_INVALID_ARGS);
        assert!(err.to_string().contains("InvalidArgs"));

        let err = MaError(sys::ma_result_MA_NO_DEVICE);
        assert!(err.to_string().contains("NoDevice"));

        let err = MaError(sys::ma_result_MA_AT_END);
        assert!(err.to_string().contains("AtEnd"));
    }

    #[test]
    fn raw_result_maps_success_and_failure() {
        assert!(RawResult::check(sys::ma_result_MA_SUCCESS).is_ok());

        let err = RawResult::check(sys::ma_result_MA_INVALID_OPERATION).unwrap_err();
        assert_eq!(err, MaError(sys::ma_result_MA_INVALID_OPERATION));
    }

    #[test]
    fn error_kind_display() {
        let err = Error::from(ErrorKind::NoBuffer);
        assert!(err.to_string().contains("no buffer"));
    }
}
