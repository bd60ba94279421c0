use maudio_sys::ffi as sys;

use crate::ErrorKind;

/// How the native pan control distributes a stereo signal.
///
/// `Balance` attenuates one side without moving content between channels;
/// `Pan` shifts content from one channel into the other.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanMode {
    Balance,
    Pan,
}

impl From<PanMode> for sys::ma_pan_mode {
    fn from(value: PanMode) -> Self {
        match value {
            PanMode::Balance => sys::ma_pan_mode_ma_pan_mode_balance,
            PanMode::Pan => sys::ma_pan_mode_ma_pan_mode_pan,
        }
    }
}

impl TryFrom<sys::ma_pan_mode> for PanMode {
    type Error = ErrorKind;

    fn try_from(value: sys::ma_pan_mode) -> Result<Self, Self::Error> {
        match value {
            sys::ma_pan_mode_ma_pan_mode_balance => Ok(PanMode::Balance),
            sys::ma_pan_mode_ma_pan_mode_pan => Ok(PanMode::Pan),
            other => Err(ErrorKind::unknown_enum::<PanMode>(other as i64)),
        }
    }
}
