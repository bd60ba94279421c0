/// Common standard audio sample rates.
///
/// Used when configuring an engine without a device, where miniaudio cannot
/// infer the rate from the backend. `48_000 Hz` and `44_100 Hz` are the most
/// commonly used rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Sr8000,
    Sr11025,
    Sr16000,
    Sr22050,
    Sr24000,
    Sr32000,
    Sr44100,
    Sr48000,
    Sr88200,
    Sr96000,
    Sr176400,
    Sr192000,
}

impl SampleRate {
    /// The rate in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            SampleRate::Sr8000 => 8_000,
            SampleRate::Sr11025 => 11_025,
            SampleRate::Sr16000 => 16_000,
            SampleRate::Sr22050 => 22_050,
            SampleRate::Sr24000 => 24_000,
            SampleRate::Sr32000 => 32_000,
            SampleRate::Sr44100 => 44_100,
            SampleRate::Sr48000 => 48_000,
            SampleRate::Sr88200 => 88_200,
            SampleRate::Sr96000 => 96_000,
            SampleRate::Sr176400 => 176_400,
            SampleRate::Sr192000 => 192_000,
        }
    }
}

impl From<SampleRate> for u32 {
    fn from(value: SampleRate) -> u32 {
        value.hz()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hz_values() {
        assert_eq!(SampleRate::Sr44100.hz(), 44_100);
        assert_eq!(u32::from(SampleRate::Sr48000), 48_000);
    }
}
