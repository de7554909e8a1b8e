//! Waveform modes and data rotation

/// Waveform mode applied by the controller when refreshing a region.
///
/// Modes trade refresh speed against grayscale fidelity. The discriminants
/// are the values sent in the refresh-trigger command and are fixed by the
/// waveform tables shipped with the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum WaveformMode {
    /// Initialization / clear-to-white waveform.
    Init = 0,
    /// Direct update: fast, black/white only.
    Du = 1,
    /// 16-level grayscale, full quality.
    Gc16 = 2,
    /// 16-level grayscale, reduced flashing.
    Gl16 = 3,
    /// GL16 variant with reduced ghosting.
    Glr16 = 4,
    /// GL16 variant tuned for text on white.
    Gld16 = 5,
    /// Animation mode, black/white only.
    A2 = 6,
    /// Direct update with 4 gray levels.
    Du4 = 7,
}

impl WaveformMode {
    /// Whether this mode drives the panel at a reduced bit depth.
    ///
    /// Low-bit-depth modes require the coarser refresh granularity.
    pub const fn is_low_bit_depth(self) -> bool {
        matches!(self, Self::Init | Self::Du | Self::Du4 | Self::A2)
    }

    /// Alignment granularity for refresh region edges, in pixels.
    pub const fn alignment(self) -> u16 {
        if self.is_low_bit_depth() { 8 } else { 4 }
    }

    /// Whether this is the fast binary mode that forces changed pixels to
    /// pure black or white and therefore needs gray-change accumulation.
    pub const fn is_fast_binary(self) -> bool {
        matches!(self, Self::Du)
    }

    /// Value sent in the refresh-trigger command.
    pub const fn wire_value(self) -> u16 {
        self as u16
    }
}

/// Rotation applied by the controller when pasting loaded data into its
/// image buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u16)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Rotate0 = 0,
    /// Rotate 90 degrees clockwise.
    Rotate90 = 1,
    /// Rotate 180 degrees.
    Rotate180 = 2,
    /// Rotate 270 degrees clockwise.
    Rotate270 = 3,
}

impl Rotation {
    /// Rotate field of the image-load argument word.
    pub const fn wire_value(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_bit_depth_modes_align_to_eight() {
        for mode in [
            WaveformMode::Init,
            WaveformMode::Du,
            WaveformMode::Du4,
            WaveformMode::A2,
        ] {
            assert!(mode.is_low_bit_depth());
            assert_eq!(mode.alignment(), 8);
        }
    }

    #[test]
    fn gray_modes_align_to_four() {
        for mode in [
            WaveformMode::Gc16,
            WaveformMode::Gl16,
            WaveformMode::Glr16,
            WaveformMode::Gld16,
        ] {
            assert!(!mode.is_low_bit_depth());
            assert_eq!(mode.alignment(), 4);
        }
    }

    #[test]
    fn only_du_is_fast_binary() {
        assert!(WaveformMode::Du.is_fast_binary());
        assert!(!WaveformMode::A2.is_fast_binary());
        assert!(!WaveformMode::Gc16.is_fast_binary());
        assert!(!WaveformMode::Init.is_fast_binary());
    }
}
