use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 24-bit display hint. Only used to tell crawl batches apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ColorTag(u32);

impl ColorTag {
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    pub fn rgb(self) -> u32 {
        self.0
    }

    /// Pure mapping from a seed to a color (splitmix64 finalizer).
    pub fn from_seed(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self::from_rgb((z >> 40) as u32)
    }

    /// Colors for one crawl: the target's and the one shared by the peers it
    /// introduces. The two never coincide.
    pub fn batch(seed: u64) -> (Self, Self) {
        let target = Self::from_seed(seed);
        let mut child = Self::from_seed(seed ^ 0xA5A5_A5A5_A5A5_A5A5);
        if child == target {
            child = Self::from_rgb(!target.0);
        }
        (target, child)
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl From<ColorTag> for String {
    fn from(color: ColorTag) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for ColorTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6)
            .ok_or_else(|| format!("not a #rrggbb color: {}", value))?;
        u32::from_str_radix(hex, 16)
            .map(Self::from_rgb)
            .map_err(|e| format!("not a #rrggbb color: {} ({})", value, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_is_pure() {
        assert_eq!(ColorTag::from_seed(42), ColorTag::from_seed(42));
        assert_ne!(ColorTag::from_seed(42), ColorTag::from_seed(43));
    }

    #[test]
    fn test_batch_colors_differ() {
        for seed in 0..1_000u64 {
            let (target, child) = ColorTag::batch(seed);
            assert_ne!(target, child, "seed {}", seed);
        }
    }

    #[test]
    fn test_display_is_six_hex_digits() {
        assert_eq!(ColorTag::from_rgb(0x0000ff).to_string(), "#0000ff");
        assert_eq!(ColorTag::from_rgb(0x1ff_ffff).to_string(), "#ffffff");
    }

    #[test]
    fn test_serde_round_trip_through_hex_string() {
        let json = serde_json::to_string(&ColorTag::from_rgb(0xabcdef)).unwrap();
        assert_eq!(json, "\"#abcdef\"");
        let back: ColorTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rgb(), 0xabcdef);
    }
}
