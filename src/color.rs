use std::fmt;

use palette::Srgb;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Named palettes
// ---------------------------------------------------------------------------

/// One RGB triple per channel, components in `[0, 1]`.
pub type ColorAssignment = Vec<Srgb>;

/// Linear colour ramps across channel index.
///
/// Deserializes through [`Palette::from_name`], so settings files accept
/// any casing and fall back like the UI does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Palette {
    Red,
    Green,
    Blue,
    #[default]
    Thermometer,
}

impl Palette {
    pub const ALL: [Palette; 4] = [
        Palette::Red,
        Palette::Green,
        Palette::Blue,
        Palette::Thermometer,
    ];

    /// Resolve a palette by name, case-insensitively.
    ///
    /// Anything unrecognised maps to [`Palette::Thermometer`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "red" => Palette::Red,
            "green" => Palette::Green,
            "blue" => Palette::Blue,
            "thermometer" => Palette::Thermometer,
            other => {
                log::debug!("unknown palette '{other}', using Thermometer");
                Palette::Thermometer
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Red => "Red",
            Palette::Green => "Green",
            Palette::Blue => "Blue",
            Palette::Thermometer => "Thermometer",
        }
    }

    /// Colour at ramp position `t` (0 for the first channel, 1 for the last).
    fn at(self, t: f32) -> Srgb {
        match self {
            Palette::Red => Srgb::new(t, 0.0, 0.0),
            Palette::Green => Srgb::new(0.0, t, 0.0),
            Palette::Blue => Srgb::new(0.0, 0.0, t),
            Palette::Thermometer => Srgb::new(t, 0.0, 1.0 - t),
        }
    }

    /// Generate `n` colours, evenly spaced along the ramp.
    pub fn colors(self, n: usize) -> ColorAssignment {
        let last = n.saturating_sub(1).max(1) as f32;
        (0..n).map(|i| self.at(i as f32 / last)).collect()
    }
}

impl From<String> for Palette {
    fn from(name: String) -> Self {
        Palette::from_name(&name)
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Colours for `channel_count` channels using the palette called `palette_name`.
pub fn generate(palette_name: &str, channel_count: usize) -> ColorAssignment {
    Palette::from_name(palette_name).colors(channel_count)
}

/// Convert to 8-bit components, e.g. for a UI colour type.
pub fn to_rgb8(color: Srgb) -> [u8; 3] {
    let c: Srgb<u8> = color.into_format();
    [c.red, c.green, c.blue]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(colors: &[Srgb]) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        (
            colors.iter().map(|c| c.red).collect(),
            colors.iter().map(|c| c.green).collect(),
            colors.iter().map(|c| c.blue).collect(),
        )
    }

    #[test]
    fn thermometer_ramps_red_up_and_blue_down() {
        let (r, g, b) = channels(&generate("Thermometer", 3));
        assert_eq!(r, vec![0.0, 0.5, 1.0]);
        assert_eq!(g, vec![0.0, 0.0, 0.0]);
        assert_eq!(b, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn single_channel_palettes() {
        let (r, g, b) = channels(&generate("Green", 5));
        assert_eq!(g, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(r.iter().chain(&b).all(|v| *v == 0.0));

        let (r, _, _) = channels(&generate("red", 2));
        assert_eq!(r, vec![0.0, 1.0]);
    }

    #[test]
    fn unknown_name_falls_back_to_thermometer() {
        assert_eq!(Palette::from_name("viridis"), Palette::Thermometer);
        assert_eq!(generate("", 4), generate("Thermometer", 4));
    }

    #[test]
    fn degenerate_counts() {
        assert!(generate("Blue", 0).is_empty());
        let one = generate("Blue", 1);
        assert_eq!(one, vec![Srgb::new(0.0, 0.0, 0.0)]);
    }

    #[test]
    fn converts_to_bytes() {
        assert_eq!(to_rgb8(Srgb::new(1.0, 0.0, 0.0)), [255, 0, 0]);
        assert_eq!(to_rgb8(Srgb::new(0.0, 1.0, 1.0)), [0, 255, 255]);
    }
}
