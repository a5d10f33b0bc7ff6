use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Plasma colormap control points, dark violet to yellow.
const PLASMA: [(u8, u8, u8); 6] = [
    (13, 8, 135),
    (106, 0, 168),
    (177, 42, 144),
    (225, 100, 98),
    (252, 166, 54),
    (240, 249, 33),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Plasma,
    Spectrum,
    Fire,
    Ocean,
    Purple,
    Monochrome,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plasma" => Ok(Self::Plasma),
            "spectrum" => Ok(Self::Spectrum),
            "fire" => Ok(Self::Fire),
            "ocean" => Ok(Self::Ocean),
            "purple" => Ok(Self::Purple),
            "mono" | "monochrome" => Ok(Self::Monochrome),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl ColorScheme {
    /// Get color for a given position (0.0 to 1.0) and intensity (0.0 to 1.0)
    pub fn get_color(&self, position: f32, intensity: f32) -> (u8, u8, u8) {
        let position = position.clamp(0.0, 1.0);
        let (h, s, l) = match self {
            ColorScheme::Plasma => {
                let base = gradient(&PLASMA, position);
                // Dim faint stars toward black rather than desaturating
                return lerp_color((0, 0, 0), base, 0.35 + intensity.clamp(0.0, 1.0) * 0.65);
            }
            ColorScheme::Spectrum => {
                // Purple -> blue -> cyan -> green -> yellow -> red
                let hue = 270.0 - (position * 270.0);
                (hue, 0.9, 0.4 + intensity * 0.3)
            }
            ColorScheme::Fire => {
                // Red -> orange -> yellow
                let hue = position * 60.0;
                (hue, 0.95, 0.3 + intensity * 0.4)
            }
            ColorScheme::Ocean => {
                // Deep blue -> cyan -> teal
                let hue = 240.0 - position * 60.0;
                (hue, 0.8, 0.3 + intensity * 0.35)
            }
            ColorScheme::Purple => {
                // Deep purple -> magenta -> pink
                let hue = 270.0 + position * 60.0;
                (hue, 0.8, 0.35 + intensity * 0.3)
            }
            ColorScheme::Monochrome => (0.0, 0.0, 0.25 + position * 0.5 + intensity * 0.2),
        };

        let hsl = Hsl::new(h, s, l.clamp(0.0, 1.0));
        let rgb: Srgb = hsl.into_color();

        (
            (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
            (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
            (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }

    /// Color for a star's colour value, normalised against `max`.
    /// Values above `max` saturate.
    pub fn star_color(&self, value: f64, max: f64) -> (u8, u8, u8) {
        let t = if max > 0.0 {
            (value / max).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        self.get_color(t, t)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Plasma => "plasma",
            ColorScheme::Spectrum => "spectrum",
            ColorScheme::Fire => "fire",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Purple => "purple",
            ColorScheme::Monochrome => "monochrome",
        }
    }

    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::Plasma,
            ColorScheme::Spectrum,
            ColorScheme::Fire,
            ColorScheme::Ocean,
            ColorScheme::Purple,
            ColorScheme::Monochrome,
        ]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + all.len() - 1) % all.len()]
    }
}

/// Sample a piecewise-linear gradient at `t` in [0, 1].
fn gradient(stops: &[(u8, u8, u8)], t: f32) -> (u8, u8, u8) {
    let segments = stops.len() - 1;
    let scaled = t.clamp(0.0, 1.0) * segments as f32;
    let i = (scaled.floor() as usize).min(segments - 1);
    lerp_color(stops[i], stops[i + 1], scaled - i as f32)
}

/// Interpolate between two colors
pub fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    (
        (a.0 as f32 + (b.0 as f32 - a.0 as f32) * t) as u8,
        (a.1 as f32 + (b.1 as f32 - a.1 as f32) * t) as u8,
        (a.2 as f32 + (b.2 as f32 - a.2 as f32) * t) as u8,
    )
}

/// `#rrggbb` form for SVG/HTML output.
pub fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plasma_endpoints() {
        assert_eq!(ColorScheme::Plasma.get_color(0.0, 1.0), PLASMA[0]);
        assert_eq!(ColorScheme::Plasma.get_color(1.0, 1.0), PLASMA[5]);
    }

    #[test]
    fn brighter_value_is_brighter_star() {
        let luma = |(r, g, b): (u8, u8, u8)| r as u32 + g as u32 + b as u32;
        for scheme in ColorScheme::all() {
            let dim = scheme.star_color(1.0, 75.0);
            let bright = scheme.star_color(60.0, 75.0);
            assert!(luma(bright) > luma(dim), "{:?}", scheme);
        }
    }

    #[test]
    fn values_past_max_saturate() {
        for scheme in ColorScheme::all() {
            assert_eq!(scheme.star_color(40.0, 15.0), scheme.star_color(15.0, 15.0));
            assert_eq!(scheme.star_color(-1.0, 15.0), scheme.star_color(0.0, 15.0));
        }
        assert_eq!(ColorScheme::Plasma.star_color(15.0, 15.0), PLASMA[5]);
    }

    #[test]
    fn parse_and_cycle() {
        assert_eq!("Plasma".parse::<ColorScheme>(), Ok(ColorScheme::Plasma));
        assert_eq!("mono".parse::<ColorScheme>(), Ok(ColorScheme::Monochrome));
        assert!("viridis".parse::<ColorScheme>().is_err());

        let mut scheme = ColorScheme::Plasma;
        for _ in ColorScheme::all() {
            scheme = scheme.next();
        }
        assert_eq!(scheme, ColorScheme::Plasma);
        assert_eq!(ColorScheme::Plasma.prev(), ColorScheme::Monochrome);
        for scheme in ColorScheme::all() {
            assert_eq!(scheme.name().parse::<ColorScheme>(), Ok(*scheme));
        }
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(to_hex((255, 0, 16)), "#ff0010");
    }
}
