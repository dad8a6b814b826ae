use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous colour scales
// ---------------------------------------------------------------------------

/// Sequential colour scale used to shade heatmap cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Viridis,
    Plasma,
}

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PLASMA: [(u8, u8, u8); 5] = [
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

impl ColorScale {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorScale::Viridis => &VIRIDIS,
            ColorScale::Plasma => &PLASMA,
        }
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped and NaN is grey.
    pub fn sample(self, t: f64) -> Color32 {
        if t.is_nan() {
            return Color32::GRAY;
        }
        let stops = self.stops();
        let pos = t.clamp(0.0, 1.0) as f32 * (stops.len() - 1) as f32;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - i as f32;

        let linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = linear(stops[i]).mix(linear(stops[i + 1]), frac);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Map a correlation in `[-1, 1]` onto the scale.
    pub fn for_correlation(self, r: f64) -> Color32 {
        self.sample((r + 1.0) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let colours = generate_palette(6, 0.75, 0.55);
        assert_eq!(colours.len(), 6);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0, 0.75, 0.55).is_empty());
    }

    #[test]
    fn scale_endpoints_match_stops() {
        assert_eq!(ColorScale::Viridis.sample(0.0), Color32::from_rgb(68, 1, 84));
        assert_eq!(ColorScale::Viridis.sample(1.0), Color32::from_rgb(253, 231, 37));
        assert_eq!(ColorScale::Plasma.sample(-3.0), Color32::from_rgb(13, 8, 135));
        assert_eq!(ColorScale::Plasma.sample(f64::NAN), Color32::GRAY);
    }
}
