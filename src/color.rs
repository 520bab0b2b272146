use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// City colours: one stable colour per city name
// ---------------------------------------------------------------------------

/// Maps every city in the dataset to a distinct colour.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Colours are assigned in the order cities are given.
    pub fn new(cities: &[String]) -> Self {
        let mapping = cities
            .iter()
            .cloned()
            .zip(generate_palette(cities.len()))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, city: &str) -> Color32 {
        self.mapping.get(city).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Continuous scale for the map bubbles
// ---------------------------------------------------------------------------

/// Dark-theme scale stops, low to high: deep blue, purple, orange, pale yellow.
const SCALE: [(f32, f32, f32); 4] = [
    (0.05, 0.10, 0.35),
    (0.45, 0.15, 0.55),
    (0.90, 0.45, 0.20),
    (0.98, 0.95, 0.60),
];

/// Position of `value` in `[min, max]`, clamped; 0.5 for a flat range.
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return 0.5;
    }
    ((value - min) / span).clamp(0.0, 1.0) as f32
}

/// Colour for a normalized value in `[0, 1]`.
pub fn scale_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0) * (SCALE.len() - 1) as f32;
    let i = (t.floor() as usize).min(SCALE.len() - 2);
    let frac = t - i as f32;
    let lo = LinSrgb::from(SCALE[i]);
    let hi = LinSrgb::from(SCALE[i + 1]);
    to_color32(lo.mix(hi, frac).into_color())
}
