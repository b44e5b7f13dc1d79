use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Fill of the publications-per-year bars.
pub const YEAR_BARS: Color32 = Color32::from_rgb(135, 206, 235);
/// Fill of the top-journal bars.
pub const JOURNAL_BARS: Color32 = Color32::from_rgb(144, 238, 144);
/// Word-cloud canvas.
pub const CLOUD_BACKGROUND: Color32 = Color32::WHITE;

// ---------------------------------------------------------------------------
// Word-cloud palette
// ---------------------------------------------------------------------------

/// `n` colours sweeping from deep violet through teal to green, dark enough
/// to read on a white canvas. Index 0 is used for the most frequent word.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
            let hue = 270.0 - t * 170.0;
            let hsl = Hsl::new(hue, 0.65, 0.30 + 0.12 * t);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Colour for the word at `rank`; ranks past the palette get grey.
pub fn cloud_color(palette: &[Color32], rank: usize) -> Color32 {
    palette.get(rank).copied().unwrap_or(Color32::DARK_GRAY)
}
