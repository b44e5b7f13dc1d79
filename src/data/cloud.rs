//! Word-cloud placement.
//!
//! Pure geometry: words are sized by frequency and dropped onto a spiral
//! around the canvas centre at the first position that overlaps nothing
//! placed before. Text measurement is supplied by the caller so the UI can
//! use its real font metrics.

use super::words::WordFrequencies;

pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 400.0;
pub const MAX_WORDS: usize = 200;
pub const MIN_FONT_SIZE: f32 = 4.0;
/// How strongly a frequency ratio shrinks the font: 0 ignores frequency, 1 is
/// fully proportional.
pub const RELATIVE_SCALING: f32 = 0.5;

const SHRINK_FACTOR: f32 = 0.9;
const SPIRAL_ANGLE_STEP: f32 = 0.2;
const SPIRAL_GROWTH: f32 = 3.0;

/// Axis-aligned box in canvas coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn inside(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.w <= width && self.y + self.h <= height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: f32,
    pub rect: Rect,
    /// Position in the frequency ranking, 0 = most frequent.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudLayout {
    pub width: f32,
    pub height: f32,
    pub words: Vec<PlacedWord>,
}

/// Place the most frequent words on a `width` x `height` canvas.
///
/// `measure(text, font_size)` returns the rendered `(width, height)`.
/// Placement stops at the first word that does not fit even at
/// [`MIN_FONT_SIZE`].
pub fn layout(
    freqs: &WordFrequencies,
    width: f32,
    height: f32,
    measure: impl Fn(&str, f32) -> (f32, f32),
) -> CloudLayout {
    let max_count = freqs.max_count().max(1) as f32;
    let mut words: Vec<PlacedWord> = Vec::new();
    let mut font_size = height / 2.0;
    let mut last_freq = 1.0_f32;

    for (rank, (text, count)) in freqs.entries().iter().take(MAX_WORDS).enumerate() {
        let freq = *count as f32 / max_count;
        if rank > 0 {
            font_size =
                ((RELATIVE_SCALING * freq / last_freq + (1.0 - RELATIVE_SCALING)) * font_size)
                    .round();
        }

        let mut size = font_size;
        let spot = loop {
            if size < MIN_FONT_SIZE {
                break None;
            }
            let (w, h) = measure(text, size);
            if let Some(rect) = find_spot(&words, w, h, width, height) {
                break Some(rect);
            }
            size = (size * SHRINK_FACTOR).floor();
        };
        let Some(rect) = spot else {
            log::debug!("Word cloud full after {} words", words.len());
            break;
        };

        words.push(PlacedWord {
            text: text.clone(),
            font_size: size,
            rect,
            rank,
        });
        font_size = size;
        last_freq = freq;
    }

    CloudLayout {
        width,
        height,
        words,
    }
}

/// Walk an Archimedean spiral out from the centre until a free spot appears.
fn find_spot(placed: &[PlacedWord], w: f32, h: f32, width: f32, height: f32) -> Option<Rect> {
    if w > width || h > height {
        return None;
    }
    let (cx, cy) = (width / 2.0, height / 2.0);
    let aspect = height / width;
    let max_radius = cx.hypot(cy);

    let mut theta = 0.0_f32;
    loop {
        let radius = SPIRAL_GROWTH * theta;
        if radius > max_radius {
            return None;
        }
        let rect = Rect {
            x: cx + radius * theta.cos() - w / 2.0,
            y: cy + radius * aspect * theta.sin() - h / 2.0,
            w,
            h,
        };
        if rect.inside(width, height) && placed.iter().all(|p| !p.rect.intersects(&rect)) {
            return Some(rect);
        }
        theta += SPIRAL_ANGLE_STEP;
    }
}
