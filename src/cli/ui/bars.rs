//! Text bars standing in for charts.

use crate::cli::output::current_preferences;

fn glyphs() -> (char, char) {
    if current_preferences().plain_mode {
        ('#', '.')
    } else {
        ('█', '░')
    }
}

/// `[####......]` filled to `percent` (clamped to 0..=100).
pub fn progress_bar(percent: f64, width: usize) -> String {
    let (full, empty) = glyphs();
    let filled = if percent.is_finite() {
        ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize
    } else {
        0
    };
    let filled = filled.min(width);
    format!(
        "[{}{}]",
        full.to_string().repeat(filled),
        empty.to_string().repeat(width - filled)
    )
}

/// Bar proportional to `value / max`, at most `width` cells. Any positive
/// value gets at least one cell.
pub fn scaled_bar(value: f64, max: f64, width: usize) -> String {
    if value.is_nan() || max.is_nan() || value <= 0.0 || max <= 0.0 {
        return String::new();
    }
    let (full, _) = glyphs();
    let cells = ((value / max).min(1.0) * width as f64).round().max(1.0) as usize;
    full.to_string().repeat(cells.min(width))
}
