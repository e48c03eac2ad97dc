//! Glow and fade styling of pointer strokes.
//!
//! A glowing stroke is drawn white with three stacked red drop shadows.
//! While fading, opacity and shadow alpha fall to zero along the
//! `cubic-bezier(0.25, 0.46, 0.45, 0.94)` ease-out curve.

use crate::lifecycle::PointerPhase;
use crate::shapes::SerializableColor;
use peniko::Color;

/// Control points of the fade easing curve.
const FADE_EASING: (f64, f64, f64, f64) = (0.25, 0.46, 0.45, 0.94);

/// Blur radius and peak alpha of each drop-shadow layer.
const GLOW_LAYERS: [(f64, f64); 3] = [(8.0, 0.8), (16.0, 0.6), (24.0, 0.4)];

/// One drop-shadow layer around the stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowLayer {
    pub blur_radius: f64,
    pub color: SerializableColor,
}

/// Presentation of a pointer stroke at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub opacity: f64,
    pub layers: [GlowLayer; 3],
}

impl GlowStyle {
    /// Fully lit style.
    pub fn glowing(stroke_width: f64, opacity: f64) -> Self {
        Self {
            stroke_color: SerializableColor::white(),
            stroke_width,
            opacity,
            layers: GLOW_LAYERS.map(|(blur_radius, alpha)| GlowLayer {
                blur_radius,
                color: glow_red(alpha),
            }),
        }
    }

    /// Style `progress` (0..=1) of the way through the fade.
    pub fn fading(stroke_width: f64, opacity: f64, progress: f64) -> Self {
        let remaining = 1.0 - ease(progress.clamp(0.0, 1.0));
        Self {
            stroke_color: SerializableColor::white(),
            stroke_width,
            opacity: opacity * remaining,
            layers: GLOW_LAYERS.map(|(blur_radius, alpha)| GlowLayer {
                blur_radius,
                color: glow_red(alpha * remaining),
            }),
        }
    }

    /// Stroke color with the style's opacity applied.
    pub fn stroke(&self) -> Color {
        let alpha = (self.stroke_color.a as f64 * self.opacity) as u8;
        self.stroke_color.with_alpha(alpha).into()
    }
}

/// Style for a stroke in `phase`. Deleted strokes have no style.
pub fn glow_style(
    phase: PointerPhase,
    fade_progress: f64,
    stroke_width: f64,
    opacity: f64,
) -> Option<GlowStyle> {
    match phase {
        PointerPhase::Glowing => Some(GlowStyle::glowing(stroke_width, opacity)),
        PointerPhase::Fading => Some(GlowStyle::fading(stroke_width, opacity, fade_progress)),
        PointerPhase::Deleted => None,
    }
}

fn glow_red(alpha: f64) -> SerializableColor {
    SerializableColor::new(255, 0, 0, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Evaluate the fade easing curve at `x` in 0..=1.
pub fn ease(x: f64) -> f64 {
    let (x1, y1, x2, y2) = FADE_EASING;
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let t = solve_bezier_t(x, x1, x2);
    bezier(t, y1, y2)
}

fn bezier(t: f64, p1: f64, p2: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Find `t` with `bezier(t) == x`: Newton steps, bisection if they stall.
fn solve_bezier_t(x: f64, p1: f64, p2: f64) -> f64 {
    let mut t = x;
    for _ in 0..8 {
        let err = bezier(t, p1, p2) - x;
        if err.abs() < 1e-7 {
            return t;
        }
        let slope = bezier_slope(t, p1, p2);
        if slope.abs() < 1e-6 {
            break;
        }
        t -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    t = x;
    for _ in 0..50 {
        let value = bezier(t, p1, p2);
        if (value - x).abs() < 1e-7 {
            break;
        }
        if value < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    t
}
