//! Numeric literal spelling for GLSL
//!
//! GLSL ES 1.0 has no implicit int-to-float conversion, so `x / 10` fails to
//! compile where `x / 10.` does. Every literal we emit must read as a float.

/// Integral values at or above this magnitude are printed with an exponent.
/// Beyond 2^53 an f64 no longer holds every integer, and `Display` would
/// spell out hundreds of digits.
const EXPONENT_THRESHOLD: f64 = 9_007_199_254_740_992.0;

/// How numeric literals are decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralStyle {
    /// `5` → `5.`, `3.5` → `3.5`
    #[default]
    IntegralSuffix,
    /// Every literal gets a trailing `.`: `5` → `5.`, `3.5` → `3.5.`.
    /// Kept for renderers built around the legacy always-decorate output.
    AlwaysSuffix,
}

/// Spell `value` as a GLSL literal, or `None` when it has no finite spelling.
pub fn format_literal(value: f64, style: LiteralStyle) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let canonical = canonical(value);
    Some(match style {
        LiteralStyle::IntegralSuffix if needs_point(&canonical) => format!("{canonical}."),
        LiteralStyle::IntegralSuffix => canonical,
        LiteralStyle::AlwaysSuffix => format!("{canonical}."),
    })
}

/// Shortest round-tripping decimal form, switching to exponent form for huge integers.
fn canonical(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() >= EXPONENT_THRESHOLD {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}

/// An integer spelling with neither a point nor an exponent.
fn needs_point(spelled: &str) -> bool {
    !spelled.contains(['.', 'e', 'E'])
}
