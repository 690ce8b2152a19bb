//! Byte count presentation: a human label plus a 1–2 character magnitude badge.
//!
//! The badge digit is the order of magnitude of the value *after* it has been
//! reduced to its display unit, so `1.5 KiB` and `1.9 KiB` share the badge
//! `0K` while `512 KiB` shows as `9K`.

use serde::{Deserialize, Serialize};

const BINARY_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
const DECIMAL_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Unit family used for labels and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scale {
    /// Powers of 1024 (`KiB`, `MiB`, ...).
    #[default]
    #[serde(rename = "log2")]
    Binary,
    /// Powers of 1000 (`KB`, `MB`, ...).
    #[serde(rename = "log10")]
    Decimal,
}

impl Scale {
    pub fn base(self) -> f64 {
        match self {
            Self::Binary => 1024.0,
            Self::Decimal => 1000.0,
        }
    }

    pub fn units(self) -> &'static [&'static str] {
        match self {
            Self::Binary => &BINARY_UNITS,
            Self::Decimal => &DECIMAL_UNITS,
        }
    }

    fn log(self, value: f64) -> f64 {
        match self {
            Self::Binary => value.log2(),
            Self::Decimal => value.log10(),
        }
    }
}

/// Rendered size for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Compact glyph such as `9K` or `0M`.
    pub badge: String,
    /// Full label such as `95.4 MiB`, shown as a tooltip.
    pub label: String,
}

/// Reduces `bytes` to the largest unit that keeps the value below the base.
///
/// Returns the scaled value and its unit. Values in the top unit are not
/// clamped and may exceed the base.
pub fn scale_bytes(bytes: u64, scale: Scale) -> (f64, &'static str) {
    let base = scale.base();
    let units = scale.units();
    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= base && exp < units.len() - 1 {
        value /= base;
        exp += 1;
    }
    (value, units[exp])
}

pub fn present(bytes: u64, scale: Scale) -> Presentation {
    let (value, unit) = scale_bytes(bytes, scale);
    let label = format_label(value, unit);
    let exponent = unit_exponent(value, scale);
    let letter = unit
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default();
    let badge = if exponent <= 9 {
        format!("{exponent}{letter}")
    } else {
        letter
    };
    Presentation { badge, label }
}

fn format_label(value: f64, unit: &str) -> String {
    if value == 0.0 {
        return format!("0 {unit}");
    }
    let digits = if value >= 100.0 {
        0
    } else if value >= 10.0 {
        1
    } else {
        2
    };
    format!("{} {unit}", round_half_up(value, digits))
}

/// Formats a non-negative `value` with `digits` decimals, rounding ties away
/// from zero.
///
/// `{:.N}` rounds ties to even, so the rounding is done on the exact decimal
/// expansion instead. Every finite `f64` at or above one has at most 52
/// fractional decimal digits, which `EXACT_DIGITS` covers.
fn round_half_up(value: f64, digits: usize) -> String {
    const EXACT_DIGITS: usize = 60;
    let exact = format!("{value:.precision$}", precision = EXACT_DIGITS);
    let Some((whole, fraction)) = exact.split_once('.') else {
        return format!("{value:.digits$}");
    };

    let mut kept: Vec<u8> = whole.bytes().chain(fraction.bytes().take(digits)).collect();
    if fraction.as_bytes().get(digits).is_some_and(|next| *next >= b'5') {
        let mut carry = true;
        for digit in kept.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let mut rounded = String::from_utf8_lossy(&kept[..split]).into_owned();
    if digits > 0 {
        rounded.push('.');
        rounded.push_str(&String::from_utf8_lossy(&kept[split..]));
    }
    rounded
}

fn unit_exponent(value: f64, scale: Scale) -> u32 {
    if value <= 0.0 {
        return 0;
    }
    let floored = scale.log(value).floor();
    if floored.is_finite() && floored >= 0.0 {
        floored as u32
    } else {
        0
    }
}
