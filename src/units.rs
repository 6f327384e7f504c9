use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{LadderError, Result};

lazy_static! {
    static ref VALUE_PATTERN: Regex = Regex::new(
        r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)\s*(\S*)\s*$"
    ).unwrap();
}

/// Unit names accepted after the SI prefix, longest first
const UNIT_SUFFIXES: [&str; 5] = ["ohms", "ohm", "ω", "v", "a"];

/// Parse a value in engineering notation (e.g. `2k`, `16ohm`, `3.3V`, `1meg`, `-2.5e-1`).
///
/// Prefixes follow SPICE conventions: `m` is milli regardless of case and
/// mega is spelled `meg`.
pub fn parse_value(text: &str) -> Result<f64> {
    let captures = VALUE_PATTERN
        .captures(text)
        .ok_or_else(|| LadderError::InvalidValue(format!("'{}' is not a number", text.trim())))?;

    let mantissa = captures[1]
        .parse::<f64>()
        .map_err(|e| LadderError::InvalidValue(format!("'{}': {}", text.trim(), e)))?;

    let suffix = captures[2].to_lowercase();
    let prefix = UNIT_SUFFIXES
        .iter()
        .find_map(|unit| suffix.strip_suffix(*unit))
        .unwrap_or(suffix.as_str());

    Ok(mantissa * prefix_multiplier(prefix, text)?)
}

fn prefix_multiplier(prefix: &str, text: &str) -> Result<f64> {
    let multiplier = match prefix {
        "" => 1.0,
        "f" => 1e-15,
        "p" => 1e-12,
        "n" => 1e-9,
        "u" | "µ" | "μ" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "meg" => 1e6,
        "g" => 1e9,
        "t" => 1e12,
        _ => {
            return Err(LadderError::InvalidValue(format!(
                "unknown unit '{}' in '{}'",
                prefix,
                text.trim()
            )))
        }
    };
    Ok(multiplier)
}
