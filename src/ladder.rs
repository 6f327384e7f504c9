use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LadderError, Result};

/// Historical default per-stage resistance (10 kΩ)
pub const DEFAULT_BASE_RESISTANCE: f64 = 10_000.0;

/// Per-stage resistance used by the reference example session (2 kΩ)
pub const REFERENCE_BASE_RESISTANCE: f64 = 2_000.0;

/// Speaker load the ladder drives (16 Ω)
pub const SPEAKER_LOAD: f64 = 16.0;

/// Number of input bits in the ladder
pub const NUM_BITS: u32 = 3;

/// Physical parameters of the ladder network and its load.
///
/// Only constructible through [`LadderConfig::new`] (or deserialization,
/// which goes through the same checks), so every instance has strictly
/// positive, finite resistances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLadderConfig")]
pub struct LadderConfig {
    base_resistance: f64,
    load_resistance: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLadderConfig {
    base_resistance: f64,
    #[serde(default = "default_load")]
    load_resistance: f64,
}

fn default_load() -> f64 {
    SPEAKER_LOAD
}

impl TryFrom<RawLadderConfig> for LadderConfig {
    type Error = LadderError;

    fn try_from(raw: RawLadderConfig) -> Result<Self> {
        LadderConfig::new(raw.base_resistance, raw.load_resistance)
    }
}

impl LadderConfig {
    /// Create a validated configuration
    pub fn new(base_resistance: f64, load_resistance: f64) -> Result<Self> {
        check_resistance("base resistance", base_resistance)?;
        check_resistance("load resistance", load_resistance)?;

        // Both terms positive, so the divider denominator is non-zero but may still overflow
        if !(base_resistance + load_resistance).is_finite() {
            return Err(LadderError::invalid_config(format!(
                "base and load resistance sum overflows ({} Ω + {} Ω)",
                base_resistance, load_resistance
            )));
        }

        Ok(LadderConfig {
            base_resistance,
            load_resistance,
        })
    }

    /// Reference configuration: 2 kΩ ladder into a 16 Ω speaker
    pub fn reference() -> Self {
        LadderConfig {
            base_resistance: REFERENCE_BASE_RESISTANCE,
            load_resistance: SPEAKER_LOAD,
        }
    }

    pub fn base_resistance(&self) -> f64 {
        self.base_resistance
    }

    pub fn load_resistance(&self) -> f64 {
        self.load_resistance
    }

    /// Copy of this configuration with a different base resistance
    pub fn with_base_resistance(&self, base_resistance: f64) -> Result<Self> {
        LadderConfig::new(base_resistance, self.load_resistance)
    }

    /// Copy of this configuration with a different load resistance
    pub fn with_load_resistance(&self, load_resistance: f64) -> Result<Self> {
        LadderConfig::new(self.base_resistance, load_resistance)
    }

    /// Fraction of the Thevenin voltage that appears across the load
    pub fn divider_ratio(&self) -> f64 {
        self.load_resistance / (self.base_resistance + self.load_resistance)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a configuration from a JSON file such as
    /// `{ "base_resistance": 2000.0, "load_resistance": 16.0 }`
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl Default for LadderConfig {
    fn default() -> Self {
        LadderConfig {
            base_resistance: DEFAULT_BASE_RESISTANCE,
            load_resistance: SPEAKER_LOAD,
        }
    }
}

fn check_resistance(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(LadderError::invalid_config(format!(
            "{} must be finite, got {}",
            label, value
        )));
    }
    if value <= 0.0 {
        return Err(LadderError::invalid_config(format!(
            "{} must be positive, got {} Ω",
            label, value
        )));
    }
    Ok(())
}

/// High/low voltage pair that digital bits map onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicLevels {
    pub high: f64,
    pub low: f64,
}

impl LogicLevels {
    pub fn new(high: f64, low: f64) -> Self {
        LogicLevels { high, low }
    }

    fn level(&self, bit_set: bool) -> f64 {
        if bit_set {
            self.high
        } else {
            self.low
        }
    }
}

impl Default for LogicLevels {
    fn default() -> Self {
        LogicLevels {
            high: 5.0,
            low: 0.0,
        }
    }
}

/// The three analog input voltages. `v1` drives the most significant
/// stage, `v3` the least significant one. No range is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputVoltages {
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
}

impl InputVoltages {
    pub fn new(v1: f64, v2: f64, v3: f64) -> Self {
        InputVoltages { v1, v2, v3 }
    }

    /// Map a 3-bit code onto input voltages: bit 2 → v1, bit 1 → v2, bit 0 → v3
    pub fn from_code(code: u8, levels: LogicLevels) -> Result<Self> {
        if u32::from(code) >= 1 << NUM_BITS {
            return Err(LadderError::InvalidCode(code));
        }
        Ok(Self::from_bits(code, levels))
    }

    pub(crate) fn from_bits(code: u8, levels: LogicLevels) -> Self {
        InputVoltages {
            v1: levels.level(code & 0b100 != 0),
            v2: levels.level(code & 0b010 != 0),
            v3: levels.level(code & 0b001 != 0),
        }
    }

    /// Multiply every input by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        InputVoltages {
            v1: self.v1 * factor,
            v2: self.v2 * factor,
            v3: self.v3 * factor,
        }
    }
}

/// Thevenin equivalent seen from the ladder output node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TheveninResult {
    pub v_th: f64,
    pub r_th: f64,
}

/// Electrical quantities across the load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputResult {
    pub v_out: f64,
    pub current: f64,
    pub power: f64,
}

/// Complete result of one ladder computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Analysis {
    pub config: LadderConfig,
    pub inputs: InputVoltages,
    pub thevenin: TheveninResult,
    pub output: OutputResult,
}

/// Binary-weighted superposition of the inputs. The balanced ladder always
/// presents `base_resistance` at its output node.
pub fn compute_thevenin(inputs: &InputVoltages, base_resistance: f64) -> TheveninResult {
    TheveninResult {
        v_th: inputs.v1 / 2.0 + inputs.v2 / 4.0 + inputs.v3 / 8.0,
        r_th: base_resistance,
    }
}

/// Apply the voltage divider between the Thevenin source and the load
pub fn compute_output(inputs: &InputVoltages, config: &LadderConfig) -> OutputResult {
    let thevenin = compute_thevenin(inputs, config.base_resistance());
    output_from_thevenin(&thevenin, config.load_resistance())
}

fn output_from_thevenin(thevenin: &TheveninResult, load_resistance: f64) -> OutputResult {
    let v_out = thevenin.v_th * (load_resistance / (thevenin.r_th + load_resistance));
    let current = v_out / load_resistance;
    OutputResult {
        v_out,
        current,
        power: v_out * current,
    }
}

pub fn analyze(inputs: &InputVoltages, config: &LadderConfig) -> Analysis {
    let thevenin = compute_thevenin(inputs, config.base_resistance());
    let output = output_from_thevenin(&thevenin, config.load_resistance());

    debug!(
        "Ladder inputs ({}, {}, {}) -> V_th={:.6}V, V_out={:.6}V",
        inputs.v1, inputs.v2, inputs.v3, thevenin.v_th, output.v_out
    );

    Analysis {
        config: *config,
        inputs: *inputs,
        thevenin,
        output,
    }
}

/// Output produced when every bit is at the high level (code `0b111`)
pub fn full_scale_output(config: &LadderConfig, levels: LogicLevels) -> OutputResult {
    compute_output(&InputVoltages::from_bits(0b111, levels), config)
}
