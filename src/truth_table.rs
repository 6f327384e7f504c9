use log::debug;
use serde::{Deserialize, Serialize};

use crate::ladder::{compute_output, InputVoltages, LadderConfig, LogicLevels, NUM_BITS};

/// Number of distinct input codes for the ladder
pub const NUM_CODES: u8 = 1 << NUM_BITS;

/// One line of the exhaustive input/output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthRow {
    pub index: u8,
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
    pub v_out: f64,
    pub current: f64,
    pub power: f64,
    pub bit_pattern: String,
}

impl TruthRow {
    pub fn inputs(&self) -> InputVoltages {
        InputVoltages::new(self.v1, self.v2, self.v3)
    }
}

/// Lazy iterator over the truth table, ascending from `000` to `111`
#[derive(Debug, Clone)]
pub struct TruthTable {
    config: LadderConfig,
    levels: LogicLevels,
    next: u8,
}

impl Iterator for TruthTable {
    type Item = TruthRow;

    fn next(&mut self) -> Option<TruthRow> {
        if self.next >= NUM_CODES {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let inputs = InputVoltages::from_bits(index, self.levels);
        let output = compute_output(&inputs, &self.config);
        let bit_pattern = format!("{:03b}", index);

        debug!("Truth table row {}: V_out={:.6}V", bit_pattern, output.v_out);

        Some(TruthRow {
            index,
            v1: inputs.v1,
            v2: inputs.v2,
            v3: inputs.v3,
            v_out: output.v_out,
            current: output.current,
            power: output.power,
            bit_pattern,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(NUM_CODES.saturating_sub(self.next));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TruthTable {}

impl std::iter::FusedIterator for TruthTable {}

/// Enumerate all eight input codes with bits mapped onto `high`/`low`
pub fn enumerate_truth_table(config: &LadderConfig, high: f64, low: f64) -> TruthTable {
    enumerate_with_levels(config, LogicLevels::new(high, low))
}

pub fn enumerate_with_levels(config: &LadderConfig, levels: LogicLevels) -> TruthTable {
    TruthTable {
        config: *config,
        levels,
        next: 0,
    }
}
