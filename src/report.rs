use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::ladder::{analyze, Analysis, InputVoltages, LadderConfig, LogicLevels};
use crate::truth_table::{enumerate_with_levels, TruthRow};

/// Width of the banner and separator lines
pub const REPORT_WIDTH: usize = 60;

fn banner(f: &mut fmt::Formatter<'_>, ch: &str) -> fmt::Result {
    writeln!(f, "{}", ch.repeat(REPORT_WIDTH))
}

/// Text rendering of a single ladder analysis
pub struct AnalysisReport<'a>(pub &'a Analysis);

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Analysis {
            config,
            inputs,
            thevenin,
            output,
        } = self.0;

        banner(f, "=")?;
        writeln!(f, "R2R LADDER DAC ANALYSIS")?;
        banner(f, "=")?;

        writeln!(f, "\nConfiguration:")?;
        writeln!(f, "  Base Resistance (R): {:.1} kΩ", config.base_resistance() / 1000.0)?;
        writeln!(f, "  Speaker Load: {} Ω", config.load_resistance())?;

        writeln!(f, "\nInput Voltages:")?;
        writeln!(f, "  V1 (MSB): {:.3} V", inputs.v1)?;
        writeln!(f, "  V2:       {:.3} V", inputs.v2)?;
        writeln!(f, "  V3 (LSB): {:.3} V", inputs.v3)?;

        writeln!(f, "\nThevenin Equivalent:")?;
        writeln!(f, "  V_th: {:.6} V", thevenin.v_th)?;
        writeln!(f, "  R_th: {:.1} kΩ", thevenin.r_th / 1000.0)?;

        writeln!(f, "\nOutput (across speaker):")?;
        writeln!(f, "  Voltage: {:.6} V", output.v_out)?;
        writeln!(f, "  Current: {:.6} mA", output.current * 1000.0)?;
        writeln!(f, "  Power:   {:.6} mW", output.power * 1000.0)?;
        banner(f, "=")
    }
}

/// Text rendering of the truth table for one pair of logic levels
pub struct TruthTableReport<'a> {
    pub rows: &'a [TruthRow],
    pub levels: LogicLevels,
}

impl fmt::Display for TruthTableReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        banner(f, "=")?;
        writeln!(f, "TRUTH TABLE ({}V logic levels)", self.levels.high)?;
        banner(f, "=")?;
        writeln!(
            f,
            "{:>6} {:>6} {:>6} | {:>12} | {:>6}",
            "V1", "V2", "V3", "V_out (V)", "Binary"
        )?;
        banner(f, "-")?;

        for row in self.rows {
            writeln!(
                f,
                "{:6.1} {:6.1} {:6.1} | {:12.6} | {:>6}",
                row.v1, row.v2, row.v3, row.v_out, row.bit_pattern
            )?;
        }

        banner(f, "=")
    }
}

pub fn format_report(analysis: &Analysis) -> String {
    AnalysisReport(analysis).to_string()
}

pub fn format_truth_table(rows: &[TruthRow], levels: LogicLevels) -> String {
    TruthTableReport { rows, levels }.to_string()
}

/// Compute and print the analysis report, returning the full analysis
pub fn display_analysis<W: Write>(
    inputs: &InputVoltages,
    config: &LadderConfig,
    out: &mut W,
) -> Result<Analysis> {
    let analysis = analyze(inputs, config);
    write!(out, "{}", AnalysisReport(&analysis))?;
    Ok(analysis)
}

/// Compute and print the analysis report, returning the load voltage
pub fn display_results<W: Write>(
    inputs: &InputVoltages,
    config: &LadderConfig,
    out: &mut W,
) -> Result<f64> {
    Ok(display_analysis(inputs, config, out)?.output.v_out)
}

/// Enumerate and print the truth table, returning the rows
pub fn display_truth_table<W: Write>(
    config: &LadderConfig,
    levels: LogicLevels,
    out: &mut W,
) -> Result<Vec<TruthRow>> {
    let rows: Vec<TruthRow> = enumerate_with_levels(config, levels).collect();
    write!(out, "{}", TruthTableReport { rows: &rows, levels })?;
    Ok(rows)
}

/// The example session: three single analyses followed by the truth table for `levels`
pub fn write_demo_session<W: Write>(
    config: &LadderConfig,
    levels: LogicLevels,
    out: &mut W,
) -> Result<Vec<f64>> {
    let examples = [
        ("\nExample 1: All bits HIGH (5V)", InputVoltages::new(5.0, 5.0, 5.0)),
        ("\n\nExample 2: Binary pattern 101", InputVoltages::new(5.0, 0.0, 5.0)),
        ("\n\nExample 3: Custom voltages", InputVoltages::new(3.3, 1.5, 2.0)),
    ];

    let mut outputs = Vec::with_capacity(examples.len());
    for (heading, inputs) in &examples {
        writeln!(out, "{}", heading)?;
        outputs.push(display_results(inputs, config, out)?);
    }

    write!(out, "\n\n")?;
    display_truth_table(config, levels, out)?;
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_HIGH_REPORT: &str = "\
============================================================
R2R LADDER DAC ANALYSIS
============================================================

Configuration:
  Base Resistance (R): 2.0 kΩ
  Speaker Load: 16 Ω

Input Voltages:
  V1 (MSB): 5.000 V
  V2:       5.000 V
  V3 (LSB): 5.000 V

Thevenin Equivalent:
  V_th: 4.375000 V
  R_th: 2.0 kΩ

Output (across speaker):
  Voltage: 0.034722 V
  Current: 2.170139 mA
  Power:   0.075352 mW
============================================================
";

    #[test]
    fn test_format_report_golden() {
        let analysis = analyze(&InputVoltages::new(5.0, 5.0, 5.0), &LadderConfig::reference());
        assert_eq!(format_report(&analysis), ALL_HIGH_REPORT);
    }

    #[test]
    fn test_display_results_writes_and_returns_v_out() {
        let config = LadderConfig::reference();
        let mut buffer = Vec::new();
        let v_out = display_results(&InputVoltages::new(5.0, 0.0, 5.0), &config, &mut buffer).unwrap();

        assert!((v_out - 3.125 * 16.0 / 2016.0).abs() < 1e-12);
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("  V_th: 3.125000 V\n"));
        assert!(text.contains("  Voltage: 0.024802 V\n"));
        assert!(text.contains("  Current: 1.550099 mA\n"));
        assert!(text.contains("  Power:   0.038445 mW\n"));
    }

    #[test]
    fn test_report_shows_fractional_load() {
        let config = LadderConfig::new(4_700.0, 8.5).unwrap();
        let analysis = analyze(&InputVoltages::new(1.0, 0.0, 0.0), &config);
        let text = format_report(&analysis);
        assert!(text.contains("  Base Resistance (R): 4.7 kΩ\n"));
        assert!(text.contains("  Speaker Load: 8.5 Ω\n"));
    }

    #[test]
    fn test_truth_table_layout() {
        let config = LadderConfig::reference();
        let mut buffer = Vec::new();
        let rows = display_truth_table(&config, LogicLevels::default(), &mut buffer).unwrap();
        assert_eq!(rows.len(), 8);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 14);
        assert_eq!(lines[1], "TRUTH TABLE (5V logic levels)");
        assert_eq!(lines[3], "    V1     V2     V3 |    V_out (V) | Binary");
        assert_eq!(lines[4], "-".repeat(REPORT_WIDTH));
        assert_eq!(lines[5], "   0.0    0.0    0.0 |     0.000000 |    000");
        assert_eq!(lines[10], "   5.0    0.0    5.0 |     0.024802 |    101");
        assert_eq!(lines[12], "   5.0    5.0    5.0 |     0.034722 |    111");
        assert_eq!(lines[13], "=".repeat(REPORT_WIDTH));
    }

    #[test]
    fn test_truth_table_title_uses_high_level() {
        let config = LadderConfig::reference();
        let rows: Vec<TruthRow> =
            enumerate_with_levels(&config, LogicLevels::new(3.3, 0.0)).collect();
        let text = format_truth_table(&rows, LogicLevels::new(3.3, 0.0));
        assert!(text.contains("TRUTH TABLE (3.3V logic levels)\n"));
        assert!(text.contains("   3.3    3.3    3.3 |"));
    }

    #[test]
    fn test_demo_session_matches_reference_output() {
        let mut buffer = Vec::new();
        let outputs = write_demo_session(&LadderConfig::reference(), LogicLevels::default(), &mut buffer).unwrap();
        assert_eq!(outputs.len(), 3);

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, include_str!("../tests/data/demo_session.txt"));
    }

    #[test]
    fn test_demo_session_uses_given_levels() {
        let mut buffer = Vec::new();
        write_demo_session(&LadderConfig::reference(), LogicLevels::new(12.0, 0.0), &mut buffer)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("TRUTH TABLE (12V logic levels)\n"));
        assert!(text.contains("  12.0   12.0   12.0 |"));
        assert!(!text.contains("TRUTH TABLE (5V logic levels)"));
    }

    #[test]
    fn test_display_analysis_matches_display_results() {
        let config = LadderConfig::reference();
        let inputs = InputVoltages::new(3.3, 1.5, 2.0);

        let mut first = Vec::new();
        let analysis = display_analysis(&inputs, &config, &mut first).unwrap();
        let mut second = Vec::new();
        let v_out = display_results(&inputs, &config, &mut second).unwrap();

        assert_eq!(analysis, analyze(&inputs, &config));
        assert_eq!(analysis.output.v_out, v_out);
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), format_report(&analysis));
    }
}
