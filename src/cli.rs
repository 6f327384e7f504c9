use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::export::ExportFormat;
use crate::ladder::{InputVoltages, LadderConfig, LogicLevels};
use crate::units::parse_value;

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub mode: Mode,
    pub config: LadderConfig,
    pub levels: LogicLevels,
    pub output_file: Option<String>,
    pub output_format: ExportFormat,
    pub verbose_level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Analyze(InputVoltages),
    TruthTable,
    Demo,
}

pub fn build_cli() -> Command {
    Command::new("r2rdac")
        .version(crate::VERSION)
        .about("Thevenin and load analysis of a 3-bit R2R ladder DAC")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("analyze")
                .about("Analyze one set of input voltages")
                .arg(voltage_arg("v1", 1, "MSB input voltage"))
                .arg(voltage_arg("v2", 2, "Middle input voltage"))
                .arg(voltage_arg("v3", 3, "LSB input voltage")),
        )
        .subcommand(Command::new("table").about("Print the truth table for all eight input codes"))
        .subcommand(Command::new("demo").about("Run the reference example session"))
        .arg(
            Arg::new("resistance")
                .short('r')
                .long("resistance")
                .value_name("R")
                .allow_negative_numbers(true)
                .global(true)
                .help("Base ladder resistance, e.g. 2k [default: 2k]"),
        )
        .arg(
            Arg::new("load")
                .short('l')
                .long("load")
                .value_name("RL")
                .allow_negative_numbers(true)
                .global(true)
                .help("Load resistance, e.g. 16ohm [default: 16]"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("JSON ladder configuration file"),
        )
        .arg(
            Arg::new("high")
                .long("high")
                .value_name("V")
                .default_value("5")
                .allow_negative_numbers(true)
                .global(true)
                .help("Logic HIGH voltage for the truth table"),
        )
        .arg(
            Arg::new("low")
                .long("low")
                .value_name("V")
                .default_value("0")
                .allow_negative_numbers(true)
                .global(true)
                .help("Logic LOW voltage for the truth table"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .global(true)
                .help("Export results to file"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .default_value("csv")
                .value_parser(["csv", "json"])
                .global(true)
                .help("Export format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase verbosity level"),
        )
}

fn voltage_arg(name: &'static str, index: usize, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .allow_negative_numbers(true)
        .index(index)
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let verbose_level = matches.get_count("verbose");

        let output_file = matches.get_one::<String>("output").cloned();

        let output_format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("csv") | None => ExportFormat::Csv,
            Some("json") => ExportFormat::Json,
            Some(other) => return Err(anyhow!("Invalid output format: {}", other)),
        };

        let config = resolve_config(matches)?;

        let levels = LogicLevels::new(
            required_value(matches, "high")?,
            required_value(matches, "low")?,
        );

        let mode = match matches.subcommand() {
            Some(("analyze", sub)) => {
                let v1 = required_value(sub, "v1")?;
                let v2 = required_value(sub, "v2")?;
                let v3 = required_value(sub, "v3")?;
                Mode::Analyze(InputVoltages::new(v1, v2, v3))
            }
            Some(("table", _)) => Mode::TruthTable,
            Some(("demo", _)) => Mode::Demo,
            Some((other, _)) => return Err(anyhow!("Unknown command: {}", other)),
            None => return Err(anyhow!("A command is required: analyze, table or demo")),
        };

        Ok(CliArgs {
            mode,
            config,
            levels,
            output_file,
            output_format,
            verbose_level,
        })
    }
}

/// Reference configuration, then the config file, then explicit flags
fn resolve_config(matches: &ArgMatches) -> Result<LadderConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => LadderConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from '{}'", path))?,
        None => LadderConfig::reference(),
    };

    if let Some(resistance) = value_arg(matches, "resistance")? {
        config = config.with_base_resistance(resistance)?;
    }
    if let Some(load) = value_arg(matches, "load")? {
        config = config.with_load_resistance(load)?;
    }

    Ok(config)
}

fn value_arg(matches: &ArgMatches, name: &str) -> Result<Option<f64>> {
    matches
        .get_one::<String>(name)
        .map(|text| parse_value(text).with_context(|| format!("Invalid --{} value", name)))
        .transpose()
}

fn required_value(matches: &ArgMatches, name: &str) -> Result<f64> {
    let text = matches
        .get_one::<String>(name)
        .ok_or_else(|| anyhow!("Missing argument: {}", name))?;
    parse_value(text).with_context(|| format!("Invalid {} value", name.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        let matches = build_cli().try_get_matches_from(args.iter().copied())?;
        CliArgs::from_matches(&matches)
    }

    #[test]
    fn test_analyze_defaults() {
        let args = parse(&["r2rdac", "analyze", "5", "0V", "5.0"]).unwrap();
        assert_eq!(args.mode, Mode::Analyze(InputVoltages::new(5.0, 0.0, 5.0)));
        assert_eq!(args.config, LadderConfig::reference());
        assert_eq!(args.output_format, ExportFormat::Csv);
        assert!(args.output_file.is_none());
    }

    #[test]
    fn test_negative_voltages_and_overrides() {
        let args = parse(&[
            "r2rdac", "analyze", "-1.5", "2", "3.3", "-r", "4.7k", "--load", "8ohm", "-vv",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::Analyze(InputVoltages::new(-1.5, 2.0, 3.3)));
        assert_eq!(args.config.base_resistance(), 4_700.0);
        assert_eq!(args.config.load_resistance(), 8.0);
        assert_eq!(args.verbose_level, 2);
    }

    #[test]
    fn test_table_levels_and_format() {
        let args = parse(&[
            "r2rdac", "table", "--high", "3.3", "--low", "-0.5", "-o", "out.json", "-f", "json",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::TruthTable);
        assert_eq!(args.levels, LogicLevels::new(3.3, -0.5));
        assert_eq!(args.output_file.as_deref(), Some("out.json"));
        assert_eq!(args.output_format, ExportFormat::Json);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        assert!(parse(&["r2rdac", "table", "-r", "0"]).is_err());
        assert!(parse(&["r2rdac", "demo", "--load", "-16"]).is_err());
        assert!(parse(&["r2rdac", "analyze", "5", "five", "5"]).is_err());
    }

    #[test]
    fn test_config_file_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ladder.json");
        std::fs::write(&path, r#"{ "base_resistance": 1000.0, "load_resistance": 32.0 }"#).unwrap();
        let path = path.to_string_lossy().into_owned();

        let args = parse(&["r2rdac", "demo", "--config", &path]).unwrap();
        assert_eq!(args.config.base_resistance(), 1_000.0);
        assert_eq!(args.config.load_resistance(), 32.0);

        let args = parse(&["r2rdac", "demo", "--config", &path, "-l", "4"]).unwrap();
        assert_eq!(args.config.base_resistance(), 1_000.0);
        assert_eq!(args.config.load_resistance(), 4.0);
    }

    #[test]
    fn test_logic_levels_default_and_reach_demo() {
        let args = parse(&["r2rdac", "table"]).unwrap();
        assert_eq!(args.levels, LogicLevels::default());

        let args = parse(&["r2rdac", "--high", "12", "demo"]).unwrap();
        assert_eq!(args.mode, Mode::Demo);
        assert_eq!(args.levels, LogicLevels::new(12.0, 0.0));

        assert!(parse(&["r2rdac", "table", "--low", "zero"]).is_err());
    }

    #[test]
    fn test_command_is_required() {
        assert!(build_cli().try_get_matches_from(["r2rdac"]).is_err());
    }
}
