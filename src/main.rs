use std::io::{self, Write};

use colored::*;
use log::{error, info, warn};

use r2rdac::cli::{build_cli, CliArgs, Mode};
use r2rdac::export::{export_analysis, export_truth_table};
use r2rdac::ladder::full_scale_output;
use r2rdac::report::{display_analysis, display_truth_table, write_demo_session};

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    if let Err(e) = run_application(&matches) {
        error!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn init_logging(verbose_level: u8) {
    let default_level = match verbose_level {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_application(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let args = CliArgs::from_matches(matches)?;

    info!("{}", "Starting r2rdac - R2R ladder DAC calculator".green().bold());
    info!(
        "Ladder: R = {} Ω, load = {} Ω",
        args.config.base_resistance(),
        args.config.load_resistance()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.mode {
        Mode::Analyze(inputs) => {
            let analysis = display_analysis(&inputs, &args.config, &mut out)?;

            if let Some(output_file) = &args.output_file {
                export_analysis(&analysis, output_file, args.output_format)?;
                info!("Results exported to: {}", output_file.bright_green());
            }
        }
        Mode::TruthTable => {
            info!("Logic levels: HIGH = {} V, LOW = {} V", args.levels.high, args.levels.low);
            let rows = display_truth_table(&args.config, args.levels, &mut out)?;

            let full_scale = full_scale_output(&args.config, args.levels);
            info!("Full-scale output: {:.6} V", full_scale.v_out);

            if let Some(output_file) = &args.output_file {
                export_truth_table(&rows, output_file, args.output_format)?;
                info!("Results exported to: {}", output_file.bright_green());
            }
        }
        Mode::Demo => {
            if args.output_file.is_some() {
                warn!("--output is ignored in demo mode");
            }
            write_demo_session(&args.config, args.levels, &mut out)?;
        }
    }

    out.flush()?;
    info!("{}", "Analysis completed successfully!".green().bold());
    Ok(())
}
