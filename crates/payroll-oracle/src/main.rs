//! `payroll-parity` - encode batches, run either payroll path, check parity

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use payroll_core::{EmployeeRecord, NativePayrollEngine, PayResult, PayrollComputer, RoundingMode};
use payroll_legacy::{LegacyPayrollComputer, PayrollConfig};
use payroll_oracle::{run_simulator, EquivalenceOracle, SimulatorConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON array of employee records")
}

fn cli() -> Command {
    Command::new("payroll-parity")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bit-exact payroll parity between the legacy batch program and the native engine")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("program")
                .long("program")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Legacy payroll executable"),
        )
        .arg(
            Arg::new("workdir")
                .long("workdir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Working directory for the legacy program"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Legacy program timeout in milliseconds"),
        )
        .arg(
            Arg::new("rounding")
                .long("rounding")
                .global(true)
                .value_parser(["half-even", "half-away-from-zero"])
                .help("Rounding applied when scaling amounts to cents"),
        )
        .subcommand(
            Command::new("encode")
                .about("Print the fixed-width input blob for a batch")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("native")
                .about("Compute a batch with the native engine")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("legacy")
                .about("Compute a batch with the legacy program")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Run both paths over a batch and compare")
                .arg(input_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the parity simulator")
                .arg(
                    Arg::new("batches")
                        .long("batches")
                        .default_value("100")
                        .value_parser(value_parser!(u64))
                        .help("Number of batches to simulate"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("stop-on-violation")
                        .long("stop-on-violation")
                        .action(ArgAction::SetTrue)
                        .help("Stop simulation on first violation"),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Config file if given, then command line overrides
fn load_config(matches: &ArgMatches) -> Result<PayrollConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PayrollConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PayrollConfig::default(),
    };

    if let Some(program) = matches.get_one::<PathBuf>("program") {
        config.legacy = config.legacy.with_program(program);
    }
    if let Some(dir) = matches.get_one::<PathBuf>("workdir") {
        config.legacy = config.legacy.with_working_dir(dir);
    }
    if let Some(ms) = matches.get_one::<u64>("timeout-ms") {
        config.legacy = config.legacy.with_timeout(Duration::from_millis(*ms));
    }
    if let Some(rounding) = matches.get_one::<String>("rounding") {
        let rounding: RoundingMode = rounding.parse().map_err(|e: String| anyhow!(e))?;
        config = config.with_rounding(rounding);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_batch(args: &ArgMatches) -> Result<Vec<EmployeeRecord>> {
    let path = args
        .get_one::<PathBuf>("input")
        .ok_or_else(|| anyhow!("--input is required"))?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing batch {}", path.display()))
}

fn print_results(results: &[PayResult]) {
    println!("EMP-ID,GROSS-PAY,NET-PAY");
    for r in results {
        println!("{},{},{}", r.employee_id, r.gross_pay, r.net_pay);
    }
}

async fn compute(computer: &dyn PayrollComputer, records: &[EmployeeRecord]) -> i32 {
    match computer.compute(records).await {
        Ok(results) => {
            print_results(&results);
            0
        }
        Err(e) => {
            eprintln!("{} payroll failed: {e}", computer.name());
            eprintln!("signature: {}", e.signature());
            1
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<i32> {
    let config = load_config(matches)?;

    let code = match matches.subcommand() {
        Some(("encode", args)) => {
            let records = read_batch(args)?;
            let batch = config.encoder().encode_batch(&records)?;
            print!("{}", batch.blob());
            0
        }
        Some(("native", args)) => {
            let records = read_batch(args)?;
            compute(&NativePayrollEngine::with_encoder(config.encoder()), &records).await
        }
        Some(("legacy", args)) => {
            let records = read_batch(args)?;
            compute(&LegacyPayrollComputer::new(&config), &records).await
        }
        Some(("check", args)) => {
            let records = read_batch(args)?;
            let report = EquivalenceOracle::from_config(&config).check(&records).await;
            if args.get_flag("json") {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.generate_text());
            }
            i32::from(!report.passed())
        }
        Some(("simulate", args)) => {
            let sim = SimulatorConfig {
                seed: *args.get_one::<u64>("seed").unwrap_or(&42),
                total_batches: *args.get_one::<u64>("batches").unwrap_or(&100),
                max_batch_size: config.max_batch_size,
                stop_on_first_violation: args.get_flag("stop-on-violation"),
                ..SimulatorConfig::default()
            };
            let report = run_simulator(&EquivalenceOracle::from_config(&config), sim).await;
            print!("{}", report.generate_text());
            i32::from(!report.passed())
        }
        _ => 2,
    };
    Ok(code)
}

#[tokio::main]
async fn main() {
    init_tracing();
    let matches = cli().get_matches();

    match run(&matches).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
