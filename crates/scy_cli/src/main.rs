use clap::Parser;

use scy_cli::cli::Cli;
use scy_cli::scenarios::SCENARIOS;
use scy_claims::ClaimResult;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if cli.list {
        cmd_list();
        return;
    }

    if let Err(err) = run_cli(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn cmd_list() {
    println!("available protocols:");
    for scenario in SCENARIOS {
        println!("  {:<12} {}", scenario.name, scenario.description);
    }
}

fn run_cli(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (outcomes, lines) = scy_cli::run(cli)?;

    if outcomes.is_empty() && !lines.is_empty() {
        for line in &lines {
            println!("{line}");
        }
        return Ok(());
    }

    let mut falsified = 0;
    for outcome in &outcomes {
        println!(
            "{}/{}@{}: {}",
            outcome.protocol,
            outcome.role,
            outcome.step,
            scy_cli::describe_result(&outcome.result)
        );
        if matches!(outcome.result, ClaimResult::Falsified(_)) {
            falsified += 1;
        }
    }
    for line in &lines {
        println!("  {line}");
    }

    if falsified > 0 {
        std::process::exit(1);
    }
    Ok(())
}
