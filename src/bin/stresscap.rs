//! stresscap CLI
//!
//! Command-line interface for the stress-scenario borrow capacity solver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use stresscap::cli::config::AnalysisConfig;
use stresscap::engine::evaluator::{evaluate, EvaluationRequest};
use stresscap::engine::solver::{solve, ScenarioDiagnostic};
use stresscap::report::{ScenarioSeverity, SolveReport};

/// stresscap - how much debt can this pool safely back?
#[derive(Parser)]
#[command(name = "stresscap")]
#[command(version = stresscap::VERSION)]
#[command(about = "Stress-scenario borrow capacity solver", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the analysis file
    #[arg(short, long, env = "STRESSCAP_CONFIG", default_value = "stresscap.json")]
    config: PathBuf,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default analysis file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Find the maximum safe borrow and its optimal LTV
    Solve {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include per-position metrics under each scenario
        #[arg(short, long)]
        detailed: bool,
    },

    /// Evaluate the battery at an explicit borrow size and LTV
    Evaluate {
        /// Candidate borrow in debt-asset units
        #[arg(short, long)]
        borrow: f64,

        /// Target LTV for the candidate borrow
        #[arg(short, long)]
        ltv: f64,
    },

    /// List the configured scenario battery
    Scenarios,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let term = Term::stdout();

    if let Err(e) = run_command(&cli, &term) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init { force } => cmd_init(cli, *force, term),
        Commands::Solve { format, detailed } => cmd_solve(cli, *format, *detailed, term),
        Commands::Evaluate { borrow, ltv } => cmd_evaluate(cli, *borrow, *ltv, term),
        Commands::Scenarios => cmd_scenarios(cli, term),
    }
}

fn cmd_init(cli: &Cli, force: bool, term: &Term) -> anyhow::Result<()> {
    if cli.config.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            cli.config.display()
        );
    }

    AnalysisConfig::default().save(&cli.config)?;
    let _ = term.write_line(&format!(
        "{} wrote default analysis to {}",
        style("✓").green(),
        cli.config.display()
    ));
    Ok(())
}

fn load_analysis(cli: &Cli, term: &Term) -> anyhow::Result<AnalysisConfig> {
    let analysis = if cli.config.exists() {
        AnalysisConfig::load(&cli.config)?
    } else {
        let _ = term.write_line(&format!(
            "{} {} not found, using built-in defaults",
            style("ℹ").blue(),
            cli.config.display()
        ));
        AnalysisConfig::default()
    };
    analysis.validate()?;
    Ok(analysis)
}

fn cmd_solve(cli: &Cli, format: OutputFormat, detailed: bool, term: &Term) -> anyhow::Result<()> {
    let analysis = load_analysis(cli, term)?;

    let spinner = create_spinner("Sweeping LTV range...");
    let outcome = solve(&analysis.scenarios, &analysis.solver);
    spinner.finish_and_clear();

    let report = SolveReport::new(outcome?);
    match format {
        OutputFormat::Json => {
            let _ = term.write_line(&report.render_json()?);
        }
        OutputFormat::Text => {
            let _ = term.write_str(&report.render_text(!cli.no_color, detailed));
        }
    }
    Ok(())
}

fn cmd_evaluate(cli: &Cli, borrow: f64, ltv: f64, term: &Term) -> anyhow::Result<()> {
    let analysis = load_analysis(cli, term)?;
    let config = &analysis.solver;

    let request = EvaluationRequest::from_config(config, ltv);

    let _ = term.write_line(&format!(
        "{}",
        style(format!("Battery at borrow {} / LTV {:.2}", borrow, ltv)).bold()
    ));

    for scenario in &analysis.scenarios {
        let outcome = evaluate(&request, borrow, scenario)?;
        let diagnostic = ScenarioDiagnostic {
            scenario_name: scenario.name.clone(),
            warning_only: scenario.warning_only,
            min_health: outcome.min_health,
            metrics: outcome.metrics,
            shocked_external_price: outcome.shocked_external_price,
            resulting_pool: outcome.resulting_pool,
        };
        let severity = ScenarioSeverity::for_diagnostic(&diagnostic);
        let status = if cli.no_color {
            severity.as_str().to_string()
        } else {
            match severity {
                ScenarioSeverity::Pass => style(severity.as_str()).green().to_string(),
                ScenarioSeverity::Warning => style(severity.as_str()).yellow().to_string(),
                ScenarioSeverity::Fail => style(severity.as_str()).red().bold().to_string(),
            }
        };

        let stress_price = diagnostic
            .resulting_pool
            .price_in_external_units(diagnostic.shocked_external_price);
        let _ = term.write_line(&format!(
            "  {:<20} {:<6} min health {:<10} stress price {:.2}",
            diagnostic.scenario_name,
            status,
            format_health(diagnostic.min_health),
            stress_price,
        ));
    }

    Ok(())
}

fn cmd_scenarios(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    let analysis = load_analysis(cli, term)?;

    let _ = term.write_line(&format!(
        "{:<20} {:>12} {:>12} {:>10}",
        "name", "sell", "multiplier", "gating"
    ));
    for scenario in &analysis.scenarios {
        let _ = term.write_line(&format!(
            "{:<20} {:>12} {:>12} {:>10}",
            scenario.name,
            scenario.sell_amount,
            scenario.price_multiplier,
            if scenario.warning_only { "warn-only" } else { "yes" },
        ));
    }
    Ok(())
}

fn format_health(value: f64) -> String {
    if value.is_infinite() {
        "inf".into()
    } else {
        format!("{:.4}", value)
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
