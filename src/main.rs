//! Command line front end for the SAT/BDD demonstrations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use sat_homework::{
    config::{Backend, CliOverrides, OutputFormat, PigeonholeEncoding, Settings},
    digits::{save_images, Dataset, DigitEncoder},
    sweep::run_sweep,
    utils::{save_report, ColorOutput, ReportFormatter},
    warmup,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sat-homework")]
#[command(about = "SAT and BDD encodings of pigeonhole, river crossing and digit puzzles")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (overrides config)
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Save results to this directory (overrides config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the implication chain, add a conflict, solve under assumptions
    Warmup,

    /// Decide one pigeonhole instance
    Pigeonhole {
        /// Number of pigeons (holes = pigeons - 1)
        #[arg(short = 'n', long)]
        pigeons: Option<usize>,

        #[arg(short, long, value_enum)]
        encoding: Option<EncodingArg>,

        #[arg(short, long, value_enum)]
        backend: Option<BackendArg>,

        /// Report the clauses used by the refutation
        #[arg(long)]
        core: bool,
    },

    /// Plan the goat, wolf and cabbage crossing
    River {
        /// Number of time steps, including the start
        #[arg(short, long)]
        steps: Option<usize>,

        /// Maximum number of plans to enumerate
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Log every generated clause
        #[arg(long)]
        print_cnf: bool,
    },

    /// Time pigeonhole solving over a range of n
    Sweep {
        #[arg(long)]
        min: Option<usize>,

        #[arg(long)]
        max: Option<usize>,

        #[arg(short, long, value_enum)]
        encoding: Option<EncodingArg>,

        #[arg(short, long, value_enum)]
        backend: Option<BackendArg>,
    },

    /// Encode the digit classifier and attempt training
    Digits,

    /// Create a default configuration and sample digit files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum EncodingArg {
    OneHot,
    Binary,
}

impl From<EncodingArg> for PigeonholeEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::OneHot => PigeonholeEncoding::OneHot,
            EncodingArg::Binary => PigeonholeEncoding::Binary,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum BackendArg {
    Sat,
    Bdd,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sat => Backend::Sat,
            BackendArg::Bdd => Backend::Bdd,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    pretty_env_logger::formatted_builder()
        .filter_level(default_level)
        .parse_env("RUST_LOG")
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Setup { directory, force } = &cli.command {
        return setup_command(directory, *force);
    }

    let mut settings = Settings::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let mut overrides = CliOverrides {
        output_dir: cli.output.clone(),
        format: cli.format.map(Into::into),
        ..Default::default()
    };

    match &cli.command {
        Commands::Pigeonhole {
            pigeons,
            encoding,
            backend,
            core,
        } => {
            overrides.pigeons = *pigeons;
            overrides.encoding = encoding.map(Into::into);
            overrides.backend = backend.map(Into::into);
            settings.pigeonhole.extract_core |= *core;
        }
        Commands::River {
            steps,
            max_solutions,
            print_cnf,
        } => {
            overrides.num_steps = *steps;
            overrides.max_solutions = *max_solutions;
            settings.river.print_cnf |= *print_cnf;
        }
        Commands::Sweep {
            min,
            max,
            encoding,
            backend,
        } => {
            overrides.encoding = encoding.map(Into::into);
            overrides.backend = backend.map(Into::into);
            if let Some(min) = min {
                settings.sweep.min_pigeons = *min;
            }
            if let Some(max) = max {
                settings.sweep.max_pigeons = *max;
            }
        }
        Commands::Warmup | Commands::Digits | Commands::Setup { .. } => {}
    }
    settings.merge_with_cli(&overrides);
    settings
        .validate()
        .context("Configuration validation failed")?;
    debug!("Settings: {:?}", settings);

    match cli.command {
        Commands::Warmup => warmup_command(&settings),
        Commands::Pigeonhole { .. } => pigeonhole_command(&settings),
        Commands::River { .. } => river_command(&settings),
        Commands::Sweep { .. } => sweep_command(&settings),
        Commands::Digits => digits_command(&settings),
        Commands::Setup { .. } => Ok(()),
    }
}

/// Print where a report went when saving is enabled
fn maybe_save<T: serde::Serialize>(
    settings: &Settings,
    value: &T,
    text: &str,
    stem: &str,
) -> Result<()> {
    if !settings.output.save {
        return Ok(());
    }
    let path = save_report(
        value,
        text,
        &settings.output.output_directory,
        stem,
        settings.output.format,
    )
    .context("Failed to save results")?;
    println!("{}", ColorOutput::success(&format!("Saved {}", path.display())));
    Ok(())
}

fn warmup_command(settings: &Settings) -> Result<()> {
    println!("{}", ColorOutput::info("Warm-up: implication chain"));
    let report = warmup::run()?;
    let text = report.to_string();
    println!("{}", text);
    maybe_save(settings, &report, &text, "warmup")
}

fn pigeonhole_command(settings: &Settings) -> Result<()> {
    let report = sat_homework::solve_pigeonhole(settings)?;
    let text = report.to_string();
    println!("{}", text);

    if report.satisfiable {
        println!("{}", ColorOutput::error("Unexpected: pigeonhole formula is satisfiable"));
    } else {
        println!("{}", ColorOutput::success("Refuted: more pigeons than holes"));
    }
    maybe_save(settings, &report, &text, "pigeonhole")
}

fn river_command(settings: &Settings) -> Result<()> {
    println!(
        "{}",
        ColorOutput::info(&format!(
            "Planning the crossing over {} steps",
            settings.river.num_steps
        ))
    );
    let report = sat_homework::solve_river(settings)?;
    let text = ReportFormatter::format_river_report(&report);
    println!("{}", text);

    if !report.satisfiable() {
        println!("{}", ColorOutput::warning("No plan found, try more steps"));
    } else if report.solutions.iter().all(|s| s.report.is_solution()) {
        println!("{}", ColorOutput::success("Every plan passed the independent check"));
    } else {
        println!("{}", ColorOutput::error("A decoded plan failed the independent check"));
    }
    maybe_save(settings, &report, &text, "river")
}

fn sweep_command(settings: &Settings) -> Result<()> {
    let series = run_sweep(&settings.sweep)?;
    let text = ReportFormatter::format_sweep_table(&series);
    println!("{}", text);
    maybe_save(settings, &series, &text, "sweep")
}

fn digits_command(settings: &Settings) -> Result<()> {
    let config = &settings.digits;
    let dataset = Dataset::load(&config.zeros_file, &config.ones_file)
        .context("Failed to load digit images")?;
    let encoder = DigitEncoder::new(&dataset, config.state_bits)?;
    let (height, width) = encoder.shape();
    println!(
        "{}",
        ColorOutput::info(&format!(
            "{} zeros and {} ones, {}x{} pixels, {} variables",
            dataset.zeros.len(),
            dataset.ones.len(),
            height,
            width,
            encoder.variables().variable_count()
        ))
    );

    match encoder.train() {
        Ok(Some(parameters)) => {
            println!(
                "{}",
                ColorOutput::success(&format!(
                    "Learned init constant: {}",
                    parameters.init_constant
                ))
            );
            Ok(())
        }
        Ok(None) => {
            println!("{}", ColorOutput::warning("No classifier fits the training set"));
            Ok(())
        }
        Err(err) => {
            println!("{}", ColorOutput::error(&format!("Training stopped: {}", err)));
            Err(err)
        }
    }
}

const SAMPLE_ZEROS: &str = "\
00111100
01100110
01000010
11000011
11000011
01000010
01100110
00111100
";

const SAMPLE_ONES: &str = "\
00011000
00111000
01011000
00011000
00011000
00011000
00011000
01111110
";

fn setup_command(directory: &Path, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let digits_dir = directory.join("input/digits");
    for dir in [&config_dir, &digits_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let defaults = Settings::default().digits;
    for (file, content) in [
        (&defaults.zeros_file, SAMPLE_ZEROS),
        (&defaults.ones_file, SAMPLE_ONES),
    ] {
        let path = directory.join(file);
        if path.exists() && !force {
            println!("Skipped: {} (already exists)", path.display());
            continue;
        }
        let images = sat_homework::digits::parse_images(content)?;
        save_images(&images, &path)?;
        println!("Created: {}", path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit {}", config_path.display());
    println!("2. Run: cargo run -- river --steps 8");

    Ok(())
}
