use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use env_logger::Env;
use errfix::scenario::{
    Scenario, ScenarioOverrides, ScenarioReport, ScenarioValidator, Strategy, TemplateManager,
    ValidationResult,
};
use log::{info, warn, LevelFilter};
use std::path::PathBuf;
#[derive(Parser, Debug)]
#[command(
    name = "errfix",
    author,
    version,
    about = "Run error-fix scenarios against the errfix retry loop",
    long_about = r#"
errfix - Error Remediation Registry

Scenarios describe a set of named errors, the fixes hooked onto them and a
scripted retry operation. errfix builds a fresh registry for each scenario,
runs the retry loop and reports how the error was resolved.

EXAMPLES:
  errfix run scenarios/*.json            # Run every matching scenario file
  errfix run disk.json --once            # Force a single fix/retry round
  errfix validate disk.json              # Check a scenario without running it
  errfix templates list                  # Show the built-in scenarios
  errfix templates show wrapped          # Print a built-in scenario as JSON
  errfix templates run chain --json      # Run a built-in scenario
  errfix templates run wrapped --initial not_mounted

For more information on any command, use: errfix <command> --help
    "#
)]
struct Opt {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
#[derive(Subcommand, Debug)]
enum Commands {
    Run {
        #[arg(
            value_name = "PATTERN",
            num_args = 1..,
            value_hint = ValueHint::FilePath,
            help = "Scenario file(s) or glob pattern(s) to run"
        )]
        patterns: Vec<String>,
        #[arg(long, help = "Use the single-round strategy regardless of the file")]
        once: bool,
        #[arg(long, help = "Print reports as JSON")]
        json: bool,
    },
    Validate {
        #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    Templates {
        #[command(subcommand)]
        action: TemplatesCommand,
    },
}
#[derive(Subcommand, Debug)]
enum TemplatesCommand {
    List,
    Show { name: String },
    Run {
        name: String,
        #[arg(long)]
        once: bool,
        #[arg(long, value_name = "ERROR", help = "Start from another declared error")]
        initial: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Save {
        name: String,
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },
}
fn main() -> Result<()> {
    let opt = Opt::parse();
    let log_level = match opt.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(
            Env::default().default_filter_or(log_level.to_string()),
        )
        .init();
    match opt.command {
        Commands::Run { patterns, once, json } => {
            handle_run(patterns, once, json)?;
        }
        Commands::Validate { file } => {
            handle_validate(file)?;
        }
        Commands::Templates { action } => {
            handle_templates(action)?;
        }
    }
    Ok(())
}
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern)
            .with_context(|| format!("invalid pattern {:?}", pattern))?
        {
            files.push(entry?);
            matched = true;
        }
        if !matched {
            warn!("pattern {:?} matched no files", pattern);
        }
    }
    Ok(files)
}
fn handle_run(patterns: Vec<String>, once: bool, json: bool) -> Result<()> {
    let files = expand_patterns(&patterns)?;
    if files.is_empty() {
        bail!("no scenario files found");
    }
    for file in files {
        info!("loading scenario {:?}", file);
        let mut scenario = Scenario::load(&file)?;
        if once {
            scenario.strategy = Strategy::TryOnce;
        }
        let report = scenario.run()?;
        print_report(&report, json)?;
    }
    Ok(())
}
fn handle_validate(file: PathBuf) -> Result<()> {
    let scenario = Scenario::load(&file)?;
    let result = ScenarioValidator::new().validate(&scenario);
    print_validation(&scenario.name, &result);
    if !result.is_valid {
        bail!("scenario {:?} is invalid", file);
    }
    Ok(())
}
fn handle_templates(action: TemplatesCommand) -> Result<()> {
    let mut manager = TemplateManager::new();
    manager.load_builtin_templates()?;
    manager.load_custom_templates()?;
    match action {
        TemplatesCommand::List => {
            println!("Scenario templates:");
            println!("===================");
            for template in manager.list_templates() {
                println!("  {:<14} {}", template.name, template.description);
            }
        }
        TemplatesCommand::Show { name } => {
            let template = manager
                .get_template(&name)
                .ok_or_else(|| anyhow::anyhow!("Template '{}' not found", name))?;
            println!("{}", serde_json::to_string_pretty(template)?);
        }
        TemplatesCommand::Run { name, once, initial, json } => {
            let overrides = ScenarioOverrides {
                strategy: once.then_some(Strategy::TryOnce),
                initial,
            };
            let report = manager.create_from_template(&name, &overrides)?.run()?;
            print_report(&report, json)?;
        }
        TemplatesCommand::Save { name, dir } => {
            let template = manager
                .get_template(&name)
                .ok_or_else(|| anyhow::anyhow!("Template '{}' not found", name))?;
            let target = match dir {
                Some(dir) => TemplateManager::with_path(dir),
                None => TemplateManager::new(),
            };
            let path = target.save_custom_template(template)?;
            println!("✓ Saved template '{}' to {}", name, path.display());
        }
    }
    Ok(())
}
fn print_report(report: &ScenarioReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let resolution = &report.resolution;
    println!("Scenario: {} ({:?})", report.scenario, report.strategy);
    println!("  Initial error:    {}", report.initial);
    match &report.final_error {
        Some(name) => println!("  Final error:      {}", name),
        None => println!("  Final error:      none ✓"),
    }
    println!("  Outcome:          {:?}", resolution.outcome);
    println!("  Passes:           {}", resolution.passes);
    println!("  Handlers invoked: {}", resolution.handlers_invoked);
    println!("  Retries:          {}", resolution.retries);
    println!("  Replacements:     {}", resolution.replacements);
    for (index, calls) in report.hook_calls.iter().enumerate() {
        println!("  Hook #{}: called {} time(s)", index, calls);
    }
    println!("");
    Ok(())
}
fn print_validation(name: &str, result: &ValidationResult) {
    if result.is_valid {
        println!("✓ Scenario '{}' is valid", name);
    } else {
        println!("✗ Scenario '{}' has {} error(s)", name, result.errors.len());
    }
    for error in &result.errors {
        println!("  error   {}: {}", error.field, error.message);
        if let Some(suggestion) = &error.suggestion {
            println!("          → {}", suggestion);
        }
    }
    for warning in &result.warnings {
        println!("  warning {}: {}", warning.field, warning.message);
        if let Some(suggestion) = &warning.suggestion {
            println!("          → {}", suggestion);
        }
    }
}
