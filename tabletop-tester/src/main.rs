mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;
use tabletop_core::{
    CatalogQuery, ScenarioDocument, ScenarioLoader, SessionPolicy, StaticScenarioLoader,
};

use common::{parse_roles, split_csv};
use logic::{FileReport, PlaythroughPlan, PlaythroughTester, ScenarioResult, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "tabletop-tester", version)]
#[command(about = "Headless QA for tabletop exercise scenarios - import validation and scripted playthroughs")]
struct Args {
    /// List the built-in scenario catalog and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Scenario JSON files to run through the import pipeline (comma-separated)
    #[arg(long, value_delimiter = ',')]
    validate: Vec<PathBuf>,

    /// Only validate files; skip playthroughs
    #[arg(long)]
    validate_only: bool,

    /// Scenario ids to play (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// Player strategies (comma-separated)
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = Strategy::ALL)]
    strategies: Vec<Strategy>,

    /// Roles to select (comma-separated names or "all")
    #[arg(long, default_value = "all")]
    roles: String,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Playthroughs per strategy and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Session policy JSON overriding the defaults
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let builtins = StaticScenarioLoader
        .load_scenarios()
        .context("built-in scenarios failed to load")?;

    if args.list_scenarios {
        return list_scenarios(&args, builtins);
    }

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let start_time = Instant::now();
    let policy = load_policy(args.policy.as_ref())?;
    let files = logic::validate_files(&args.validate)?;

    let results = if args.validate_only {
        Vec::new()
    } else {
        run_playthroughs(&args, &policy, builtins, &files)?
    };

    write_reports(&args, &files, &results, start_time)?;

    if files.iter().any(|f| !f.accepted) || results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🛡️  Tabletop Scenario Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn list_scenarios(args: &Args, builtins: Vec<ScenarioDocument>) -> Result<()> {
    let registry = tabletop_core::ScenarioRegistry::with_documents(builtins);
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for scenario in registry.query(&CatalogQuery::default()) {
        writeln!(
            output_target.writer(),
            "  {:25} - {} [{}, {} injects]",
            scenario.id(),
            scenario.meta.title,
            scenario.meta.difficulty,
            scenario.injects.len()
        )?;
    }
    output_target.flush_inner()?;
    Ok(())
}

fn load_policy(path: Option<&PathBuf>) -> Result<SessionPolicy> {
    let Some(path) = path else {
        return Ok(SessionPolicy::default_config());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy {}", path.display()))?;
    let policy = SessionPolicy::from_json(&json)
        .with_context(|| format!("failed to parse policy {}", path.display()))?;
    policy
        .validate()
        .with_context(|| format!("invalid policy {}", path.display()))?;
    log::info!("using session policy from {}", path.display());
    Ok(policy)
}

fn select_documents(
    scenarios_arg: &str,
    builtins: Vec<ScenarioDocument>,
    files: &[FileReport],
) -> Result<Vec<ScenarioDocument>> {
    let mut registry = tabletop_core::ScenarioRegistry::with_documents(builtins);
    for document in files.iter().filter_map(|f| f.document.clone()) {
        registry.register(document);
    }

    let wanted = split_csv(scenarios_arg);
    if wanted.iter().any(|w| w == "all") {
        return Ok(registry.entries().map(|e| e.document.clone()).collect());
    }
    wanted
        .iter()
        .map(|id| {
            registry
                .document(id)
                .cloned()
                .with_context(|| format!("unknown scenario '{id}'"))
        })
        .collect()
}

fn run_playthroughs(
    args: &Args,
    policy: &SessionPolicy,
    builtins: Vec<ScenarioDocument>,
    files: &[FileReport],
) -> Result<Vec<ScenarioResult>> {
    let documents = select_documents(&args.scenarios, builtins, files)?;
    let roles = parse_roles(&args.roles)?;
    let seeds = split_csv(&args.seeds)
        .iter()
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid seed '{s}'")))
        .collect::<Result<Vec<_>>>()?;

    if args.report == ReportFormat::Console && args.output.is_none() {
        println!("{}", "🎲 Running Playthroughs".bright_yellow().bold());
        println!("{}", "-".repeat(30).yellow());
    }

    let tester = PlaythroughTester::new(policy.clone(), args.verbose);
    let mut results = Vec::new();
    for document in documents {
        for &strategy in &args.strategies {
            let plan = PlaythroughPlan {
                document: document.clone(),
                roles: roles.clone(),
                strategy,
            };
            results.extend(tester.run_plan(&plan, &seeds, args.iterations));
        }
    }
    Ok(results)
}

fn write_reports(
    args: &Args,
    files: &[FileReport],
    results: &[ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, files, results)?;
        }
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, files, results)?;
        }
        ReportFormat::Console => {
            if files.is_empty() && results.is_empty() {
                writeln!(&mut output_target, "Nothing to report.")?;
            }
            logic::reports::generate_console_report(
                &mut output_target,
                files,
                results,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
