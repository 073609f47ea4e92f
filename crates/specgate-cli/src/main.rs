use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use specgate_checks::quality::Dimension;
use specgate_checks::{AlignmentValidator, ImprovementAnalyzer, TraceabilityValidator};
use specgate_core::{Orchestrator, OrchestratorError, TaskRecord, ValidationConfig, ValidatorKind};
use specgate_document::{Document, DocumentError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXIT_FAIL: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;

/// Issues shown per failed validator in the console summary
const SUMMARY_ISSUES: usize = 3;

/// File written next to the document by `validate --summary`
const SUMMARY_FILE: &str = "validation-summary.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Console,
    Json,
    Markdown,
}

impl Format {
    fn from_args(args: &ArgMatches) -> Self {
        match args.get_one::<String>("format").map(String::as_str) {
            Some("json") => Self::Json,
            Some("markdown") => Self::Markdown,
            _ => Self::Console,
        }
    }
}

fn path_arg(help: &'static str) -> Arg {
    Arg::new("path")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .default_value("console")
        .value_parser(["console", "json", "markdown"])
        .help("Output format")
}

fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as failures")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Config file (default: specgate.toml beside the document)")
}

fn list_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_delimiter(',')
        .action(ArgAction::Append)
        .help(help)
}

fn cli() -> Command {
    let spec_command = |name: &'static str, about: &'static str| {
        Command::new(name)
            .about(about)
            .arg(path_arg("Specification markdown file"))
            .arg(format_arg())
            .arg(strict_arg())
            .arg(config_arg())
    };

    Command::new("specgate")
        .version(specgate_core::VERSION)
        .about("Quality, traceability and alignment checks for markdown specifications")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            spec_command("validate", "Run every validator and report one verdict")
                .arg(list_arg(
                    "only",
                    "Run only these validators (structure,links,quality,traceability,alignment)",
                ))
                .arg(list_arg("skip", "Skip these validators"))
                .arg(list_arg("dimensions", "Quality dimensions to score"))
                .arg(
                    Arg::new("stop-on-failure")
                        .long("stop-on-failure")
                        .action(ArgAction::SetTrue)
                        .help("Stop at the first critical failure"),
                )
                .arg(
                    Arg::new("no-suggestions")
                        .long("no-suggestions")
                        .action(ArgAction::SetTrue)
                        .help("Do not run the improvement analyzer on failure"),
                )
                .arg(
                    Arg::new("summary")
                        .long("summary")
                        .action(ArgAction::SetTrue)
                        .help("Write validation-summary.txt next to the document"),
                ),
        )
        .subcommand(
            spec_command("structure", "Check required sections, hierarchy and placeholders").arg(
                Arg::new("check-links")
                    .long("check-links")
                    .action(ArgAction::SetTrue)
                    .help("Also resolve internal anchor links"),
            ),
        )
        .subcommand(spec_command("links", "Check anchors, relative files and reference links"))
        .subcommand(
            spec_command("score", "Score the four quality dimensions")
                .arg(list_arg("dimensions", "Quality dimensions to score")),
        )
        .subcommand(spec_command("trace", "Build the requirements traceability matrix"))
        .subcommand(
            Command::new("align")
                .about("Check a project's spec, roadmap and phase plans agree")
                .arg(path_arg("Project directory"))
                .arg(format_arg())
                .arg(strict_arg()),
        )
        .subcommand(
            Command::new("suggest")
                .about("Suggest prioritized improvements")
                .arg(path_arg("Specification markdown file"))
                .arg(format_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the markdown report to this file"),
                ),
        )
}

fn main() -> ExitCode {
    init_tracing();
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_FAIL),
        Err(e) => {
            eprintln!("error: {e:#}");
            if is_not_found(&e) {
                ExitCode::from(EXIT_NOT_FOUND)
            } else {
                ExitCode::from(EXIT_FAIL)
            }
        }
    }
}

/// Logs go to stderr so reports on stdout stay machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<DocumentError>()
            .is_some_and(DocumentError::is_not_found)
            || cause
                .downcast_ref::<OrchestratorError>()
                .is_some_and(OrchestratorError::is_not_found)
    })
}

/// Dispatch a subcommand; `Ok(false)` means the checks failed
fn run(matches: &ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("validate", args)) => validate(args),
        Some(("structure", args)) => single(args, ValidatorKind::Structure),
        Some(("links", args)) => single(args, ValidatorKind::Links),
        Some(("score", args)) => score(args),
        Some(("trace", args)) => trace(args),
        Some(("align", args)) => align(args),
        Some(("suggest", args)) => suggest(args),
        _ => bail!("no command given"),
    }
}

fn target(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("path")
        .map(PathBuf::as_path)
        .context("missing target path")
}

fn load_config(args: &ArgMatches, path: &Path) -> Result<ValidationConfig> {
    let explicit = args.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let config = ValidationConfig::for_document(path, explicit)?;
    let strict = config.strict || args.get_flag("strict");
    Ok(config.with_strict(strict))
}

fn validator_list(args: &ArgMatches, name: &str) -> Result<Option<Vec<ValidatorKind>>> {
    args.get_many::<String>(name)
        .map(|names| names.map(|n| n.parse()).collect::<Result<Vec<ValidatorKind>, _>>())
        .transpose()
        .map_err(Into::into)
}

fn dimension_list(args: &ArgMatches) -> Result<Option<Vec<Dimension>>> {
    args.get_many::<String>("dimensions")
        .map(|names| names.map(|n| n.parse()).collect::<Result<Vec<Dimension>, _>>())
        .transpose()
        .map_err(Into::into)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validate(args: &ArgMatches) -> Result<bool> {
    let path = target(args)?;
    let mut config = load_config(args, path)?
        .with_stop_on_first_critical(args.get_flag("stop-on-failure"));
    if args.get_flag("no-suggestions") {
        config = config.with_suggestions(false);
    }
    if let Some(only) = validator_list(args, "only")? {
        config = config.with_only(&only);
    }
    if let Some(skip) = validator_list(args, "skip")? {
        config = config.with_skip(skip);
    }
    if let Some(dimensions) = dimension_list(args)? {
        config = config.with_dimensions(dimensions);
    }

    let report = Orchestrator::new(config).run_path(path)?;

    match Format::from_args(args) {
        Format::Console => {
            print!("{}", report.render_console());
            if !report.passed() {
                eprint!("{}", report.failure_summary(SUMMARY_ISSUES));
            }
        }
        Format::Json => print_json(&report)?,
        Format::Markdown => print!("{}", report.render_markdown()),
    }

    if args.get_flag("summary") {
        let summary_path = path.parent().unwrap_or(Path::new(".")).join(SUMMARY_FILE);
        match std::fs::write(&summary_path, report.summary_text()) {
            Ok(()) => tracing::info!(path = %summary_path.display(), "summary written"),
            Err(e) => {
                tracing::warn!(path = %summary_path.display(), error = %e, "could not write summary");
            }
        }
    }

    Ok(report.passed())
}

/// Structure or links on their own
fn single(args: &ArgMatches, kind: ValidatorKind) -> Result<bool> {
    let path = target(args)?;
    let mut config = load_config(args, path)?;
    if args.try_get_one::<bool>("check-links").ok().flatten() == Some(&true) {
        config.check_links_in_structure = true;
    }
    let doc = Document::load(path)?;
    let record = Orchestrator::new(config).run_validator(kind, &doc);

    match Format::from_args(args) {
        Format::Console => {
            println!("{}: {}", record.name, record.status);
            print!("{}", record.output);
        }
        Format::Json => print_json(&record)?,
        Format::Markdown => print!("{}", record_markdown(&record)),
    }
    Ok(record.passed())
}

fn record_markdown(record: &TaskRecord) -> String {
    let mut out = format!("# {}\n\n**Status**: {}\n\n", record.name, record.status);
    if record.issues.is_empty() {
        out.push_str("No issues found.\n");
    }
    for issue in record.issues.iter() {
        out.push_str(&format!("- {issue}\n"));
    }
    out
}

fn score(args: &ArgMatches) -> Result<bool> {
    let path = target(args)?;
    let mut config = load_config(args, path)?;
    if let Some(dimensions) = dimension_list(args)? {
        config = config.with_dimensions(dimensions);
    }
    let doc = Document::load(path)?;
    let report = config.quality_scorer()?.score(&doc)?;

    match Format::from_args(args) {
        Format::Console => print!("{}", report.render_console()),
        Format::Json => println!("{}", report.to_json()?),
        Format::Markdown => print!("{}", report.render_markdown()),
    }
    Ok(report.is_ready())
}

fn trace(args: &ArgMatches) -> Result<bool> {
    let path = target(args)?;
    let config = load_config(args, path)?;
    let doc = Document::load(path)?;
    let report = TraceabilityValidator::new(config.trace_options()).validate(&doc);

    match Format::from_args(args) {
        Format::Console => print!("{}", report.render_console()),
        Format::Json => print_json(&report)?,
        Format::Markdown => print!("{}", report.render_markdown()),
    }
    Ok(report.passes(config.strict))
}

fn align(args: &ArgMatches) -> Result<bool> {
    let root = target(args)?;
    if !root.exists() {
        return Err(DocumentError::NotFound {
            path: root.to_path_buf(),
        }
        .into());
    }
    let record = AlignmentValidator::new().validate(root)?;

    match Format::from_args(args) {
        Format::Console => print!("{}", record.render_console()),
        Format::Json => print_json(&record)?,
        Format::Markdown => print!("{}", record.render_markdown()),
    }
    Ok(record.passes(args.get_flag("strict")))
}

fn suggest(args: &ArgMatches) -> Result<bool> {
    let path = target(args)?;
    let doc = Document::load(path)?;
    let report = ImprovementAnalyzer::new().analyze(&doc);

    match Format::from_args(args) {
        Format::Console => print!("{}", report.render_console()),
        Format::Json => print_json(&report)?,
        Format::Markdown => print!("{}", report.render_markdown()),
    }
    if let Some(output) = args.get_one::<PathBuf>("output") {
        std::fs::write(output, report.render_markdown())
            .with_context(|| format!("could not write {}", output.display()))?;
    }
    Ok(true)
}
