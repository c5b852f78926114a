#![forbid(unsafe_code)]

mod logging;

use std::error::Error;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use bumpcheck_config::manifest::{Experiment, MANIFEST_FILE};
use bumpcheck_engine::report::{render_diagnostics_json, render_json, render_text, summary};
use bumpcheck_engine::{ClientRef, ExperimentOptions};
use bumpcheck_maven::{extract_diagnostics, CompilationDiagnostic};
use bumpcheck_pom::{MissingDependencyPolicy, Upgrade};
use bumpcheck_util::maven::{ArtifactKey, MAVEN_CENTRAL};

type CliResult = Result<(), Box<dyn Error>>;

/// Default download cache for coordinate clients, relative to the current directory.
const DEFAULT_CACHE_DIR: &str = "local-repo";

#[derive(Debug, Parser)]
#[command(
    name = "bumpcheck",
    about = "Check whether a Maven client still compiles against a new library version"
)]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild a client against a bumped library version and report compile errors
    Run(RunArgs),
    /// Extract compile errors from a saved Maven log
    Parse {
        /// Log file to read (defaults to stdin)
        file: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check that Maven and Java are available
    Doctor {
        /// Path to the mvn executable
        #[arg(long)]
        maven: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Experiment manifest; flags below override its values
    #[arg(long)]
    experiment: Option<PathBuf>,
    /// Client JAR path or group:artifact:version coordinate
    #[arg(long)]
    client: Option<String>,
    /// Library being bumped, as group:artifact
    #[arg(long)]
    library: Option<String>,
    /// Library version the client was built against
    #[arg(long)]
    from: Option<String>,
    /// Library version to compile the client against
    #[arg(long)]
    to: Option<String>,
    /// Path to the mvn executable (detected when omitted)
    #[arg(long)]
    maven: Option<PathBuf>,
    /// JAVA_HOME for the build
    #[arg(long)]
    java_home: Option<PathBuf>,
    /// Extra argument for mvn, appended after the manifest's (repeatable)
    #[arg(long = "maven-arg", value_name = "ARG", allow_hyphen_values = true)]
    maven_args: Vec<String>,
    /// Remote repository for coordinate clients [default: Maven Central]
    #[arg(long)]
    repository: Option<String>,
    /// Download cache for coordinate clients [default: local-repo]
    #[arg(long)]
    cache: Option<PathBuf>,
    /// Directory to extract the client into [default: ./<jar name>]
    #[arg(long)]
    workdir: Option<PathBuf>,
    /// Delete the working directory before extracting
    #[arg(long)]
    fresh: bool,
    /// Fail if the client does not depend on the library
    #[arg(long)]
    strict: bool,
    /// Save Maven's full output to this file
    #[arg(long)]
    build_log: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => cmd_run(&args),
        Command::Parse { file, format } => cmd_parse(file.as_deref(), format),
        Command::Doctor { maven } => cmd_doctor(maven.as_deref()),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

fn cmd_run(args: &RunArgs) -> CliResult {
    let options = experiment_options(args)?;
    let result = bumpcheck_engine::run_experiment(&options)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&result.diagnostics)),
        OutputFormat::Json => println!("{}", render_json(&result)?),
    }

    eprintln!(
        "    Finished {} in {:.2}s",
        summary(&result.diagnostics, Some(&result.status)),
        result.duration.as_secs_f64()
    );
    Ok(())
}

/// Merge `--experiment` manifest values with command-line flags; flags win.
fn experiment_options(args: &RunArgs) -> Result<ExperimentOptions, Box<dyn Error>> {
    let manifest = args
        .experiment
        .as_deref()
        .map(Experiment::from_path)
        .transpose()?;
    let manifest_dir = args
        .experiment
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let client = match (&args.client, &manifest) {
        (Some(client), _) => ClientRef::parse(client)?,
        (None, Some(m)) => ClientRef::parse(&manifest_relative(manifest_dir.as_deref(), &m.client.artifact))?,
        (None, None) => return Err(missing("--client", "[client] artifact")),
    };

    let library = match (&args.library, &manifest) {
        (Some(library), _) => ArtifactKey::parse(library)?,
        (None, Some(m)) => ArtifactKey::new(&m.library.group, &m.library.artifact),
        (None, None) => return Err(missing("--library", "[library] group/artifact")),
    };
    let from = args
        .from
        .clone()
        .or_else(|| manifest.as_ref().map(|m| m.library.from.clone()))
        .ok_or_else(|| missing("--from", "[library] from"))?;
    let to = args
        .to
        .clone()
        .or_else(|| manifest.as_ref().map(|m| m.library.to.clone()))
        .ok_or_else(|| missing("--to", "[library] to"))?;

    let settings = manifest.map(|m| m.maven).unwrap_or_default();
    let explicit_maven = args.maven.clone().or(settings.executable);
    let maven = bumpcheck_maven::resolve_maven(explicit_maven.as_deref())?;

    let strict = args.strict || settings.strict;
    let mut maven_args = settings.args;
    maven_args.extend(args.maven_args.iter().cloned());

    Ok(ExperimentOptions {
        client,
        upgrade: Upgrade { library, from, to },
        maven,
        java_home: args.java_home.clone().or(settings.java_home),
        maven_args,
        repository: args
            .repository
            .clone()
            .or(settings.repository)
            .unwrap_or_else(|| MAVEN_CENTRAL.to_owned()),
        cache_dir: args
            .cache
            .clone()
            .or(settings.cache)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
        work_dir: args.workdir.clone(),
        fresh: args.fresh,
        policy: if strict {
            MissingDependencyPolicy::Fail
        } else {
            MissingDependencyPolicy::Ignore
        },
        build_log: args.build_log.clone(),
    })
}

/// A client path from a manifest is taken relative to the manifest when it exists there.
fn manifest_relative(manifest_dir: Option<&Path>, artifact: &str) -> String {
    match manifest_dir {
        Some(dir) if !dir.as_os_str().is_empty() && dir.join(artifact).exists() => {
            dir.join(artifact).display().to_string()
        }
        _ => artifact.to_owned(),
    }
}

fn missing(flag: &str, manifest_key: &str) -> Box<dyn Error> {
    format!("missing {flag} — pass it on the command line or set {manifest_key} in {MANIFEST_FILE}").into()
}

fn cmd_parse(file: Option<&Path>, format: OutputFormat) -> CliResult {
    let raw = match file {
        Some(path) => std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let diagnostics = parse_log(&String::from_utf8_lossy(&raw));

    match format {
        OutputFormat::Text => print!("{}", render_text(&diagnostics)),
        OutputFormat::Json => println!("{}", render_diagnostics_json(&diagnostics)?),
    }
    eprintln!("    Found {}", summary(&diagnostics, None));
    Ok(())
}

fn parse_log(text: &str) -> Vec<CompilationDiagnostic> {
    extract_diagnostics(text.lines().map(str::to_owned)).collect()
}

fn cmd_doctor(maven: Option<&Path>) -> CliResult {
    eprintln!("Checking environment...");
    eprintln!();

    let mut issues = 0u32;

    match bumpcheck_maven::detect_maven(maven) {
        Ok(info) => eprintln!("  [ok] Maven: {} ({})", info.version, info.path.display()),
        Err(e) => {
            eprintln!("  [!!] Maven: {e}");
            issues = issues.saturating_add(1);
        }
    }

    match std::env::var_os("JAVA_HOME").map(PathBuf::from) {
        Some(home) if home.join("bin").join("java").exists() => {
            eprintln!("  [ok] JAVA_HOME: {}", home.display());
        }
        Some(home) => {
            eprintln!("  [!!] JAVA_HOME: {} has no bin/java", home.display());
            issues = issues.saturating_add(1);
        }
        None => eprintln!("  [--] JAVA_HOME not set — mvn will use java from PATH"),
    }

    let cwd = std::env::current_dir()?;
    let manifest_path = cwd.join(MANIFEST_FILE);
    if manifest_path.exists() {
        match Experiment::from_path(&manifest_path) {
            Ok(experiment) => eprintln!(
                "  [ok] Experiment: {} with {}:{} {} -> {}",
                experiment.client.artifact,
                experiment.library.group,
                experiment.library.artifact,
                experiment.library.from,
                experiment.library.to
            ),
            Err(e) => {
                eprintln!("  [!!] {MANIFEST_FILE}: {e}");
                issues = issues.saturating_add(1);
            }
        }
    } else {
        eprintln!("  [--] No {MANIFEST_FILE} in current directory");
    }

    eprintln!();
    if issues > 0 {
        eprintln!("{issues} issue(s) found — fix them before running an experiment");
        Err(format!("{issues} issue(s) found").into())
    } else {
        eprintln!("All checks passed");
        Ok(())
    }
}
