use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use log::warn;

use jsg_core::config::{self, CONFIG_FILE_NAME, JsgConfig};
use jsg_core::validate::{ValidationReport, validate_document};
use jsg_core::writer::write_schemas;
use jsg_core::{BuildOptions, Document, SchemaDialect, build_all, parse, schema_names};

#[derive(Parser)]
#[command(
    name = "jsg",
    about = "Extract standalone JSON Schemas from OpenAPI 3.x documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate standalone JSON Schema files
    Generate(GenerateArgs),

    /// List the schemas defined under components.schemas
    List {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run the structural OpenAPI 3 pre-check
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize a new jsg configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Path to the OpenAPI document (YAML or JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for `<schema>.json` files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Schema to extract (repeatable)
    #[arg(short, long = "schema", value_name = "NAME")]
    schemas: Vec<String>,

    /// Extract every schema in components.schemas
    #[arg(long, conflicts_with = "schemas")]
    all: bool,

    /// JSON Schema dialect written to `$schema` [draft-04, draft-07, 2019-09, 2020-12]
    #[arg(long)]
    dialect: Option<SchemaDialect>,

    /// Print the schema to stdout instead of writing a file (one schema only)
    #[arg(long)]
    stdout: bool,

    /// Skip the structural pre-check
    #[arg(long)]
    skip_validation: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::List { input } => cmd_list(input),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "jsg", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<JsgConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    Ok(config::load_config(&config_path)?)
}

fn load_document(path: &Path) -> Result<Document> {
    parse::from_path(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Ask a question on stderr and read one line from stdin.
///
/// An empty answer falls back to `default`; end of input with no default
/// is an error.
fn prompt(question: &str, default: Option<&str>) -> Result<String> {
    let mut stderr = io::stderr();
    match default {
        Some(d) => write!(stderr, "{question} [{d}]: ")?,
        None => write!(stderr, "{question}: ")?,
    }
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim();

    match (answer.is_empty(), default) {
        (false, _) => Ok(answer.to_string()),
        (true, Some(d)) => Ok(d.to_string()),
        (true, None) => anyhow::bail!("no answer given for \"{}\"", question),
    }
}

fn report_precheck(input: &Path, report: &ValidationReport) {
    if report.is_valid() {
        return;
    }
    for issue in &report.issues {
        warn!("{}", issue);
    }
    eprintln!(
        "warning: {} does not look like a valid OpenAPI 3 document ({} issue(s)); continuing",
        input.display(),
        report.issues.len()
    );
    for issue in &report.issues {
        eprintln!("  {}", issue);
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();

    // No schema named anywhere: prompt for what is missing.
    let interactive = !args.all && args.schemas.is_empty() && cfg.schemas.is_empty();

    let input = match args.input {
        Some(input) => input,
        None if interactive => {
            PathBuf::from(prompt("OpenAPI file", Some(cfg.input.as_str()))?)
        }
        None => PathBuf::from(&cfg.input),
    };
    let document = load_document(&input)?;

    if cfg.validate && !args.skip_validation {
        report_precheck(&input, &validate_document(&document));
    }

    let names = if args.all {
        schema_names(&document)
    } else if !args.schemas.is_empty() {
        args.schemas
    } else if !cfg.schemas.is_empty() {
        cfg.schemas
    } else {
        vec![prompt("Schema name", None)?]
    };
    if names.is_empty() {
        anyhow::bail!("no schemas found in {}", input.display());
    }

    let options = BuildOptions {
        dialect: args.dialect.unwrap_or(cfg.dialect),
    };

    // Build everything before writing anything.
    let built = build_all(&document, &names, &options)
        .with_context(|| format!("failed to extract schemas from {}", input.display()))?;

    if args.stdout {
        if built.len() != 1 {
            anyhow::bail!(
                "--stdout prints a single schema, but {} were requested; use --output instead",
                built.len()
            );
        }
        for schema in built.values() {
            println!("{}", schema.to_json_pretty()?);
        }
        return Ok(());
    }

    let output_dir = args.output.unwrap_or_else(|| PathBuf::from(&cfg.output));
    let paths = write_schemas(&output_dir, &built)
        .with_context(|| format!("failed to write schemas to {}", output_dir.display()))?;
    for path in &paths {
        eprintln!("  wrote {}", path.display());
    }

    eprintln!(
        "Generated {} schema(s) in {}",
        built.len(),
        output_dir.display()
    );
    Ok(())
}

fn cmd_list(input: PathBuf) -> Result<()> {
    let document = load_document(&input)?;
    let names = schema_names(&document);

    if names.is_empty() {
        eprintln!("No schemas found in {}", input.display());
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let document = load_document(&input)?;
    let report = validate_document(&document);

    if !report.is_valid() {
        for issue in &report.issues {
            eprintln!("  {}", issue);
        }
        anyhow::bail!(
            "{} is not a valid OpenAPI 3 document ({} issue(s))",
            input.display(),
            report.issues.len()
        );
    }

    eprintln!(
        "Valid OpenAPI {} document: {}",
        report.openapi.as_deref().unwrap_or_default(),
        report.title.as_deref().unwrap_or_default()
    );
    eprintln!("  Version: {}", report.version.as_deref().unwrap_or_default());
    eprintln!("  Paths: {}", report.path_count);
    eprintln!("  Schemas: {}", report.schema_count);
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
