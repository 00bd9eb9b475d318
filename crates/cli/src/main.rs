// posture CLI - compare compliance templates against tenant snapshots

mod exit_codes;

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use posture_cli::report::{render_csv, render_text};
use posture_recon::catalog::StandardMetadata;
use posture_recon::engine::{parse_snapshots, parse_templates};
use posture_recon::{Catalog, CompareConfig, ReconError, StandardId};

use exit_codes::{
    EXIT_INPUT_PARSE, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_NON_COMPLIANT, EXIT_SUCCESS, EXIT_USAGE,
    EXIT_TEMPLATE_NOT_FOUND,
};

#[derive(Parser)]
#[command(name = "posture")]
#[command(about = "Compare compliance templates against tenant configuration snapshots")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log per-standard decisions to stderr (overrides POSTURE_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare one template against one tenant's snapshot
    #[command(after_help = "\
Examples:
  posture compare --templates templates.json --template-id 7d3c... \\
      --snapshots snapshots.json --tenant contoso.onmicrosoft.com
  posture compare ... --format json --output report.json
  posture compare ... --strict   # exit 1 when anything is non-compliant")]
    Compare(CompareArgs),

    /// Show catalog metadata for one standard
    Lookup {
        /// Full id (standards.AuditLog) or bare key (AuditLog)
        standard: String,

        /// Standards catalog (JSON array)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file (TOML)
        #[arg(long, env = "POSTURE_CONFIG")]
        config: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a config file
    ValidateConfig {
        /// Config file (TOML)
        file: PathBuf,
    },
}

#[derive(Args)]
struct CompareArgs {
    /// Template list (JSON array or single object); `-` reads stdin
    #[arg(long)]
    templates: PathBuf,

    /// GUID of the template to compare
    #[arg(long)]
    template_id: String,

    /// Tenant snapshot list (JSON array or single object); `-` reads stdin
    #[arg(long)]
    snapshots: PathBuf,

    /// Tenant to compare (matched exactly against tenantFilter)
    #[arg(long)]
    tenant: String,

    /// Standards catalog (JSON array). Without it every standard gets fallback metadata.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long, env = "POSTURE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Exit 1 on non-compliant standards, 6 on an unknown template id
    #[arg(long)]
    strict: bool,

    /// Suppress the summary line on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  posture-recon ", env!("CARGO_PKG_VERSION"),
    )
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Exit code without a message (the report already said it).
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    pub fn recon(err: ReconError) -> Self {
        match &err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => Self {
                code: EXIT_INVALID_CONFIG,
                message: err.to_string(),
                hint: Some("run `posture validate-config <file>` for details".to_string()),
            },
            ReconError::InputParse { .. } => Self {
                code: EXIT_INPUT_PARSE,
                message: err.to_string(),
                hint: Some("expected a JSON array, or a single JSON object".to_string()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare(args) => cmd_compare(args),
        Commands::Lookup { standard, catalog, config, json } => {
            cmd_lookup(standard, catalog, config, json)
        }
        Commands::ValidateConfig { file } => cmd_validate_config(file),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Engine logs go through `log`; the fmt subscriber picks them up via its
/// log bridge. Default level is warn, `POSTURE_LOG` takes EnvFilter syntax.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("POSTURE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed; keep it.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init()
        .ok();
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    if is_stdin(&args.templates) && is_stdin(&args.snapshots) {
        return Err(CliError::usage("only one of --templates/--snapshots can read stdin"));
    }

    let config = load_config(args.config.as_deref())?;
    let catalog = load_catalog(args.catalog.as_deref(), &config)?;
    let templates = parse_templates(&read_input(&args.templates)?).map_err(CliError::recon)?;
    let snapshots = parse_snapshots(&read_input(&args.snapshots)?).map_err(CliError::recon)?;

    log::info!(
        "{} template(s), {} snapshot(s), {} catalog entries",
        templates.len(),
        snapshots.len(),
        catalog.len()
    );

    let report = posture_recon::compare(
        &config,
        &catalog,
        &templates,
        &args.template_id,
        &snapshots,
        &args.tenant,
    );

    let rendered = match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::io(format!("cannot serialize report: {e}")))?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => render_csv(&report)
            .map_err(|e| CliError::io(format!("cannot write CSV: {e}")))?,
    };
    write_output(args.output.as_deref(), &rendered)?;

    if !args.quiet {
        let s = &report.summary;
        eprintln!(
            "{}: {} compliant, {} non-compliant, {} unconfigured of {}",
            report.meta.tenant, s.compliant, s.non_compliant, s.unconfigured, s.total
        );
    }

    if args.strict {
        if report.meta.template_name.is_none() {
            return Err(CliError {
                code: EXIT_TEMPLATE_NOT_FOUND,
                message: format!("template '{}' not found", args.template_id),
                hint: Some("template ids are matched against the GUID field".to_string()),
            });
        }
        if report.summary.non_compliant > 0 {
            return Err(CliError::silent(EXIT_NON_COMPLIANT));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupOutput<'a> {
    standard_id: &'a StandardId,
    #[serde(flatten)]
    metadata: &'a StandardMetadata,
}

fn cmd_lookup(
    standard: String,
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let standard = standard.trim();
    if standard.is_empty() {
        return Err(CliError::usage("standard id must not be empty"));
    }

    let config = load_config(config.as_deref())?;
    let catalog = load_catalog(catalog.as_deref(), &config)?;

    let id = if standard.starts_with(config.standard_prefix.as_str()) {
        StandardId::parse(&config.standard_prefix, standard)
    } else {
        StandardId::from_key(&config.standard_prefix, standard)
    };
    let metadata = catalog.lookup(&id);

    if json {
        let out = LookupOutput { standard_id: &id, metadata: &metadata };
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::io(format!("cannot serialize metadata: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    println!("{}{}", id, if metadata.known { "" } else { " (not in catalog)" });
    println!("  name:    {}", metadata.display_name);
    println!("  impact:  {}", metadata.impact_label);
    if !metadata.description.is_empty() {
        println!("  about:   {}", metadata.description);
    }
    if !metadata.compliance_details.is_empty() && metadata.compliance_details != metadata.description {
        println!("  details: {}", metadata.compliance_details);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate-config
// ---------------------------------------------------------------------------

fn cmd_validate_config(file: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&file))?;
    println!("ok: {}", file.display());
    println!("  standard_prefix        = {:?}", config.standard_prefix);
    println!("  default_template_name  = {:?}", config.default_template_name);
    println!("  catalog.default_impact = {:?}", config.catalog.default_impact);
    println!("  catalog.default_impact_colour = {:?}", config.catalog.default_impact_colour);
    Ok(())
}

// ---------------------------------------------------------------------------
// IO helpers
// ---------------------------------------------------------------------------

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if is_stdin(path) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
        return Ok(buf);
    }
    fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> Result<CompareConfig, CliError> {
    match path {
        Some(path) => {
            let text = read_input(path)?;
            CompareConfig::from_toml(&text).map_err(|e| {
                let mut err = CliError::recon(e);
                err.message = format!("{}: {}", path.display(), err.message);
                err
            })
        }
        None => Ok(CompareConfig::default()),
    }
}

fn load_catalog(path: Option<&Path>, config: &CompareConfig) -> Result<Catalog, CliError> {
    match path {
        Some(path) => {
            let text = read_input(path)?;
            Catalog::from_json(&text, config.catalog.clone()).map_err(CliError::recon)
        }
        None => {
            log::debug!("no catalog given, using fallback metadata");
            Ok(Catalog::empty(config.catalog.clone()))
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| CliError::io(format!("cannot write stdout: {e}")))?;
        }
    }
    Ok(())
}
