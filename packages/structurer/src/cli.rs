//! Command-line interface for the structurer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_document_code, DEFAULT_DOCUMENT_TYPE};
use crate::doctype::{create_default_registry, DocumentTypeRegistry};
use crate::error::{Result, StructurerError};
use crate::output::{save_output, DocumentOutput, OutputFormat};
use crate::pipeline::{process_document, AlternateInputs};
use crate::types::LayoutDocument;

/// Directory used when `--output` is not given.
pub const DEFAULT_OUTPUT_DIR: &str = "structured";

/// RegelRecht Structurer - Rebuild legal document structure from layout lines.
#[derive(Parser)]
#[command(name = "regelrecht-structurer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Structure a layout document and write structure, content and quality files.
    Process {
        /// Layout document as JSON ({"lines": [...], "outline": [...]})
        input: PathBuf,

        /// Document type code (e.g., LAW, RULES)
        #[arg(short = 't', long, default_value = DEFAULT_DOCUMENT_TYPE)]
        doc_type: String,

        /// YAML file with extra or overriding document types
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Second layout extraction of the same document, as JSON
        #[arg(long)]
        alternate_layout: Option<PathBuf>,

        /// Plain-text rendering of the same document
        #[arg(long)]
        plain_text: Option<PathBuf>,

        /// Output directory (default: structured/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// List the registered document types.
    Types {
        /// YAML file with extra or overriding document types
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            doc_type,
            config,
            alternate_layout,
            plain_text,
            output,
            format,
        } => process_command(
            &input,
            &doc_type,
            config.as_deref(),
            alternate_layout.as_deref(),
            plain_text.as_deref(),
            output.as_deref(),
            format,
        ),
        Commands::Types { config } => types_command(config.as_deref()),
    }
}

fn load_registry(config: Option<&Path>) -> Result<DocumentTypeRegistry> {
    let mut registry = create_default_registry()?;
    if let Some(path) = config {
        registry.load_yaml_file(path)?;
    }
    Ok(registry)
}

fn read_layout(path: &Path) -> Result<LayoutDocument> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StructurerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file does not exist: {}", path.display()),
        )))
    }
}

/// Execute the process command.
fn process_command(
    input: &Path,
    doc_type: &str,
    config: Option<&Path>,
    alternate_layout: Option<&Path>,
    plain_text: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    // Validate everything before touching the pipeline
    validate_document_code(doc_type)?;
    require_file(input)?;
    for path in alternate_layout.iter().chain(plain_text.iter()) {
        require_file(path)?;
    }
    let registry = load_registry(config)?;
    let spec = registry.get(doc_type)?;
    let output_dir = output.unwrap_or(Path::new(DEFAULT_OUTPUT_DIR));

    println!(
        "{} {} as {}",
        style("Structuring").bold(),
        style(input.display()).cyan(),
        style(doc_type).green()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Reading layout...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let loaded = read_layout(input).and_then(|document| {
        let alternates = AlternateInputs {
            alternate_layout: alternate_layout
                .map(read_layout)
                .transpose()?
                .map(|d| d.lines),
            plain_text: plain_text.map(fs::read_to_string).transpose()?,
        };
        Ok((document, alternates))
    });
    let (document, alternates) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Rebuilding structure...");
    let structured = match process_document(spec, &document, &alternates) {
        Ok(structured) => structured,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving output...");
    let paths = match save_output(&DocumentOutput::from_document(&structured), output_dir, format) {
        Ok(paths) => paths,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Divisions: {}", structured.tree.len());
    println!("  Units: {}", structured.units.len());
    println!(
        "  Quality: {} ok, {} corrected",
        structured.summary.ok, structured.summary.corrected
    );
    if structured.placeholder_count() > 0 {
        println!(
            "  Placeholders: {}",
            style(structured.placeholder_count()).yellow()
        );
    }
    if !structured.possible_parse_errors.is_empty() {
        println!(
            "  Possible parse errors: {}",
            style(structured.possible_parse_errors.len()).yellow()
        );
    }
    let unresolved = structured.unresolved_count();
    if unresolved > 0 {
        println!(
            "  {} {} unit(s) need manual review",
            style("Warning:").yellow().bold(),
            style(unresolved).yellow().bold()
        );
    }

    println!();
    println!("{} {}", style("Saved to:").green().bold(), output_dir.display());
    for path in paths {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Execute the types command.
fn types_command(config: Option<&Path>) -> Result<()> {
    let registry = load_registry(config)?;
    println!("{}", style("Document types").bold());
    for spec in registry.specs() {
        let kinds: Vec<&str> = spec.permitted_kinds.iter().map(|k| k.as_str()).collect();
        println!(
            "  {} {} ({}; {})",
            style(&spec.code).cyan(),
            spec.description,
            spec.unit_kind.as_str(),
            kinds.join(" > ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_process_defaults() {
        let cli = Cli::parse_from(["regelrecht-structurer", "process", "layout.json"]);

        let Commands::Process {
            input,
            doc_type,
            config,
            output,
            format,
            ..
        } = cli.command
        else {
            panic!("expected process command");
        };
        assert_eq!(input, PathBuf::from("layout.json"));
        assert_eq!(doc_type, "LAW");
        assert!(config.is_none());
        assert!(output.is_none());
        assert_eq!(format, OutputFormat::Yaml);
    }

    #[test]
    fn test_cli_parse_process_with_options() {
        let cli = Cli::parse_from([
            "regelrecht-structurer",
            "process",
            "layout.json",
            "--doc-type",
            "RULES",
            "--plain-text",
            "doc.txt",
            "--format",
            "json",
        ]);

        let Commands::Process {
            doc_type,
            plain_text,
            format,
            ..
        } = cli.command
        else {
            panic!("expected process command");
        };
        assert_eq!(doc_type, "RULES");
        assert_eq!(plain_text, Some(PathBuf::from("doc.txt")));
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_parse_types() {
        let cli = Cli::parse_from(["regelrecht-structurer", "types"]);
        assert!(matches!(cli.command, Commands::Types { config: None }));
    }
}
