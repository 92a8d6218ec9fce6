//! Writing and reading the three output files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::entries::{ContentEntry, DocumentOutput, QualityEntry, StructureEntry};
use crate::error::{Result, StructurerError};
use crate::gaps::PossibleParseError;

/// Serialization format of the output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StructureFile {
    doc_type: String,
    structure: Vec<StructureEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentFile {
    doc_type: String,
    content: Vec<ContentEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct QualityFile {
    doc_type: String,
    quality: Vec<QualityEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    possible_parse_errors: Vec<PossibleParseError>,
}

/// Render a value as YAML with a document marker and no trailing blanks.
pub fn generate_yaml<T: Serialize>(value: &T) -> Result<String> {
    let body = serde_yaml_ng::to_string(value)?;
    let mut out = String::from("---\n");
    for line in body.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    Ok(out)
}

/// Render a value as pretty-printed JSON with a trailing newline.
pub fn generate_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => generate_yaml(value),
        OutputFormat::Json => generate_json(value),
    }
}

fn parse<T: DeserializeOwned>(text: &str, format: OutputFormat) -> Result<T> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml_ng::from_str(text)?,
        OutputFormat::Json => serde_json::from_str(text)?,
    })
}

/// Write `content` to `path` through a synced temp file and a rename.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // rename does not replace an existing file on Windows
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Paths of the three output files in `dir`.
#[must_use]
pub fn output_paths(dir: &Path, format: OutputFormat) -> [PathBuf; 3] {
    let ext = format.extension();
    [
        dir.join(format!("structure.{ext}")),
        dir.join(format!("content.{ext}")),
        dir.join(format!("quality.{ext}")),
    ]
}

/// Save the structure, content and quality files into `dir`.
///
/// Creates the directory if needed and returns the written paths.
pub fn save_output(output: &DocumentOutput, dir: &Path, format: OutputFormat) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let [structure_path, content_path, quality_path] = output_paths(dir, format);

    let structure = StructureFile {
        doc_type: output.doc_type.clone(),
        structure: output.structure.clone(),
    };
    let content = ContentFile {
        doc_type: output.doc_type.clone(),
        content: output.content.clone(),
    };
    let quality = QualityFile {
        doc_type: output.doc_type.clone(),
        quality: output.quality.clone(),
        possible_parse_errors: output.possible_parse_errors.clone(),
    };

    write_atomic(&structure_path, &render(&structure, format)?)?;
    write_atomic(&content_path, &render(&content, format)?)?;
    write_atomic(&quality_path, &render(&quality, format)?)?;

    tracing::info!(dir = %dir.display(), format = format.extension(), "Saved output");
    Ok(vec![structure_path, content_path, quality_path])
}

/// Read the three output files from `dir` back into one document.
pub fn load_output(dir: &Path, format: OutputFormat) -> Result<DocumentOutput> {
    let [structure_path, content_path, quality_path] = output_paths(dir, format);
    let structure: StructureFile = parse(&fs::read_to_string(structure_path)?, format)?;
    let content: ContentFile = parse(&fs::read_to_string(content_path)?, format)?;
    let quality: QualityFile = parse(&fs::read_to_string(quality_path)?, format)?;

    if content.doc_type != structure.doc_type || quality.doc_type != structure.doc_type {
        return Err(StructurerError::InconsistentOutput(format!(
            "document types differ: structure '{}', content '{}', quality '{}'",
            structure.doc_type, content.doc_type, quality.doc_type
        )));
    }

    Ok(DocumentOutput {
        doc_type: structure.doc_type,
        structure: structure.structure,
        content: content.content,
        quality: quality.quality,
        possible_parse_errors: quality.possible_parse_errors,
    })
}
