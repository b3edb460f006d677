//! CLI interface for the CV tailor

use crate::output::formatter::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cv-tailor")]
#[command(version)]
#[command(about = "Tailor a Word CV and cover letter to a job description")]
#[command(long_about = "Extracts the sections of a .docx CV template, analyzes a job description with a text-generation service (or an offline skill catalog), and writes a tailored copy of the template")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Options shared by `tailor` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct TailorOptions {
    /// Path to the CV template (.docx)
    #[arg(short, long)]
    pub template: PathBuf,

    /// Optional cover letter template (.docx) to tailor alongside the CV
    #[arg(long)]
    pub cover_letter: Option<PathBuf>,

    /// Analyze with the built-in skill catalog instead of the generation service
    #[arg(long)]
    pub offline: bool,

    /// Rephrase experience bullets that do not mention any job keyword
    #[arg(long)]
    pub rephrase: bool,

    /// Model to use instead of the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Report format: console, json
    #[arg(short, long, default_value = "console", value_parser = parse_output_format)]
    pub format: OutputFormat,

    /// Also save the report to this file
    #[arg(long)]
    pub save_report: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tailor a CV template to one job description
    Tailor {
        #[command(flatten)]
        options: TailorOptions,

        /// Job description file (TXT, MD, PDF)
        #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Output path for the tailored CV (default: generated name in the output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Company name used in the generated file name
        #[arg(long, default_value = "")]
        company: String,

        /// Job title used in the generated file name (default: job file name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Tailor a CV template to every job in a manifest
    Batch {
        #[command(flatten)]
        options: TailorOptions,

        /// JSON manifest of jobs, or a directory of job description files
        #[arg(short, long)]
        jobs: PathBuf,

        /// Directory for generated files (default: from config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the sections and personal info recognised in a template
    Inspect {
        /// Path to the template (.docx)
        template: PathBuf,

        /// Output format: console, json
        #[arg(short, long, default_value = "console", value_parser = parse_output_format)]
        format: OutputFormat,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "service.model", "rewrite.match_policy")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    format.parse()
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tailor_command() {
        let cli = Cli::parse_from([
            "cv-tailor",
            "tailor",
            "--template",
            "cv.docx",
            "--job",
            "job.md",
            "--offline",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Tailor { options, job, .. } => {
                assert!(options.offline);
                assert_eq!(options.format, OutputFormat::Json);
                assert_eq!(job, Some(PathBuf::from("job.md")));
            }
            _ => panic!("expected tailor command"),
        }
    }

    #[test]
    fn test_job_source_is_required() {
        assert!(Cli::try_parse_from(["cv-tailor", "tailor", "--template", "cv.docx"]).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.DOCX"), &["docx"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.doc"), &["docx"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["docx"]).is_err());
    }
}
