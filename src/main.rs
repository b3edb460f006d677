//! cv-tailor: tailor a Word CV template to a job description

use clap::Parser;
use cv_tailor::cli::{self, Cli, Commands, ConfigAction, TailorOptions};
use cv_tailor::config::Config;
use cv_tailor::document::extractor::SectionExtractor;
use cv_tailor::error::{Result, TailorError};
use cv_tailor::input::InputManager;
use cv_tailor::llm::analyzer::{JobAnalyzer, RequirementsRecord};
use cv_tailor::llm::client::{GenerationOptions, HttpGenerator, ServiceSettings};
use cv_tailor::output::formatter::{save_report_to_file, OutputFormat, ReportGenerator};
use cv_tailor::output::report::{InspectionReport, ReportMetadata, TailoringReport};
use cv_tailor::processing::catalog::SkillCatalog;
use cv_tailor::tailor::batch::{discard_output, load_manifest, BatchRunner, JobPosting, OutputNamer};
use cv_tailor::tailor::cover_letter::CoverLetterRewriter;
use cv_tailor::tailor::rewriter::TemplateRewriter;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone();
    let config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Tailor {
            options,
            job,
            job_text,
            output,
            company,
            title,
        } => {
            let config = with_model_override(config, &options);
            let job_text = match (job.as_deref(), job_text) {
                (_, Some(text)) => text,
                (Some(path), None) => InputManager::new().read_job_text(path).await?,
                (None, None) => {
                    return Err(TailorError::InvalidInput(
                        "Provide a job description with --job or --job-text".to_string(),
                    ))
                }
            };
            let posting = JobPosting {
                title: title
                    .or_else(|| job.as_deref().and_then(file_stem))
                    .unwrap_or_else(|| "Job".to_string()),
                company,
                description: None,
                description_file: None,
                url: None,
            };

            let generator = build_generator(&config, options.offline)?;
            run_tailor(&config, generator.as_ref(), &options, &job_text, &posting, output).await?;
        }

        Commands::Batch {
            options,
            jobs,
            output_dir,
        } => {
            let config = with_model_override(config, &options);
            validate_template(&options.template)?;

            let postings = load_manifest(&jobs)?;
            if postings.is_empty() {
                return Err(TailorError::InvalidInput(format!("No jobs found in '{}'", jobs.display())));
            }
            info!("Loaded {} job(s) from {}", postings.len(), jobs.display());

            let generator = build_generator(&config, options.offline)?;
            let mut namer = output_namer(&config, output_dir);
            let runner = BatchRunner::new(&config, generator.as_ref())?
                .with_progress(options.format == OutputFormat::Console);
            let summary = runner
                .run(&options.template, options.cover_letter.as_deref(), &postings, &mut namer)
                .await;

            let reporter = ReportGenerator::new();
            let rendered = reporter.formatter(options.format).format_batch(&summary)?;
            emit(&rendered, options.save_report.as_deref())?;

            if summary.generated.is_empty() {
                return Err(TailorError::InvalidInput("Every job in the batch was skipped".to_string()));
            }
        }

        Commands::Inspect { template, format } => {
            validate_template(&template)?;
            let document = SectionExtractor::new(config.sections.clone()).extract(&template)?;
            if document.sections().is_empty() {
                warn!("No recognised section headings in {}", template.display());
            }

            let reporter = ReportGenerator::new();
            let rendered = reporter
                .formatter(format)
                .format_inspection(&InspectionReport::from(&document))?;
            println!("{}", rendered);
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    let content = toml::to_string_pretty(&config)
                        .map_err(|e| TailorError::Configuration(format!("Failed to serialize config: {}", e)))?;
                    println!("{}", content);
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(&path)?;
                    println!("✅ Configuration reset successfully!");
                }

                Some(ConfigAction::Set { key, value }) => {
                    let mut config = config;
                    config.set_value(&key, &value)?;
                    config.save_to(&path)?;
                    println!("✅ Set {} = {}", key, value);
                }
            }
        }
    }

    Ok(())
}

async fn run_tailor(
    config: &Config,
    generator: Option<&HttpGenerator>,
    options: &TailorOptions,
    job_text: &str,
    posting: &JobPosting,
    output: Option<PathBuf>,
) -> Result<()> {
    validate_template(&options.template)?;
    if let Some(letter) = &options.cover_letter {
        validate_template(letter)?;
    }

    let generation = GenerationOptions::from(&config.service);
    let requirements = match generator {
        Some(generator) => JobAnalyzer::new(generator, generation.clone()).analyze(job_text).await?,
        None => {
            info!("Offline mode: analysing the job description with the skill catalog");
            RequirementsRecord::from_catalog(&SkillCatalog::new()?, job_text)?
        }
    };
    info!("Extracted {} keyword(s) from the job description", requirements.keywords().len());

    let extractor = SectionExtractor::new(config.sections.clone());
    let document = extractor.extract(&options.template)?;
    let letter_document = options
        .cover_letter
        .as_deref()
        .map(|letter| extractor.extract(letter))
        .transpose()?;

    let mut namer = output_namer(config, None);
    let cv_path = match output {
        Some(path) => path,
        None => namer.next_path(&config.output.cv_prefix, posting),
    };

    let mut rewrite_config = config.rewrite.clone();
    if options.rephrase {
        rewrite_config.rephrase_experience = true;
    }
    let rewriter = TemplateRewriter::new(generator, generation.clone(), rewrite_config);
    let result = rewriter.rewrite(&document, &requirements, &cv_path).await?;

    let cover_letter = match letter_document {
        Some(letter_document) => {
            let letter_path = sibling_path(&cv_path, &config.output.cv_prefix, &config.output.cover_letter_prefix)
                .unwrap_or_else(|| namer.next_path(&config.output.cover_letter_prefix, posting));
            let letter_rewriter = CoverLetterRewriter::new(generator, generation);
            match letter_rewriter.rewrite(&letter_document, &requirements, &letter_path).await {
                Ok(letter) => Some(letter),
                Err(e) => {
                    discard_output(&cv_path);
                    return Err(e);
                }
            }
        }
        None => None,
    };

    let metadata = ReportMetadata::new(
        options.template.clone(),
        generator.map(|_| config.service.model.clone()),
    );
    let report = TailoringReport::new(metadata, &requirements, &result, cover_letter);

    let reporter = ReportGenerator::new();
    let rendered = reporter.formatter(options.format).format_tailoring(&report)?;
    emit(&rendered, options.save_report.as_deref())
}

/// The generation client, or `None` when running offline.
fn build_generator(config: &Config, offline: bool) -> Result<Option<HttpGenerator>> {
    if offline {
        return Ok(None);
    }

    let api_key = std::env::var(&config.service.api_key_env).map_err(|_| {
        TailorError::Configuration(format!(
            "Environment variable {} is not set; export it or pass --offline",
            config.service.api_key_env
        ))
    })?;

    let settings = ServiceSettings::new(&config.service, api_key);
    Ok(Some(HttpGenerator::new(settings)?))
}

fn with_model_override(mut config: Config, options: &TailorOptions) -> Config {
    if let Some(model) = &options.model {
        config.service.model = model.clone();
    }
    config
}

fn output_namer(config: &Config, directory: Option<PathBuf>) -> OutputNamer {
    let date = config
        .output
        .include_date
        .then(|| chrono::Local::now().date_naive());
    OutputNamer::new(directory.unwrap_or_else(|| config.output.directory.clone()), date)
}

/// For a generated CV name, the cover letter goes next to it under the letter prefix.
fn sibling_path(cv_path: &Path, cv_prefix: &str, letter_prefix: &str) -> Option<PathBuf> {
    let name = cv_path.file_name()?.to_str()?;
    let rest = name.strip_prefix(cv_prefix)?;
    let candidate = cv_path.with_file_name(format!("{}{}", letter_prefix, rest));
    (!candidate.exists()).then_some(candidate)
}

fn validate_template(path: &Path) -> Result<()> {
    cli::validate_file_extension(path, &["docx"])
        .map_err(|e| TailorError::InvalidInput(format!("Template '{}': {}", path.display(), e)))?;
    if !path.exists() {
        return Err(TailorError::InvalidInput(format!("Template not found: {}", path.display())));
    }
    Ok(())
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

fn emit(rendered: &str, save: Option<&Path>) -> Result<()> {
    println!("{}", rendered);
    if let Some(path) = save {
        save_report_to_file(rendered, path)?;
        info!("Report saved to {}", path.display());
    }
    Ok(())
}
