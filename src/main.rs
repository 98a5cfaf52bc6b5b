use clap::{Parser, Subcommand};
use sitecast::{config, output, pipeline};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "sitecast")]
#[command(about = "Schema inference and codegen for exported static sites")]
#[command(long_about = "\
Schema inference and codegen for exported static sites

Point sitecast at a directory of exported HTML pages. It infers which
parts of the markup are editable content and which are structure, then
generates everything a headless migration needs from that one inference:

  content-manifest.json     the inferred content model (fields, collections)
  templates/*.html          pages with literal content replaced by bindings
  backend/*.schema.json     content-type definitions for the storage backend
  seed.json                 the literal content, extracted as seed data

Detection rides on conventions already present in exported markup: class
vocabulary (card, item, post, ...), structural repetition, element roles,
and text length. No per-site annotations are required; config.toml in the
source directory tunes the heuristics.

Run 'sitecast gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory of exported HTML pages
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory for generated artifacts
    #[arg(long, default_value = "out", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Infer the content model and write content-manifest.json
    Scan,
    /// Run the full pipeline: manifest, templates, backend schemas, seed data
    Build,
    /// Run inference and report findings without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let report = run_pipeline(&cli.source)?;
            std::fs::create_dir_all(&cli.output)?;
            let manifest_path = cli.output.join("content-manifest.json");
            let json = serde_json::to_string_pretty(&report.manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&report.manifest);
            output::print_warnings(&report.warnings);
            output::print_failures(&report.failures);
        }
        Command::Build => {
            println!("==> Scanning {}", cli.source.display());
            let report = run_pipeline(&cli.source)?;
            output::print_scan_output(&report.manifest);

            println!("==> Writing artifacts \u{2192} {}", cli.output.display());
            write_artifacts(&cli.output, &report)?;
            output::print_build_output(&report);
            output::print_warnings(&report.warnings);
            output::print_failures(&report.failures);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = run_pipeline(&cli.source)?;
            output::print_scan_output(&report.manifest);
            output::print_warnings(&report.warnings);
            output::print_failures(&report.failures);
            if !report.failures.is_empty() {
                return Err(format!("{} page(s) could not be processed", report.failures.len()).into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config, discover pages, and run the pipeline over them.
fn run_pipeline(source: &Path) -> Result<pipeline::PipelineReport, Box<dyn std::error::Error>> {
    let config = config::load_config(source)?;
    let inputs = discover_pages(source)?;
    if inputs.is_empty() {
        return Err(format!("no HTML pages found under {}", source.display()).into());
    }
    Ok(pipeline::run(inputs, &config)?)
}

/// Walk the source directory and load every `.html` file.
///
/// The page id is the root-relative path without the extension, with
/// forward slashes regardless of platform.
fn discover_pages(source: &Path) -> Result<Vec<pipeline::PageInput>, Box<dyn std::error::Error>> {
    let mut inputs = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_html = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            .unwrap_or(false);
        if !is_html {
            continue;
        }
        let relative = entry.path().strip_prefix(source)?;
        let page_id = page_id_for(relative);
        let raw_html = std::fs::read_to_string(entry.path())?;
        inputs.push(pipeline::PageInput { page_id, raw_html });
    }
    Ok(inputs)
}

fn page_id_for(relative: &Path) -> String {
    let stemmed = relative.with_extension("");
    stemmed
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write every artifact of a finished run under the output directory.
fn write_artifacts(
    out: &Path,
    report: &pipeline::PipelineReport,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out)?;

    let json = serde_json::to_string_pretty(&report.manifest)?;
    std::fs::write(out.join("content-manifest.json"), json)?;

    for template in &report.templates {
        let path = out.join("templates").join(format!("{}.html", template.page_id));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &template.html)?;
    }

    let backend_dir = out.join("backend");
    std::fs::create_dir_all(&backend_dir)?;
    for (name, schema) in &report.backend_schemas {
        let json = serde_json::to_string_pretty(schema)?;
        std::fs::write(backend_dir.join(format!("{name}.schema.json")), json)?;
    }

    let json = serde_json::to_string_pretty(&report.seed)?;
    std::fs::write(out.join("seed.json"), json)?;

    Ok(())
}
