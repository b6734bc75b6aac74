//! Command-line interface for the Markdown to Excel converter.
//!
//! Usage:
//!   md2excel convert `<input>` [`<output>`] [-o `<output>`] [-c `<config>`]  - Convert one file
//!   md2excel batch `<pattern>` [-d `<dir>`] [-c `<config>`]                 - Convert files matching a glob
//!   md2excel config create [`<path>`] [--force]                          - Write the default configuration
//!   md2excel config show [`<path>`]                                      - Print a configuration as JSON
//!   md2excel info                                                    - Describe the converter

use anyhow::Context;
use anyhow::Result;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use log::debug;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use rusty_md2excel::batch::DEFAULT_OUTPUT_DIR;
use rusty_md2excel::config::ExcelConfig;
use rusty_md2excel::convert_batch;
use rusty_md2excel::convert_file;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

const DEFAULT_CONFIG_PATH: &str = "./excel-config.yaml";

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .help("Configuration file (.yaml, .yml or .json)")
        .value_parser(clap::value_parser!(PathBuf))
}

fn mapping_args() -> [Arg; 2] {
    [
        Arg::new("include-type")
            .long("include-type")
            .help("Include the Type column in documents without tables")
            .action(ArgAction::SetTrue),
        Arg::new("include-level")
            .long("include-level")
            .help("Include the Level column in documents without tables")
            .action(ArgAction::SetTrue),
    ]
}

fn cli() -> Command {
    Command::new("md2excel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert Markdown and HTML documents to Excel workbooks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only report warnings and errors")
                .global(true)
                .conflicts_with("verbose")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a single Markdown or HTML file")
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("target")
                        .help("Output file path, same as --output")
                        .index(2)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output Excel file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(config_arg())
                .args(mapping_args()),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert every file matching a glob pattern")
                .arg(
                    Arg::new("pattern")
                        .help("Input file pattern, e.g. \"docs/*.md\"")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .short('d')
                        .help("Output directory")
                        .default_value(DEFAULT_OUTPUT_DIR)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(config_arg())
                .args(mapping_args()),
        )
        .subcommand(
            Command::new("config")
                .about("Manage configuration files")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Create a default configuration file")
                        .arg(
                            Arg::new("path")
                                .help("Configuration file path")
                                .index(1)
                                .default_value(DEFAULT_CONFIG_PATH)
                                .value_parser(clap::value_parser!(PathBuf)),
                        )
                        .arg(
                            Arg::new("force")
                                .long("force")
                                .short('f')
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show a configuration file, or the defaults")
                        .arg(
                            Arg::new("path")
                                .help("Configuration file path")
                                .index(1)
                                .value_parser(clap::value_parser!(PathBuf)),
                        ),
                ),
        )
        .subcommand(Command::new("info").about("Show converter information"))
}

fn init_logger(matches: &ArgMatches) {
    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else if matches.get_flag("quiet") {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .init();
}

/// Loads the configuration named by `--config`, then applies the column flags.
fn load_config(matches: &ArgMatches) -> Result<ExcelConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) if path.exists() => {
            let config = ExcelConfig::load(path)
                .with_context(|| format!("Failed to load configuration from '{}'", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        Some(path) => {
            warn!("Configuration file not found: {}. Using default configuration.", path.display());
            ExcelConfig::default()
        }
        None => ExcelConfig::default(),
    };
    if matches.get_flag("include-type") {
        config.content_mapping.include_type = true;
    }
    if matches.get_flag("include-level") {
        config.content_mapping.include_level = true;
    }
    Ok(config)
}

fn handle_convert(matches: &ArgMatches) -> Result<()> {
    let input = matches.get_one::<PathBuf>("input").context("Missing input file")?;
    let output = matches.get_one::<PathBuf>("output").or_else(|| matches.get_one::<PathBuf>("target"));
    let config = load_config(matches)?;

    info!("Converting file: {}", input.display());
    let started = Instant::now();
    let output = convert_file(input, output.map(PathBuf::as_path), &config)
        .with_context(|| format!("Conversion of '{}' failed", input.display()))?;
    info!("Conversion completed in {}ms", started.elapsed().as_millis());
    info!("Output file: {}", output.display());
    Ok(())
}

fn handle_batch(matches: &ArgMatches) -> Result<()> {
    let pattern = matches.get_one::<String>("pattern").context("Missing input pattern")?;
    let output_dir = matches.get_one::<PathBuf>("output-dir").map(PathBuf::as_path);
    let config = load_config(matches)?;

    info!("Batch converting files: {}", pattern);
    let started = Instant::now();
    let report = convert_batch(pattern, output_dir, &config)
        .with_context(|| format!("Batch conversion of '{}' failed", pattern))?;
    info!("Batch conversion completed in {}ms", started.elapsed().as_millis());
    info!("Total files: {}", report.total());
    info!("Successful: {}", report.converted());
    info!("Failed: {}", report.failed());
    for (index, outcome) in report.outcomes.iter().enumerate() {
        if outcome.is_converted() {
            debug!("{}. {}", index + 1, outcome);
        } else {
            warn!("Not converted: {}", outcome.input().display());
        }
    }
    Ok(())
}

fn handle_config_create(matches: &ArgMatches) -> Result<()> {
    let path = matches.get_one::<PathBuf>("path").context("Missing configuration path")?;
    if path.exists() && !matches.get_flag("force") {
        anyhow::bail!("Configuration file already exists: {}. Use --force to overwrite it.", path.display());
    }
    ExcelConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write configuration to '{}'", path.display()))?;
    info!("Default configuration created: {}", path.display());
    Ok(())
}

fn handle_config_show(matches: &ArgMatches) -> Result<()> {
    let config = match matches.get_one::<PathBuf>("path") {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            info!("Configuration from: {}", path.display());
            ExcelConfig::load(path)?
        }
        None => {
            info!("Default configuration:");
            ExcelConfig::default()
        }
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn handle_info() {
    println!("Markdown to Excel Converter");
    println!("Name: {}", env!("CARGO_PKG_NAME"));
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Input formats:");
    for format in [".md", ".markdown", ".html", ".htm"] {
        println!("  • {}", format);
    }
    println!("Output format: .xlsx");
    println!();
    println!("Features:");
    for feature in [
        "One worksheet row per content block",
        "Content rows merged across the widest table",
        "Column widths and row heights sized from content",
        "Optional Type and Level columns",
        "Optional separate worksheet per table",
        "Batch conversion with glob patterns",
    ] {
        println!("  • {}", feature);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("convert", convert_matches)) => handle_convert(convert_matches),
        Some(("batch", batch_matches)) => handle_batch(batch_matches),
        Some(("config", config_matches)) => match config_matches.subcommand() {
            Some(("create", create_matches)) => handle_config_create(create_matches),
            Some(("show", show_matches)) => handle_config_show(show_matches),
            _ => anyhow::bail!("Unknown config command. Use \"create\" or \"show\"."),
        },
        Some(("info", _)) => {
            handle_info();
            Ok(())
        }
        _ => unreachable!(),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logger(&matches);
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn convert_arguments() {
        let matches = cli().get_matches_from(["md2excel", "-v", "convert", "in.md", "out.xlsx", "--include-level"]);
        assert!(matches.get_flag("verbose"));
        let (name, convert) = matches.subcommand().unwrap();
        assert_eq!(name, "convert");
        assert_eq!(convert.get_one::<PathBuf>("target"), Some(&PathBuf::from("out.xlsx")));
        assert!(convert.get_flag("include-level"));
        assert!(!convert.get_flag("include-type"));
    }

    #[test]
    fn batch_defaults() {
        let matches = cli().get_matches_from(["md2excel", "batch", "docs/*.md"]);
        let (_, batch) = matches.subcommand().unwrap();
        assert_eq!(batch.get_one::<PathBuf>("output-dir"), Some(&PathBuf::from(DEFAULT_OUTPUT_DIR)));
        assert_eq!(batch.get_one::<String>("pattern").map(String::as_str), Some("docs/*.md"));
    }

    #[test]
    fn load_config_applies_flags() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("config.yaml");
        let mut saved = ExcelConfig::default();
        saved.worksheet.name = "Notes".to_owned();
        saved.save(&path).unwrap();

        let path = path.to_string_lossy().into_owned();
        let matches = cli().get_matches_from(["md2excel", "convert", "in.md", "-c", path.as_str(), "--include-type"]);
        let (_, convert) = matches.subcommand().unwrap();
        let config = load_config(convert).unwrap();
        assert_eq!(config.worksheet.name, "Notes");
        assert!(config.content_mapping.include_type);
        assert!(!config.content_mapping.include_level);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let matches = cli().get_matches_from(["md2excel", "batch", "*.md", "--config", "does-not-exist.yaml"]);
        let (_, batch) = matches.subcommand().unwrap();
        assert_eq!(load_config(batch).unwrap(), ExcelConfig::default());
    }
}
