//! Command-line interface for the archsketch utility
//!
//! Converts `diagrams` source, usually produced by a language model, into
//! draw.io documents.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use archsketch::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use archsketch::plugins::architecture::assign_flow_levels;
use archsketch::plugins::Orchestrator;
use archsketch::{extract_code, CatalogEntry, Cluster, Connection, Database, ServiceInstance, CATALOG};

/// Archsketch - Convert `diagrams` architecture code to draw.io
#[derive(Parser)]
#[command(name = "archsketch")]
#[command(about = "Convert generated `diagrams` architecture code into editable draw.io documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert diagram source to a draw.io document
    Convert {
        /// Input file with diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the document (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Diagram name written into the document
        #[arg(short, long, default_value = "Architecture")]
        name: String,

        /// Rendered image; without input its file name drives the fallback
        #[arg(long)]
        image: Option<PathBuf>,

        /// Use the input verbatim instead of stripping Markdown fences
        #[arg(long)]
        raw: bool,
    },

    /// Write `<image>.drawio` next to an existing rendered image
    Attach {
        /// Rendered image the document belongs to
        #[arg(long)]
        image: PathBuf,

        /// Input file with diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Diagram name written into the document
        #[arg(short, long, default_value = "Architecture")]
        name: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which strategy the input selects
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show the parsed clusters, services, connections and flow levels
    Inspect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List recognized service constructors
    Catalog {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Parsed model as printed by `inspect`
#[derive(Debug, Serialize)]
pub struct InspectReport<'a> {
    pub clusters: Vec<&'a Cluster>,
    pub services: Vec<InspectedService<'a>>,
    pub connections: Vec<&'a Connection>,
}

#[derive(Debug, Serialize)]
pub struct InspectedService<'a> {
    #[serde(flatten)]
    pub service: &'a ServiceInstance,
    pub level: Option<usize>,
}

/// Main CLI application
pub struct ArchsketchApp {
    orchestrator: Orchestrator,
}

impl ArchsketchApp {
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Archsketch v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Convert {
                input,
                output,
                name,
                image,
                raw,
            } => self.convert_command(input, output, &name, image, raw, cli.verbose),
            Commands::Attach {
                image,
                input,
                name,
                json,
            } => self.attach_command(&image, input, &name, json),
            Commands::Detect { input } => self.detect_command(input, cli.verbose),
            Commands::Inspect { input, json } => self.inspect_command(input, json),
            Commands::Catalog { json } => self.catalog_command(json),
        }
    }

    /// Handle the convert command
    fn convert_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        name: &str,
        image: Option<PathBuf>,
        raw: bool,
        verbose: bool,
    ) -> Result<()> {
        // An image without input means there is no source, only a file name
        let source = if input.is_none() && image.is_some() {
            None
        } else {
            Some(self.read_source(input, raw)?)
        };

        if verbose {
            eprintln!(
                "Read {} bytes of input",
                source.as_deref().map_or(0, str::len)
            );
        }

        let conversion = self
            .orchestrator
            .convert(source.as_deref(), name, image.as_deref())?;

        if verbose {
            eprintln!(
                "Converted with the {} strategy: {} shapes, {} connectors",
                conversion.strategy,
                conversion.layout.shapes.len(),
                conversion.layout.connectors.len()
            );
        }

        self.write_output(output, &conversion.document)
    }

    /// Handle the attach command
    fn attach_command(
        &self,
        image: &Path,
        input: Option<PathBuf>,
        name: &str,
        json: bool,
    ) -> Result<()> {
        let source = match input {
            Some(path) => Some(self.read_source(Some(path), false)?),
            None => None,
        };

        let outcome = self
            .orchestrator
            .convert_to_file(image, name, source.as_deref());

        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else if let Some(message) = &outcome.message {
            println!("{}", message);
        }

        if outcome.success {
            Ok(())
        } else {
            Err(anyhow!(outcome
                .error
                .unwrap_or_else(|| "conversion failed".to_string())))
        }
    }

    /// Handle the detect command
    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_source(input, false)?;

        let strategy = self.orchestrator.select_strategy(Some(&content));
        println!("{}", strategy);

        if verbose {
            for report in self.orchestrator.detector_report(&content) {
                eprintln!(
                    "  {:<10} {:.2}  looks for: {}",
                    report.diagram_type,
                    report.confidence,
                    report.patterns.join(" ")
                );
            }
        }
        Ok(())
    }

    /// Handle the inspect command
    fn inspect_command(&self, input: Option<PathBuf>, json: bool) -> Result<()> {
        let content = self.read_source(input, false)?;
        let database = archsketch::parse(&content)?;
        let levels = assign_flow_levels(&database);
        debug!(services = database.node_count(), "Inspecting model");

        let report = InspectReport {
            clusters: database.clusters().iter().collect(),
            services: database
                .nodes()
                .map(|service| InspectedService {
                    service,
                    level: levels.level(&service.id),
                })
                .collect(),
            connections: database.edges().collect(),
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Clusters:");
        for cluster in &report.clusters {
            println!("  {} [{}]", cluster.name, cluster.members.join(", "));
        }
        println!("Services:");
        for entry in &report.services {
            let level = entry
                .level
                .map_or_else(|| "-".to_string(), |l| l.to_string());
            println!(
                "  {:<16} {:<14} level {}",
                entry.service.id, entry.service.kind, level
            );
        }
        println!("Connections:");
        for connection in &report.connections {
            println!("  {} >> {}", connection.from, connection.to);
        }
        Ok(())
    }

    /// Handle the catalog command
    fn catalog_command(&self, json: bool) -> Result<()> {
        if json {
            let entries: Vec<&CatalogEntry> = CATALOG.iter().collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        println!("Recognized constructors:");
        for entry in CATALOG {
            println!(
                "  {:<18} {:<16} {}",
                entry.constructor,
                entry.category.to_string(),
                entry.label
            );
        }
        println!();
        println!("Total: {} constructors", CATALOG.len());
        Ok(())
    }

    /// Read source and strip Markdown fences unless `raw`
    fn read_source(&self, input: Option<PathBuf>, raw: bool) -> Result<String> {
        let content = self.read_input(input)?;
        if raw {
            Ok(content)
        } else {
            let code = extract_code(&content);
            info!(raw_len = content.len(), code_len = code.len(), "Extracted code");
            Ok(code)
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for ArchsketchApp {
    fn default() -> Self {
        Self::new()
    }
}
