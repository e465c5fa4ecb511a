//! Data Connector Generator CLI
//!
//! Command-line interface for turning an OpenAPI description and a directory
//! attribute mapping into a data connector source tree.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use dataconnector_generator_common::{Diagnostics, GeneratorOptions, Severity};
use dataconnector_generator_generator::ConnectorGenerator;
use dataconnector_generator_parser::{build_connector_ir, ApiDocument, Assembly, MappingDocument};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dataconnector-generator")]
#[command(version, about = "Generate directory data connectors from OpenAPI descriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// The two input documents every command reads
#[derive(Args)]
struct Inputs {
    /// Path to the OpenAPI (or Swagger 2) document, JSON or YAML
    #[arg(long)]
    openapi: PathBuf,

    /// Path to the attribute mapping document, JSON or YAML
    #[arg(long)]
    mapping: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Check both documents against their structural rules
    #[command(after_help = "EXAMPLES:\n  \
        dataconnector-generator validate --openapi api.yaml --mapping mapping.json")]
    Validate {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Assemble the connector IR and print a summary with diagnostics
    #[command(after_help = "EXAMPLES:\n  \
        # Summary and diagnostics\n  \
        dataconnector-generator inspect --openapi api.yaml --mapping mapping.json\n\n  \
        # Dump the full IR as YAML\n  \
        dataconnector-generator inspect --openapi api.yaml --mapping mapping.json --emit yaml")]
    Inspect {
        #[command(flatten)]
        inputs: Inputs,

        /// Print the assembled IR instead of a summary
        #[arg(long)]
        emit: Option<EmitFormat>,
    },

    /// Generate the connector source tree
    #[command(after_help = "EXAMPLES:\n  \
        dataconnector-generator generate \\\n    \
        --openapi api.yaml \\\n    \
        --mapping mapping.json \\\n    \
        --package-name com.acme.connector \\\n    \
        --output ./connector")]
    Generate {
        #[command(flatten)]
        inputs: Inputs,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Java package for generated sources
        #[arg(long)]
        package_name: Option<String>,

        /// Connector display name (defaults to the API title)
        #[arg(long)]
        connector_name: Option<String>,

        /// Advertise schema extraction
        #[arg(long)]
        schema_extraction: bool,

        /// YAML file with generator options; flags take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmitFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { inputs } => validate_command(&inputs)?,
        Commands::Inspect { inputs, emit } => {
            inspect_command(&inputs, emit, cli.verbose)?;
        }
        Commands::Generate {
            inputs,
            output,
            package_name,
            connector_name,
            schema_extraction,
            config,
        } => {
            let options = resolve_options(
                config.as_deref(),
                package_name,
                connector_name,
                schema_extraction,
            )?;
            generate_command(&inputs, &options, &output, cli.verbose)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dataconnector_generator=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_documents(inputs: &Inputs) -> Result<(ApiDocument, MappingDocument)> {
    println!(
        "{} Loading OpenAPI document: {}",
        "→".cyan(),
        inputs.openapi.display()
    );
    let api = ApiDocument::load(&inputs.openapi).with_context(|| {
        format!("Invalid OpenAPI document {}", inputs.openapi.display())
    })?;

    println!(
        "{} Loading mapping document: {}",
        "→".cyan(),
        inputs.mapping.display()
    );
    let mapping = MappingDocument::load(&inputs.mapping).with_context(|| {
        format!("Invalid mapping document {}", inputs.mapping.display())
    })?;

    Ok((api, mapping))
}

/// Merge the optional config file with command-line overrides
fn resolve_options(
    config: Option<&Path>,
    package_name: Option<String>,
    connector_name: Option<String>,
    schema_extraction: bool,
) -> Result<GeneratorOptions> {
    let mut options = match config {
        Some(path) => GeneratorOptions::load(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => GeneratorOptions::default(),
    };

    if let Some(package_name) = package_name {
        options.package_name = package_name;
    }
    if connector_name.is_some() {
        options.connector_name = connector_name;
    }
    if schema_extraction {
        options.schema_extraction = true;
    }

    Ok(options)
}

fn assemble(inputs: &Inputs, options: &GeneratorOptions) -> Result<Assembly> {
    let (api, mapping) = load_documents(inputs)?;
    println!("{} Assembling connector IR...", "→".cyan());
    build_connector_ir(&api, &mapping, options).context("Failed to assemble connector IR")
}

fn validate_command(inputs: &Inputs) -> Result<()> {
    let (api, mapping) = load_documents(inputs)?;

    println!("\n{}", "✓ Both documents are structurally valid".green().bold());
    println!("  API: {} {}", api.info().title.yellow(), api.info().version);
    println!("  Paths: {}", api.paths().len());
    println!("  Object classes: {}", mapping.object_classes().len());

    Ok(())
}

fn inspect_command(inputs: &Inputs, emit: Option<EmitFormat>, verbose: bool) -> Result<()> {
    let assembly = assemble(inputs, &GeneratorOptions::default())?;

    match emit {
        Some(EmitFormat::Json) => {
            let json = serde_json::to_string_pretty(&assembly.ir)
                .context("Failed to serialize IR as JSON")?;
            println!("{}", json);
        }
        Some(EmitFormat::Yaml) => {
            let yaml =
                serde_yaml::to_string(&assembly.ir).context("Failed to serialize IR as YAML")?;
            println!("{}", yaml);
        }
        None => print_summary(&assembly, verbose),
    }

    print_diagnostics(&assembly.diagnostics);
    Ok(())
}

fn print_summary(assembly: &Assembly, verbose: bool) {
    let ir = &assembly.ir;

    println!("\n{}", "Connector IR:".bold());
    println!("  Name: {}", ir.names.display_name.yellow());
    println!("  Package: {}", ir.names.package_name);
    println!("  API version: {}", ir.metadata.version);
    if let Some(base_url) = &ir.metadata.base_url {
        println!("  Base URL: {}", base_url);
    }
    let capabilities: Vec<String> = ir.capabilities.iter().map(ToString::to_string).collect();
    println!("  Capabilities: {}", capabilities.join(", "));
    println!("  Models: {}", ir.models.len());
    println!("  Operations: {}", ir.operations.len());
    println!("  Object classes: {}", ir.object_classes.len());
    println!("  Connection properties: {}", ir.connection_properties.len());
    println!("  Symbols: {}", assembly.symbols.len());

    if verbose {
        println!("\n{}", "Operations:".bold());
        for op in &ir.operations {
            println!(
                "  • {} {} {}",
                op.name.cyan(),
                op.method,
                op.path.dimmed()
            );
        }

        println!("\n{}", "Object classes:".bold());
        for class in &ir.object_classes {
            println!(
                "  • {} ({}, key: {})",
                class.ldap_name.cyan(),
                class.model_class,
                class.primary_key.as_deref().unwrap_or("-")
            );
            for attr in &class.attributes {
                println!(
                    "    {} : {}{}",
                    attr.ldap_name,
                    attr.directory_type,
                    if attr.multi_valued { " [multi]" } else { "" }
                );
            }
        }
    }
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }

    println!("\n{} ({})", "Diagnostics:".bold(), diagnostics.len());
    for diagnostic in diagnostics.iter() {
        let severity = match diagnostic.severity {
            Severity::Info => "info".blue(),
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        println!(
            "  {} {}: {}",
            severity,
            diagnostic.location.dimmed(),
            diagnostic.message
        );
    }
}

fn generate_command(
    inputs: &Inputs,
    options: &GeneratorOptions,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    if verbose {
        println!("  Package: {}", options.package_name);
        if let Some(name) = &options.connector_name {
            println!("  Connector name: {}", name);
        }
        println!("  Schema extraction: {}", options.schema_extraction);
        println!("  Output: {}", output.display());
    }

    let assembly = assemble(inputs, options)?;
    println!(
        "{} Assembled {} operations and {} object classes",
        "✓".green(),
        assembly.ir.operations.len(),
        assembly.ir.object_classes.len()
    );
    print_diagnostics(&assembly.diagnostics);

    println!("{} Generating connector files...", "→".cyan());
    let generator = ConnectorGenerator::new(assembly.ir).context("Failed to create generator")?;
    let written = generator
        .generate_to_directory(output)
        .context("Failed to generate connector")?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    for path in &written {
        println!("  📄 {}/{}", output.display(), path);
    }
    println!("\n{}", "Next steps:".bold());
    println!("  1. Review generated files in {}", output.display());
    println!(
        "  2. Add the sources to a Maven module that depends on the connector SDK"
    );

    Ok(())
}
