use clap::{Parser, Subcommand};
use clrstub_metadata::parse_listing_with_source;
use clrstub_translator::{generate, GeneratorOptions, PackageOptions};
use miette::{IntoDiagnostic, MietteHandlerOpts, Result};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "clrstub",
    version,
    about = "Generate Haxe extern declarations from CLR assembly metadata",
    long_about = "clrstub reads assembly listings and writes one Haxe extern module per public type."
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate assemblies into Haxe extern modules
    Generate {
        /// Output folder for the generated modules
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output: Option<PathBuf>,

        /// Directory searched for assemblies; the last match wins
        #[arg(short = 'i', long = "input", value_name = "DIR")]
        inputs: Vec<PathBuf>,

        /// Package replacing `dotnet` for the namespaces of the given assemblies
        #[arg(short = 'p', long = "package", value_name = "PACKAGE")]
        package: Option<String>,

        /// Skip the `dotnet` prefix for the namespaces of the given assemblies
        #[arg(short = 's', long = "skip-prefix")]
        skip_prefix: bool,

        /// Root package that never receives the `dotnet` prefix
        #[arg(short = 'r', long = "root-package", value_name = "PACKAGE")]
        root_packages: Vec<String>,

        /// Assembly listings to translate
        #[arg(value_name = "ASSEMBLY")]
        assemblies: Vec<String>,
    },
    /// Parse assembly listings and report diagnostics
    Check {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}

fn main() {
    setup_miette_handler();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Generate {
            output,
            inputs,
            package,
            skip_prefix,
            root_packages,
            assemblies,
        }) => {
            let options = GeneratorOptions {
                output_dir: output,
                search_dirs: inputs,
                assemblies,
                packages: PackageOptions {
                    package_override: package,
                    skip_prefix,
                    root_packages: root_packages.into_iter().collect(),
                },
            };
            if let Err(report) = handle_generate_command(&options) {
                eprintln!("{:?}", report);
                process::exit(1);
            }
        }
        Some(Commands::Check { files }) => {
            handle_check_command(files);
        }
        None => {
            Cli::parse_from(["clrstub", "--help"]);
        }
    }
}

fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_directive = if verbose { "clrstub=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
        .with(filter)
        .init();
}

fn handle_generate_command(options: &GeneratorOptions) -> Result<()> {
    let summary = generate(options)?;
    println!(
        "Generated {} modules ({} static companions) from {} assemblies",
        summary.units_written, summary.companions, summary.assemblies
    );
    Ok(())
}

fn handle_check_command(files: Vec<PathBuf>) {
    let mut success = true;

    for file_path in files {
        match check_single_file(&file_path) {
            Ok(count) => println!("✅ {}: {} types", file_path.display(), count),
            Err(e) => {
                eprintln!("{:?}", e);
                success = false;
            }
        }
    }

    if !success {
        process::exit(1);
    }
}

fn check_single_file(file_path: &PathBuf) -> Result<usize> {
    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let source = fs::read_to_string(file_path).into_diagnostic()?;
    let assembly = parse_listing_with_source(&source, Some(file_path.display().to_string()))?;
    tracing::debug!(assembly = %assembly.name, "parsed listing");

    Ok(assembly.types.len())
}
