mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use scawire::{resolve_wires, DefaultContractMatcher};
use scawire_model::{CompositeDefinition, LogicalAssembly, LogicalWire, QName};

#[derive(Parser)]
#[command(
    name = "scawire",
    about = "Resolve the logical wiring of a component assembly descriptor",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output (per-wire resolution tracing)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Parser)]
enum Command {
    /// Check that a descriptor wires up completely
    ///
    /// Runs a full resolution pass and reports every wiring problem found.
    /// Exits non-zero when the assembly has unresolved or broken wires.
    Validate {
        /// Path to the composite descriptor (JSON)
        descriptor: PathBuf,

        /// Domain name the composite is deployed under
        #[arg(long, default_value = "domain")]
        domain: String,

        /// Deployable the components belong to, as namespace#local
        #[arg(long, value_name = "QNAME")]
        deployable: Option<QName>,
    },

    /// Resolve a descriptor and emit the wire set
    ///
    /// Prints the resolved wires as JSON on stdout, one entry per wire with
    /// source reference, target service and the target's deployable.
    Wire {
        /// Path to the composite descriptor (JSON)
        descriptor: PathBuf,

        /// Domain name the composite is deployed under
        #[arg(long, default_value = "domain")]
        domain: String,

        /// Deployable the components belong to, as namespace#local
        #[arg(long, value_name = "QNAME")]
        deployable: Option<QName>,

        /// Write the wire set to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

/// What `wire` emits: the domain plus every resolved wire, sorted by source.
#[derive(Serialize)]
struct WireReport<'a> {
    domain: &'a str,
    wires: Vec<&'a LogicalWire>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Validate {
            descriptor,
            domain,
            deployable,
        } => {
            let mut assembly = load_assembly(&descriptor, &domain, deployable)?;
            let errors = resolve_wires(&mut assembly, &DefaultContractMatcher);
            if !errors.is_empty() {
                for error in &errors {
                    eprintln!("error: {error}");
                }
                anyhow::bail!(
                    "{} wiring error(s) in '{}'",
                    errors.len(),
                    descriptor.display()
                );
            }
            println!(
                "{}: {} wire(s), fully resolved",
                descriptor.display(),
                assembly.all_wires().len()
            );
            Ok(())
        }

        Command::Wire {
            descriptor,
            domain,
            deployable,
            output,
        } => {
            let mut assembly = load_assembly(&descriptor, &domain, deployable)?;
            let errors = resolve_wires(&mut assembly, &DefaultContractMatcher);
            if !errors.is_empty() {
                for error in &errors {
                    eprintln!("error: {error}");
                }
                anyhow::bail!(
                    "{} wiring error(s) in '{}'",
                    errors.len(),
                    descriptor.display()
                );
            }

            let report = WireReport {
                domain: &domain,
                wires: assembly.all_wires(),
            };
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize wire set")?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("Failed to write '{}'", path.display()))?,
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

fn load_assembly(
    descriptor: &Path,
    domain: &str,
    deployable: Option<QName>,
) -> Result<LogicalAssembly> {
    let contents = fs::read_to_string(descriptor)
        .with_context(|| format!("Failed to read '{}'", descriptor.display()))?;
    let composite: CompositeDefinition = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid descriptor '{}'", descriptor.display()))?;
    LogicalAssembly::instantiate(domain, &composite, deployable)
        .with_context(|| format!("Failed to instantiate '{}'", descriptor.display()))
}
