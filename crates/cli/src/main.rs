//! Co-simulation glue CLI.
//!
//! This binary exposes each translation stage as a subcommand. It performs:
//! 1. **McPAT input:** Fill a McPAT template from gem5 `config.json` and `stats.txt`.
//! 2. **Template:** Write the default McPAT template, optionally with a custom component.
//! 3. **Memory power:** Turn gem5 bank counters and CACTI energies into a per-bank power trace.
//! 4. **Combine:** Interleave the core and memory power traces into one HotSpot trace.
//!
//! Each stage reads all of its inputs before writing its single output, so a fatal error
//! never leaves a partial file behind.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stackbridge_core::template::{CustomComponent, default_template};
use stackbridge_core::{BridgeError, MapperOptions, common, trace};

#[derive(Parser, Debug)]
#[command(
    name = "stackbridge",
    author,
    version,
    about = "Cross-stage translation for a gem5 → McPAT → CACTI → HotSpot flow",
    long_about = "Translate simulator outputs between the stages of a 3D-stack power/thermal flow.\n\nExamples:\n  stackbridge mcpat-input -c m5out/config.json -s m5out/stats.txt -t template.xml\n  stackbridge template --custom accel.yaml\n  stackbridge mem-power --gem5-config config.json --gem5-stats stats.txt --cacti-out dram.out\n  stackbridge combine --core-ptrace core.ptrace --mem-ptrace mem_power_trace.txt --is-core 101 --banks-per-layer 8 --coremem-ptrace stack.ptrace"
)]
struct Cli {
    /// Log derived values and lookups at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill a McPAT template from gem5 outputs.
    McpatInput {
        /// gem5 config.json.
        #[arg(short, long)]
        config: PathBuf,

        /// gem5 stats.txt.
        #[arg(short, long)]
        stats: PathBuf,

        /// McPAT template XML.
        #[arg(short, long)]
        template: PathBuf,

        /// Output McPAT input XML.
        #[arg(short, long, default_value = "mcpat_in.xml")]
        output: PathBuf,

        /// Write estimated functional-unit duty cycles into the core stats.
        #[arg(long)]
        emit_duty_cycles: bool,
    },

    /// Write the default McPAT template.
    Template {
        /// YAML description of a custom component to append to the system.
        #[arg(long)]
        custom: Option<PathBuf>,

        /// Output template XML.
        #[arg(short, long, default_value = "template_parser.xml")]
        output: PathBuf,
    },

    /// Generate the per-bank memory power trace.
    MemPower {
        /// gem5 config.json.
        #[arg(long)]
        gem5_config: PathBuf,

        /// gem5 stats.txt.
        #[arg(long)]
        gem5_stats: PathBuf,

        /// CACTI output file.
        #[arg(long)]
        cacti_out: PathBuf,

        /// Output memory power trace.
        #[arg(long, default_value = "mem_power_trace.txt")]
        output_file: PathBuf,
    },

    /// Combine core and memory power traces by layer.
    Combine {
        /// Core power trace.
        #[arg(long)]
        core_ptrace: PathBuf,

        /// Memory power trace.
        #[arg(long)]
        mem_ptrace: PathBuf,

        /// One character per layer, bottom to top: 1 for core, 0 for memory.
        #[arg(long)]
        is_core: String,

        /// Number of memory banks per memory layer.
        #[arg(long)]
        banks_per_layer: usize,

        /// Output combined trace.
        #[arg(long)]
        coremem_ptrace: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> Result<(), BridgeError> {
    match command {
        Commands::McpatInput {
            config,
            stats,
            template,
            output,
            emit_duty_cycles,
        } => stackbridge_core::write_mcpat_input(
            &config,
            &stats,
            &template,
            &output,
            MapperOptions { emit_duty_cycles },
        ),
        Commands::Template { custom, output } => {
            let mut template = default_template()?;
            if let Some(path) = custom {
                template.add_custom_component(&CustomComponent::load(&path)?)?;
            }
            common::write_file(&output, &template.to_xml())?;
            tracing::info!(path = %output.display(), "template written");
            Ok(())
        }
        Commands::MemPower {
            gem5_config,
            gem5_stats,
            cacti_out,
            output_file,
        } => trace::write_mem_power_trace(&gem5_config, &gem5_stats, &cacti_out, &output_file),
        Commands::Combine {
            core_ptrace,
            mem_ptrace,
            is_core,
            banks_per_layer,
            coremem_ptrace,
        } => trace::write_combined_trace(&core_ptrace, &mem_ptrace, &is_core, banks_per_layer, &coremem_ptrace),
    }
}
