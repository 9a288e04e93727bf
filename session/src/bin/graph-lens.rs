//! graph-lens: explore a DOT-like graph from the command line.
//!
//! Usage: graph-lens <command> [OPTIONS]
//!
//! Every command that takes a source file accepts `-` for stdin. Output is
//! JSON on stdout; logs go to stderr (RUST_LOG=graph_lens_session=debug).

use std::error::Error;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use graph_lens_core::{validate, Direction, HopLimit, Mode};
use graph_lens_session::{
    decode, encode, parse_direction, sanitize, Recorded, RenderedGraph, Session, Settings,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graph-lens")]
#[command(about = "Neighborhood highlighting for DOT-like graphs")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Preferences file (JSON), read at startup and written on change
    #[arg(long, global = true, value_name = "FILE")]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the highlight view for a set of selected nodes
    View {
        /// Graph source, or - for stdin
        source: PathBuf,
        /// Node to select; repeat for multi-select
        #[arg(long = "select", value_name = "NODE")]
        selections: Vec<String>,
        /// Traversal mode: all, single, downstream, upstream, bidirectional
        #[arg(long)]
        mode: Option<Mode>,
        /// Hop limit: a positive number or "unbounded"
        #[arg(long)]
        hops: Option<String>,
        /// Render result to reconcile (JSON: {"nodes": [...], "edges": ["a->b"]})
        #[arg(long, value_name = "FILE")]
        rendered: Option<PathBuf>,
    },

    /// List nodes reachable from a start node, nearest first
    Neighborhood {
        /// Graph source, or - for stdin
        source: PathBuf,
        /// Start node id
        node: String,
        /// downstream or upstream
        #[arg(long, default_value = "downstream", value_parser = parse_direction)]
        direction: Direction,
        /// Hop limit: a positive number or "unbounded"
        #[arg(long)]
        hops: Option<String>,
    },

    /// Check source structure and report the first error
    Validate {
        /// Graph source, or - for stdin
        source: PathBuf,
    },

    /// Load a source (if given) and print session status
    Status {
        /// Graph source, or - for stdin
        source: Option<PathBuf>,
    },

    /// Encode a source as a shareable link fragment
    Encode {
        /// Graph source, or - for stdin
        source: PathBuf,
    },

    /// Decode a shared link fragment back to source
    Decode {
        /// Encoded fragment
        encoded: String,
        /// Source printed when the fragment cannot be decoded
        #[arg(long, default_value = "digraph {}")]
        default: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("graph-lens: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut session = Session::new(settings);
    if let Some(path) = &cli.prefs {
        session = session.with_preferences(path);
    }

    match cli.command {
        Command::View {
            source,
            selections,
            mode,
            hops,
            rendered,
        } => {
            session.apply_source(&read_source(&source)?)?;
            if let Some(path) = rendered {
                let graph: RenderedGraph = serde_json::from_str(&std::fs::read_to_string(path)?)?;
                session.render_with(&mut Recorded(graph));
            }
            if let Some(mode) = mode {
                session.set_mode(mode);
            }
            if let Some(hops) = hops {
                session.set_max_hops(&hops);
            }
            for (i, node) in selections.iter().enumerate() {
                session.activate(node, i > 0);
            }
            print_json(&session.view())?;
        }
        Command::Neighborhood {
            source,
            node,
            direction,
            hops,
        } => {
            session.apply_source(&read_source(&source)?)?;
            let default = session.settings().default_hop_limit();
            let max_hops = hops.map_or(default, |h| HopLimit::parse_or(&h, default));
            print_json(&session.neighborhood(&node, direction, max_hops)?)?;
        }
        Command::Validate { source } => {
            let text = read_source(&source)?;
            if let Err(e) = validate(&sanitize(&text)) {
                print_json(&[e.marker()])?;
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Command::Status { source } => {
            if let Some(source) = source {
                // Load failures show up in the status output.
                let _ = session.apply_source(&read_source(&source)?);
            }
            print_json(&session.status())?;
        }
        Command::Encode { source } => {
            println!("{}", encode(&read_source(&source)?)?);
        }
        Command::Decode { encoded, default } => {
            print!("{}", decode(&encoded, &default));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: &Path) -> Result<String, Box<dyn Error>> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()).into())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
