use clap::Parser;
use regex::Regex;
use rust_python_tree_medoids::color::CladeColoring;
use rust_python_tree_medoids::io::{read_tree, write_assignments_tsv, write_colored_nexus};
use rust_python_tree_medoids::search::min_cover;
use rust_python_tree_medoids::{BinaryTree, MedoidSolver, SolverOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Pick representative taxa (medoids) of a phylogenetic tree so that the summed
/// distance from every taxon to its nearest representative is minimal.
#[derive(Parser, Debug)]
#[command(name = "tree-medoids", version, about = "Optimal representative taxa of a phylogenetic tree")]
struct Args {
    /// Path to NEWICK or NEXUS tree file (optionally .gz)
    #[arg(short = 't', long = "tree")]
    tree: PathBuf,

    /// Number of representatives to choose
    #[arg(short = 'n', long = "num", required_unless_present = "cover")]
    n: Option<usize>,

    /// Taxa within this distance of a representative cost nothing
    #[arg(short = 'r', long = "radius")]
    radius: Option<f64>,

    /// Taxa matching this regex are prior centers (already chosen)
    #[arg(long = "prior-regex")]
    prior_regex: Option<String>,

    /// Taxa matching this regex are never chosen but still counted
    #[arg(long = "exclude-rep-regex")]
    exclude_rep_regex: Option<String>,

    /// Taxa matching this regex are neither chosen nor counted
    #[arg(long = "exclude-fully-regex")]
    exclude_fully_regex: Option<String>,

    /// Find the smallest number of representatives covering every taxon
    #[arg(long = "cover", default_value_t = false, conflicts_with = "n")]
    cover: bool,

    /// Write the tree colored by clade as NEXUS (FigTree)
    #[arg(long = "color")]
    color: Option<PathBuf>,

    /// Write the per-taxon assignment table as TSV ("-" for stdout, .gz compresses)
    #[arg(long = "assignments")]
    assignments: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long = "verbose", default_value_t = false, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode: only warnings and errors on stderr
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set log subscriber: {e}");
    }
}

/// Labels of leaves matching `pattern`, in tree order.
fn select_labels(tree: &BinaryTree, pattern: Option<&str>, what: &str) -> Vec<String> {
    let Some(pattern) = pattern else {
        return Vec::new();
    };
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            eprintln!("Invalid {what} regex {pattern:?}: {e}");
            std::process::exit(3);
        }
    };
    let labels: Vec<String> = tree
        .leaf_labels()
        .filter(|label| re.is_match(label))
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        warn!("{what} regex {pattern:?} matches no taxa");
    } else {
        debug!(count = labels.len(), "{what} taxa selected");
    }
    labels
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let t0 = Instant::now();
    let tree = match read_tree(&args.tree) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read tree {:?}: {e}", args.tree);
            std::process::exit(2);
        }
    };
    info!("Read {} taxa in {:.3}s", tree.n_leaves(), t0.elapsed().as_secs_f64());

    let mut options = SolverOptions::new()
        .with_prior_centers(select_labels(&tree, args.prior_regex.as_deref(), "prior"))
        .with_excluded(select_labels(&tree, args.exclude_rep_regex.as_deref(), "excluded"))
        .with_fully_excluded(select_labels(&tree, args.exclude_fully_regex.as_deref(), "fully excluded"));
    if let Some(radius) = args.radius {
        options = options.with_radius(radius);
    }

    let solver = match MedoidSolver::new(&tree, &options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(3);
        }
    };

    let t1 = Instant::now();
    let outcome = if args.cover {
        min_cover(&solver)
    } else {
        solver.solve(args.n.unwrap_or_default()).map(Some)
    };
    let result = match outcome {
        Ok(Some(r)) => r,
        Ok(None) => {
            eprintln!("No selection of at most {} taxa covers every taxon", solver.pool_size());
            std::process::exit(3);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(3);
        }
    };
    info!(
        "Chose {} representatives with cost {} in {:.3}s",
        result.representatives.len(),
        result.cost,
        t1.elapsed().as_secs_f64()
    );
    if result.representatives.is_empty() && result.cost == 0.0 && !options.prior_centers.is_empty() {
        info!("Prior centers already cover every taxon");
    }

    for label in &result.representatives {
        println!("{label}");
    }

    if args.color.is_none() && args.assignments.is_none() {
        return;
    }
    let assignment = match solver.assign(&result) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(3);
        }
    };

    if let Some(path) = &args.color {
        let t2 = Instant::now();
        let coloring = CladeColoring::new(&assignment, &result.representatives, &options.prior_centers);
        if let Err(e) = write_colored_nexus(path, &tree, &coloring) {
            eprintln!("Failed to write colored tree {path:?}: {e}");
            std::process::exit(4);
        }
        log_write_done(path, t2.elapsed().as_secs_f64());
    }
    if let Some(path) = &args.assignments {
        let t3 = Instant::now();
        if let Err(e) = write_assignments_tsv(path, &assignment) {
            eprintln!("Failed to write assignments {path:?}: {e}");
            std::process::exit(4);
        }
        log_write_done(path, t3.elapsed().as_secs_f64());
    }
}

fn log_write_done(path: &Path, secs: f64) {
    if path.as_os_str() == "-" {
        info!("Writing to stdout {secs:.3}s");
    } else {
        info!("Writing {} {secs:.3}s", path.display());
    }
}
