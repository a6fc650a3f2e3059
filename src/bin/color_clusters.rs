//! Cluster items by average color and print the groups.
//!
//! Items come either from a JSON color table (`--table`) or from a directory
//! of images (`--images`) whose average pixel color is sampled on load.
//!
//! Usage: `color-clusters --table state_colors.json -k 4 --reruns 2 --plot scene.json`

#[macro_use]
extern crate log;

use clap::{ArgGroup, Parser};
use colorkmeans_rs::report::{Camera, ClusterReport, PlotScene};
use colorkmeans_rs::source::write_color_table;
use colorkmeans_rs::{ColorKMeans, ColorProvider, ColorTable, ImageDirectory, KMeansConfig};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "color-clusters")]
#[command(about = "Group items by average RGB color with best-of-N k-means")]
#[command(version)]
#[command(group(ArgGroup::new("input").required(true).args(["table", "images"])))]
struct Args {
    /// JSON color table (name, color, rgbString, thumbnail records)
    #[arg(long)]
    table: Option<PathBuf>,

    /// Directory of images to sample average colors from
    #[arg(long)]
    images: Option<PathBuf>,

    /// Thumbnail directory referenced by items sampled from --images
    #[arg(long, default_value = "thumbnails")]
    thumbnails: PathBuf,

    /// Write the sampled color table to this path
    #[arg(long, requires = "images")]
    write_table: Option<PathBuf>,

    /// Number of clusters
    #[arg(short, long, default_value_t = 4)]
    k: usize,

    /// Lloyd iterations per restart
    #[arg(long, default_value_t = 20)]
    iterations: usize,

    /// Number of random restarts
    #[arg(long, default_value_t = 32)]
    restarts: usize,

    /// Random seed (fresh randomness on every run when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Recompute from scratch this many extra times
    #[arg(long, default_value_t = 0)]
    reruns: usize,

    /// Write the 3D plot scene of the final run as JSON
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = match (&args.table, &args.images) {
        (Some(table), _) => ColorTable::new(table).load()?,
        (None, Some(dir)) => {
            let items = ImageDirectory::new(dir, &args.thumbnails).load()?;
            if let Some(path) = &args.write_table {
                write_color_table(&items, path)?;
            }
            items
        }
        (None, None) => return Err("one of --table or --images is required".into()),
    };

    let mut config = KMeansConfig::new(args.k)
        .with_iterations_per_run(args.iterations)
        .with_n_restarts(args.restarts);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut kmeans = ColorKMeans::with_config(config);
    let mut scene: Option<PlotScene> = None;

    for run in 0..=args.reruns {
        // a fixed seed would repeat the same result on every rerun
        if let Some(seed) = args.seed {
            let config = kmeans.config().clone().with_seed(seed.wrapping_add(run as u64));
            kmeans = ColorKMeans::with_config(config);
        }

        let result = kmeans.cluster_items(&mut items)?;
        let report = ClusterReport::new(&items, result)?;
        if args.reruns > 0 {
            println!("=== Run {} ===", run + 1);
        }
        print!("{}", report);

        scene = Some(match scene.take() {
            Some(previous) => previous.rerender(&items, result)?,
            None => PlotScene::new(Camera::default(), &items, result)?,
        });
    }

    if let (Some(path), Some(scene)) = (&args.plot, &scene) {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, scene)?;
        info!("Wrote plot scene to {}", path.display());
    }

    Ok(())
}
