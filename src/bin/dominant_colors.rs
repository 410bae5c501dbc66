use clap::Parser;
use std::path::PathBuf;
use dominant_colors::{ExtractOptions, ReferenceTable, extract_palette, load_image_path};
use anyhow::Context;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Extract the dominant colors of an image and name them.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the image file
    #[arg(short, long)]
    image: PathBuf,

    /// Number of colors to extract (chosen automatically when omitted)
    #[arg(short, long)]
    clusters: Option<usize>,

    /// Working width in pixels, aspect ratio kept (0 keeps the native size)
    #[arg(short, long, default_value_t = 250)]
    width: u32,

    /// JSON file mapping color names to [L, a, b] (built-in table when omitted)
    #[arg(long)]
    colors: Option<PathBuf>,

    /// Seed of the first k-means run
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Independent k-means runs per clustering
    #[arg(long, default_value_t = 3)]
    runs: usize,

    /// Pixels scored per candidate when choosing the number of colors (0 scores all)
    #[arg(long, default_value_t = 2000)]
    sample: usize,

    /// Print the palette as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let opts = ExtractOptions::default()
        .with_clusters(args.clusters)
        .with_seed(args.seed)
        .with_runs(args.runs)
        .with_silhouette_sample((args.sample > 0).then_some(args.sample))
        .with_resize_width((args.width > 0).then_some(args.width));

    let custom_table = match &args.colors {
        Some(path) => Some(
            ReferenceTable::from_path(path)
                .with_context(|| format!("loading color table {}", path.display()))?,
        ),
        None => None,
    };
    let table = match &custom_table {
        Some(table) => table,
        None => ReferenceTable::builtin().context("loading built-in color table")?,
    };

    let image = load_image_path(&args.image, opts.resize_width)
        .with_context(|| format!("loading image {}", args.image.display()))?;
    if opts.clusters.is_none() {
        eprintln!("Choosing the number of colors with the silhouette method...");
    }
    let palette = extract_palette(&image, &opts, table).context("color extraction failed")?;

    if args.json {
        let colors: Vec<serde_json::Value> = palette
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name,
                    "hex": c.hex(),
                    "rgb": c.rgb8(),
                    "lab": c.lab_components(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&colors)?);
    } else {
        println!("Dominant colors:");
        for (rank, c) in palette.iter().enumerate() {
            let [l, a, b] = c.lab_components();
            println!(
                "{:>2}. {:<22} #{}  L={l:6.2} a={a:7.2} b={b:7.2}",
                rank + 1,
                c.name,
                c.hex()
            );
        }
    }

    Ok(())
}
