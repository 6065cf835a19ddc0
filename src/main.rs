use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trackfolio::{config, output, pipeline, scan};

#[derive(Parser)]
#[command(name = "trackfolio")]
#[command(about = "Static site generator for music portfolios")]
#[command(long_about = "\
Static site generator for music portfolios

Your filesystem is the data source. Each directory under tracks/ is one
track: a markdown file with YAML front matter, a lossless WAV master, and
cover art.

Content structure:

  tracks/
  ├── my-song/
  │   ├── info.md              # front matter (title, year, tags…) + notes
  │   ├── master.wav           # the lossless master
  │   ├── cover.jpg            # first sorted image becomes the cover
  │   └── studio.png           # further images join the detail page
  └── example-track/           # starter content, never built
  assets/                      # static assets → copied to the output root

Configuration comes from the environment (or a .env file): store
credentials, bucket and base URL, site text, encoder settings. Run
'trackfolio gen-env' for a documented template. Without store
configuration the site still builds; audio is just not uploaded.")]
#[command(version)]
struct Cli {
    /// Tracks directory
    #[arg(long, default_value = "tracks", global = true)]
    tracks: PathBuf,

    /// Output directory
    #[arg(long, default_value = "site", global = true)]
    output: PathBuf,

    /// Static assets directory (copied through when present)
    #[arg(long, default_value = "assets", global = true)]
    assets: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → encode → publish → render
    Build {
        /// Skip encode and publish; only re-render the site
        #[arg(long)]
        static_only: bool,
    },
    /// Validate the tracks directory without building
    Check,
    /// Print the scan result as JSON
    Scan,
    /// Print a documented .env template with all options
    GenEnv,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Seed the environment from .env before anything reads it.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Build { static_only } => {
            let (config, warnings) = config::Config::load();
            for warning in &warnings {
                eprintln!("Warning: {warning}");
            }

            let options = pipeline::BuildOptions {
                tracks_dir: cli.tracks,
                output_dir: cli.output,
                assets_dir: cli.assets,
                static_only,
            };
            let summary = pipeline::build(&config, &options)?;
            output::print_summary(&summary);
        }
        Command::Check => {
            let result = scan::scan_tracks(&cli.tracks)?;
            output::print_scan(&result);
            if result.tracks.is_empty() {
                return Err("no valid tracks found".into());
            }
            println!("Content is valid");
        }
        Command::Scan => {
            let result = scan::scan_tracks(&cli.tracks)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::GenEnv => {
            print!("{}", config::stock_env_template());
        }
    }

    Ok(())
}
