use clap::{Parser, Subcommand};
use gallery_variants::types::{ImageRecord, SourceImage};
use gallery_variants::{catalog, config, favicon, imaging, naming, output, process};
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gallery-variants")]
#[command(about = "Generate responsive image variants and site icons")]
#[command(long_about = "\
Generate responsive image variants and site icons

Every image in a library is rendered at a fixed set of sizes plus a social
preview crop, and written to the processed directory:

  data/images/processed/
  ├── images.json                  # One entry per image with all its variants
  ├── ada-dawn.webp                # Archival original (3000px)
  ├── ada-dawn-900x450.webp
  ├── ada-dawn-1200x600.webp
  ├── ada-dawn-2400x1200.webp
  ├── ada-dawn-3000x1500.webp
  └── ada-dawn-meta.png            # 1910x1000 social preview

The processed directory is wiped at the start of every run.

The library is a JSON array of image records:

  [{ \"id\": 1, \"name\": \"Dawn\", \"authorName\": \"Ada\",
     \"sourcePath\": \"data/images/originals/1.jpg\" }]

Run 'gallery-variants gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Path to config.toml (stock defaults are used if it does not exist)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate every variant of every image in a library
    Process {
        /// JSON file holding the image records
        library: PathBuf,
    },
    /// Render favicons and app icons from one source image
    Icons {
        /// Source image
        source: PathBuf,
        /// Identity the icon files are swept by
        #[arg(long, default_value = "favicon")]
        name: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    match cli.command {
        Command::Process { library } => {
            let app_config = config::load_config(&cli.config)?;
            init_thread_pool(&app_config.processing);
            let catalog = catalog::Catalog::from_config(&app_config);

            let records: Vec<ImageRecord> =
                serde_json::from_str(&std::fs::read_to_string(&library)?)?;
            let processed_dir = &app_config.dirs.processed;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = spawn_printer(rx);
            let batch = process::process_library(&catalog, &records, processed_dir, Some(&tx));
            drop(tx);
            join_printer(printer)?;
            let batch = batch?;

            write_json(&processed_dir.join("images.json"), &batch.results)?;
            output::print_batch_summary(&batch);
        }
        Command::Icons { source, name } => {
            let app_config = config::load_config(&cli.config)?;
            init_thread_pool(&app_config.processing);
            let catalog = catalog::Catalog::from_config(&app_config);

            let identity = naming::compose_identity(&name, None, true);
            let source_image = SourceImage::read(0, identity, &source)?;
            let backend = imaging::RustBackend::new();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = spawn_printer(rx);
            let groups = favicon::process_favicon(
                &backend,
                &catalog,
                &source_image,
                &app_config.dirs.icons,
                Some(&tx),
            );
            drop(tx);
            join_printer(printer)?;
            let groups = groups?;

            std::fs::create_dir_all(&app_config.dirs.processed)?;
            write_json(&app_config.dirs.processed.join("icons.json"), &groups)?;
            let records = favicon::icon_records(&groups, catalog.default_icon_size);
            write_json(&app_config.dirs.icons.join("icons.json"), &records)?;
            output::print_icon_groups(&groups);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores; config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn spawn_printer(
    rx: std::sync::mpsc::Receiver<process::ProcessEvent>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    })
}

fn join_printer(printer: std::thread::JoinHandle<()>) -> Result<(), Box<dyn std::error::Error>> {
    printer
        .join()
        .map_err(|_| "progress printer thread panicked".into())
}

fn write_json<T: serde::Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
