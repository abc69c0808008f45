use adaptive_picture::{Catalog, HtmlContentTransformer, TransformOptions, config, output, site};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "adaptive-picture")]
#[command(about = "Rewrite document-library <img> tags into responsive <picture> elements")]
#[command(long_about = "\
Rewrite document-library <img> tags into responsive <picture> elements

Images tagged with data-fileEntryId=\"<id>\" are looked up in the catalog.
When resized variants exist, the tag becomes a <picture> with one <source>
per width breakpoint; otherwise it is left untouched.

Catalog format (catalog.json):

  {
    \"version\": 1,
    \"entries\": [
      { \"file_entry_id\": 1989, \"file_version_id\": 2001,
        \"variants\": [
          { \"uri\": \"https://cdn.example.com/a-800.jpg\", \"width\": 800 }
        ] }
    ]
  }

Run 'adaptive-picture gen-config' to generate a documented adaptive.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Catalog of file entries and their adaptive media
    #[arg(long, default_value = "catalog.json", global = true)]
    catalog: PathBuf,

    /// Directory containing adaptive.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log every skipped image
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite a single HTML file (or stdin)
    Transform {
        /// Input file; omit or pass '-' to read stdin
        input: Option<PathBuf>,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Rewrite every HTML file under a directory into an output tree
    Build {
        #[arg(long, default_value = "site")]
        source: PathBuf,
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Validate config and catalog without transforming anything
    Check,
    /// Print a stock adaptive.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Transform {
            input,
            output: out_path,
        } => {
            let settings = config::load_config(&cli.config)?;
            let catalog = Catalog::load(&cli.catalog)?;
            let transformer = HtmlContentTransformer::new(&catalog, &catalog)
                .with_options(TransformOptions::from_config(&settings));

            let html = read_input(input.as_deref())?;
            let result = transformer.transform_detailed(&html);
            match out_path {
                Some(path) => std::fs::write(path, &result.html)?,
                None => std::io::stdout().write_all(result.html.as_bytes())?,
            }
            output::print_transform_report(&result.outcomes);
        }
        Command::Build {
            source,
            output: out_dir,
        } => {
            let settings = config::load_config(&cli.config)?;
            let catalog = Catalog::load(&cli.catalog)?;
            init_thread_pool(&settings.processing);
            let transformer = HtmlContentTransformer::new(&catalog, &catalog)
                .with_options(TransformOptions::from_config(&settings));

            println!("==> Building {} → {}", source.display(), out_dir.display());
            let report = site::build_site(&transformer, &source, &out_dir, &settings.site)?;
            output::print_site_report(&report);
        }
        Command::Check => {
            let settings = config::load_config(&cli.config)?;
            println!(
                "==> Config OK ({})",
                cli.config.join(config::CONFIG_FILENAME).display()
            );
            println!(
                "    configuration_status = {:?}",
                settings.transform.configuration_status
            );
            let catalog = Catalog::load(&cli.catalog)?;
            output::print_catalog_summary(&catalog);
            println!("==> Catalog is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "adaptive_picture=debug"
    } else {
        "adaptive_picture=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn read_input(input: Option<&Path>) -> std::io::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
