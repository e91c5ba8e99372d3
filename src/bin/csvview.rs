use clap::{Parser, Subcommand};
use csvview::config::ExportConfig;
use csvview::build;
use csvview::export::{export_file, write_dataset};
use csvview::{filename, input, logger};
use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "csvview", version, about = "Export NDJSON records to CSV through a declarative column mapping", long_about = None)]
struct Cli {
    /// Path to a log4rs YAML file; otherwise CSVVIEW_LOG_* env vars are used
    #[arg(long, global = true)]
    log_config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Export records to CSV using the columns in a mapping config")]
    Export {
        #[arg(long, help = "Mapping config (TOML) with [[columns]] label/path entries")]
        config: PathBuf,
        #[arg(long, help = "NDJSON input, one JSON object per line")]
        input: PathBuf,
        #[arg(long, help = "Output file or directory; prints to stdout if omitted")]
        output: Option<PathBuf>,
        #[arg(long, help = "Display timezone: UTC, local, an IANA name like America/Chicago, or an offset like -05:00")]
        timezone: Option<String>,
        #[arg(long, help = "Join multi-line text with ', '")]
        strip_newlines: bool,
        #[arg(long, help = "Field delimiter (single ASCII character)")]
        delimiter: Option<char>,
    },
    #[command(about = "List the column headers a mapping config produces")]
    Columns {
        #[arg(long, help = "Mapping config (TOML)")]
        config: PathBuf,
    },
}

fn load_config(path: &Path) -> Result<ExportConfig, Box<dyn std::error::Error>> {
    // Precedence: CLI > env > config file > defaults
    let mut cfg = ExportConfig::load(path)?;
    cfg.apply_env();
    Ok(cfg)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match &cli.log_config {
        Some(p) => logger::init_path(p)?,
        None => {
            logger::configure_from_env()?;
        }
    }

    match cli.command {
        Commands::Export { config, input, output, timezone, strip_newlines, delimiter } => {
            let mut cfg = load_config(&config)?;
            if timezone.is_some() {
                cfg.timezone = timezone;
            }
            if strip_newlines {
                cfg.allow_newlines = Some(false);
            }
            if delimiter.is_some() {
                cfg.delimiter = delimiter;
            }
            let mapping = cfg.mapping()?;
            let options = cfg.format_options()?;
            let csv_opts = cfg.csv_options()?;
            let docs = input::read_ndjson(BufReader::new(File::open(&input)?))?;

            match output {
                Some(mut path) => {
                    if path.is_dir() {
                        let name = filename::today_filename(cfg.entity.as_deref(), &options.timezone);
                        path.push(format!("{name}.csv"));
                    }
                    let report = export_file(&path, &mapping, &docs, &options, &csv_opts)?;
                    if std::io::stderr().is_terminal() {
                        eprintln!("wrote {} rows to {}", report.written, path.display());
                    }
                }
                None => {
                    // Build first: stdout stays empty if any record fails
                    let dataset = build(&mapping, &docs, &options)?;
                    write_dataset(std::io::stdout().lock(), &dataset, &csv_opts)?;
                }
            }
            Ok(())
        }
        Commands::Columns { config } => {
            let cfg = load_config(&config)?;
            for label in cfg.mapping()?.labels() {
                println!("{label}");
            }
            Ok(())
        }
    }
}
