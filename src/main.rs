use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datapackager::{config::Config, extent, package, package::Resource, schema, tdf};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[clap(name = "datapackager", version)]
struct Arguments {
    /// YAML config file.
    #[clap(long, env = "DATAPACKAGER_CONFIG")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the inferred JSON Table Schema of a CSV file.
    Schema { csv: PathBuf },
    /// Print the temporal extent of one column (zero-based) of a CSV file.
    Extent { csv: PathBuf, column: String },
    /// Convert a CKAN dataset JSON document into TDF attributes.
    Convert { dataset: PathBuf },
    /// Write a Data Package zip from a CKAN dataset document and CSV files.
    Package {
        dataset: PathBuf,
        /// CSV files or glob patterns.
        #[clap(required = true)]
        csv: Vec<String>,
        #[clap(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    let config = Config::load(args.config.as_deref()).context("loading config")?;

    // logs go to stderr, results to stdout
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Schema { csv } => {
            let schema = schema::infer_schema(&csv)
                .with_context(|| format!("inferring schema of {}", csv.display()))?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Extent { csv, column } => {
            let column = extent::parse_column_index(&column)?;
            let interval = extent::temporal_extent(&csv, column)
                .with_context(|| format!("temporal extent of {}", csv.display()))?;
            println!("{}", interval);
        }
        Command::Convert { dataset } => {
            let doc = read_json(&dataset)?;
            let tdf = tdf::convert_json(&doc)?;
            println!("{}", serde_json::to_string_pretty(&tdf)?);
        }
        Command::Package {
            dataset,
            csv,
            output,
        } => {
            let doc = read_json(&dataset)?;
            let attrs = doc
                .as_object()
                .with_context(|| format!("{} is not a JSON object", dataset.display()))?;

            let resources = package::expand_inputs(&csv)?
                .into_iter()
                .map(|path| {
                    Resource::from_csv(&path)
                        .with_context(|| format!("inferring schema of {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;

            let descriptor = package::build_descriptor(attrs, &resources, &config.package)?;
            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut out =
                package::write_zip(BufWriter::new(file), &descriptor, &resources, &config.package)?;
            out.flush()?;
            info!(output = %output.display(), resources = resources.len(), "wrote data package");
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
