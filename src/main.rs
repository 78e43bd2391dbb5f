use anyhow::{Context, Result};
use clap::Parser;
use hotelviz::config::{Config, OutputFormat};
use hotelviz::parser::{self, Target};
use hotelviz::{logging, render, Dashboard, Dataset};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hotelviz")]
#[command(about = "Compute hotel-booking dashboard charts from a CSV dataset", long_about = None)]
struct Args {
    /// Chart request (e.g., 'lead_time_distribution(hotel: "City Hotel", range: 0..120)' or 'all()')
    request: String,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Booking CSV, overrides `data_path` from the config
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (single chart) or directory (`all` with png/svg); stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(format) = self.format {
            config.render.format = format;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    logging::initialize(&config.log_level).context("Failed to initialize logging")?;

    let request = parser::parse(&args.request).context("Invalid chart request")?;

    let dataset = Dataset::load(&config.data_path).context("Failed to load dataset")?;
    let dashboard = Dashboard::new(dataset);

    match request.target {
        Target::Chart(chart) => {
            let desc = dashboard.compute(chart, &request.hotel, request.range);
            let bytes = render::render(&desc, &config.render)
                .with_context(|| format!("Failed to render {chart}"))?;
            write_output(args.output.as_deref(), &bytes)?;
        }
        Target::All => {
            let descs = dashboard.compute_all(&request.hotel, request.range);
            if config.render.format == OutputFormat::Json {
                let bytes = serde_json::to_vec_pretty(&descs)
                    .context("Failed to serialize chart descriptions")?;
                write_output(args.output.as_deref(), &bytes)?;
            } else {
                let dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                for desc in &descs {
                    let bytes = render::render(desc, &config.render)
                        .with_context(|| format!("Failed to render {}", desc.chart))?;
                    let path = dir.join(format!("{}.{}", desc.chart, config.render.format.extension()));
                    write_output(Some(&path), &bytes)?;
                }
            }
        }
    }

    Ok(())
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "wrote chart");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(bytes)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}
