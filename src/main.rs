use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use wavesum::plot::{render, Labels, StackedPlot};
use wavesum::settings::{RunConfig, RunSettings, IMAGE_EXTENSION};
use wavesum::{app, Dataset};

/// Add a row-sum column to a CSV time series, save it and plot every channel.
#[derive(Parser, Debug)]
#[command(name = "wavesum", version, about)]
struct Cli {
    /// Input CSV: first column is time, the rest are channels
    csv_file: Option<PathBuf>,

    /// Field delimiter (single character, or `\t`)
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Header of the summed column [default: synthetic wave]
    #[arg(short = 'n', long)]
    new_data_name: Option<String>,

    /// Where to write the augmented CSV [default: ./added_data.csv]
    #[arg(short, long)]
    save_path: Option<PathBuf>,

    /// Also save the plot as a PNG image
    #[arg(short = 'g', long)]
    save_graph: bool,

    /// Keep missing cells as NaN instead of filling them
    #[arg(long)]
    no_fillna: bool,

    /// Value used for missing cells [default: 0]
    #[arg(long)]
    fillna_value: Option<f64>,

    /// printf-style number format for the output [default: %.8g]
    ///
    /// The default keeps 8 significant digits without padding. Pass `%8g`
    /// for the older 8-wide, 6-digit form.
    #[arg(short, long)]
    fmt: Option<String>,

    /// Image path without extension [default: save path minus .csv]
    #[arg(short, long)]
    image_name: Option<String>,

    /// Table backend: csv or arrow [default: csv]
    #[arg(long)]
    loader: Option<String>,

    /// Prefix written before the output header [default: "# "]
    #[arg(long)]
    comments: Option<String>,

    /// Settings file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not open the interactive viewer
    #[arg(long)]
    no_window: bool,

    /// Plot title [default: input file stem]
    #[arg(long)]
    title: Option<String>,
}

impl Cli {
    /// Flags as a settings layer; unset switches stay `None` so a settings
    /// file can still turn them on.
    fn settings(&self) -> RunSettings {
        RunSettings {
            csv_file_path: self.csv_file.clone(),
            delimiter: self.delimiter.clone(),
            new_data_name: self.new_data_name.clone(),
            save_path: self.save_path.clone(),
            save_graph: self.save_graph.then_some(true),
            fillna: self.no_fillna.then_some(false),
            fillna_value: self.fillna_value,
            fmt: self.fmt.clone(),
            save_graph_name: self.image_name.clone(),
            loader: self.loader.clone(),
            comments: self.comments.clone(),
            show_window: self.no_window.then_some(false),
            title: self.title.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = cli.settings();
    if let Some(path) = &cli.config {
        settings = settings.over(RunSettings::from_file(path)?);
    }
    let config = settings.resolve()?;
    run(&config)
}

fn run(config: &RunConfig) -> Result<()> {
    let dataset = Dataset::open(&config.csv_file_path, config.options.clone())
        .with_context(|| format!("Failed to load {}", config.csv_file_path.display()))?;

    dataset
        .save(&config.save_path, None)
        .with_context(|| format!("Failed to save {}", config.save_path.display()))?;

    let (combined, timestamps) = dataset.get_data(true)?;
    let mut labels: Vec<String> = dataset.header_fields()?.iter().skip(1).cloned().collect();
    labels.push(config.options.added_header.clone());

    let plot = StackedPlot::new(
        combined,
        timestamps,
        Labels::List(labels),
        config.title.as_str(),
        "Time",
    )?;

    if config.save_graph {
        render::save_plot(&plot, &config.save_graph_name, IMAGE_EXTENSION)
            .context("Failed to save plot image")?;
    }

    if config.show_window {
        app::show(plot)?;
    }
    Ok(())
}
