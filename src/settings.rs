//! Run settings: what the `wavesum` binary should load, save and show.
//!
//! Settings come from three layers. CLI flags override a settings file
//! (YAML or JSON), which overrides the built-in defaults. Both the CLI and
//! the file produce a [`RunSettings`] with every field optional, and
//! [`RunSettings::resolve`] fills the gaps.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::DatasetOptions;

pub const DEFAULT_SAVE_PATH: &str = "./added_data.csv";
pub const IMAGE_EXTENSION: &str = ".png";

// ---------------------------------------------------------------------------
// One settings layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    pub csv_file_path: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub new_data_name: Option<String>,
    pub save_path: Option<PathBuf>,
    pub save_graph: Option<bool>,
    pub fillna: Option<bool>,
    pub fillna_value: Option<f64>,
    pub fmt: Option<String>,
    pub save_graph_name: Option<String>,
    pub loader: Option<String>,
    pub comments: Option<String>,
    pub show_window: Option<bool>,
    pub title: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub csv_file_path: PathBuf,
    pub options: DatasetOptions,
    pub save_path: PathBuf,
    pub save_graph: bool,
    /// Image path without extension.
    pub save_graph_name: String,
    pub show_window: bool,
    pub title: String,
}

impl RunSettings {
    /// Read a settings file, picking the format from its extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open settings file: {}", path.display()))?;

        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)
                .with_context(|| format!("Invalid YAML settings: {}", path.display())),
            "json" => serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON settings: {}", path.display())),
            other => bail!("Unsupported settings file extension: .{other}"),
        }
    }

    /// Field-wise merge: values in `self` win over `lower`.
    pub fn over(self, lower: RunSettings) -> RunSettings {
        RunSettings {
            csv_file_path: self.csv_file_path.or(lower.csv_file_path),
            delimiter: self.delimiter.or(lower.delimiter),
            new_data_name: self.new_data_name.or(lower.new_data_name),
            save_path: self.save_path.or(lower.save_path),
            save_graph: self.save_graph.or(lower.save_graph),
            fillna: self.fillna.or(lower.fillna),
            fillna_value: self.fillna_value.or(lower.fillna_value),
            fmt: self.fmt.or(lower.fmt),
            save_graph_name: self.save_graph_name.or(lower.save_graph_name),
            loader: self.loader.or(lower.loader),
            comments: self.comments.or(lower.comments),
            show_window: self.show_window.or(lower.show_window),
            title: self.title.or(lower.title),
        }
    }

    /// Apply defaults and validate the dataset options.
    pub fn resolve(self) -> Result<RunConfig> {
        let Some(csv_file_path) = self.csv_file_path else {
            bail!("No input CSV file given (pass CSV_FILE or set csv_file_path)");
        };

        let mut updates: Vec<(&str, String)> = Vec::new();
        if let Some(v) = self.delimiter {
            updates.push(("delimiter", v));
        }
        if let Some(v) = self.new_data_name {
            updates.push(("added_header", v));
        }
        if let Some(v) = self.fillna {
            updates.push(("fillna", v.to_string()));
        }
        if let Some(v) = self.fillna_value {
            updates.push(("fillna_value", v.to_string()));
        }
        if let Some(v) = self.fmt {
            updates.push(("fmt", v));
        }
        if let Some(v) = self.loader {
            updates.push(("loader", v));
        }
        if let Some(v) = self.comments {
            updates.push(("comments", v));
        }

        let mut options = DatasetOptions::default();
        options
            .set_many(updates.iter().map(|(k, v)| (*k, v.as_str())))
            .context("Invalid dataset options")?;

        let save_path = self
            .save_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));
        let save_graph_name = self
            .save_graph_name
            .map(|name| strip_suffix(&name, IMAGE_EXTENSION).to_string())
            .unwrap_or_else(|| default_image_name(&save_path));
        let title = self.title.unwrap_or_else(|| {
            csv_file_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "wavesum".to_string())
        });

        Ok(RunConfig {
            csv_file_path,
            options,
            save_path,
            save_graph: self.save_graph.unwrap_or(false),
            save_graph_name,
            show_window: self.show_window.unwrap_or(true),
            title,
        })
    }
}

/// The save path with a trailing `.csv` removed.
pub fn default_image_name(save_path: &Path) -> String {
    let text = save_path.to_string_lossy();
    strip_suffix(&text, crate::data::path::CSV_EXTENSION).to_string()
}

fn strip_suffix<'a>(s: &'a str, suffix: &str) -> &'a str {
    s.strip_suffix(suffix).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderKind;

    fn with_input() -> RunSettings {
        RunSettings {
            csv_file_path: Some(PathBuf::from("data/waves.csv")),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_gaps() {
        let cfg = with_input().resolve().unwrap();
        assert_eq!(cfg.options, DatasetOptions::default());
        assert_eq!(cfg.save_path, PathBuf::from("./added_data.csv"));
        assert_eq!(cfg.save_graph_name, "./added_data");
        assert!(!cfg.save_graph);
        assert!(cfg.show_window);
        assert_eq!(cfg.title, "waves");
    }

    #[test]
    fn cli_overrides_file() {
        let file = RunSettings {
            delimiter: Some(";".into()),
            new_data_name: Some("total".into()),
            loader: Some("arrow".into()),
            save_path: Some(PathBuf::from("out/sum.csv")),
            ..Default::default()
        };
        let cli = RunSettings {
            delimiter: Some("\\t".into()),
            ..with_input()
        };
        let cfg = cli.over(file).resolve().unwrap();
        assert_eq!(cfg.options.delimiter, b'\t');
        assert_eq!(cfg.options.added_header, "total");
        assert_eq!(cfg.options.loader, LoaderKind::Arrow);
        assert_eq!(cfg.save_graph_name, "out/sum");
    }

    #[test]
    fn image_name_drops_png_suffix() {
        let cfg = RunSettings {
            save_graph_name: Some("plots/run1.png".into()),
            ..with_input()
        }
        .resolve()
        .unwrap();
        assert_eq!(cfg.save_graph_name, "plots/run1");
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(RunSettings::default().resolve().is_err());
    }

    #[test]
    fn bad_option_value_is_reported() {
        let err = RunSettings {
            loader: Some("polars".into()),
            ..with_input()
        }
        .resolve()
        .unwrap_err();
        assert!(format!("{err:#}").contains("polars"));
    }

    #[test]
    fn reads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("run.yaml");
        std::fs::write(&yaml, "csv_file_path: in.csv\nsave_graph: true\nfmt: \"%.3f\"\n").unwrap();
        let s = RunSettings::from_file(&yaml).unwrap();
        assert_eq!(s.save_graph, Some(true));
        assert_eq!(s.fmt.as_deref(), Some("%.3f"));

        let json = dir.path().join("run.json");
        std::fs::write(&json, r#"{"csv_file_path": "in.csv", "fillna": false}"#).unwrap();
        let s = RunSettings::from_file(&json).unwrap();
        assert_eq!(s.fillna, Some(false));
    }

    #[test]
    fn rejects_unknown_keys_and_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("run.yml");
        std::fs::write(&yaml, "csv_file_path: in.csv\ncolour: red\n").unwrap();
        assert!(RunSettings::from_file(&yaml).is_err());

        let toml = dir.path().join("run.toml");
        std::fs::write(&toml, "x = 1").unwrap();
        assert!(RunSettings::from_file(&toml).is_err());
    }
}
