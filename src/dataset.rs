use std::path::{Path, PathBuf};

use crate::config::DatasetOptions;
use crate::data::aggregate::append_row_sum;
use crate::data::loader::{load_csv, LoadOptions};
use crate::data::model::Matrix;
use crate::data::writer::{write_table, WriteOptions};
use crate::error::{DataError, Result};
use crate::events::{DatasetEvent, DatasetObserver, LogObserver};

// ---------------------------------------------------------------------------
// Dataset state
// ---------------------------------------------------------------------------

/// Everything produced by one successful load.
#[derive(Debug, Clone)]
struct Loaded {
    source: PathBuf,
    timestamps: Vec<f64>,
    channels: Matrix,
    /// Timestamp name followed by one name per channel.
    header: Vec<String>,
    /// `channels` plus the row-sum column, computed at load time.
    combined: Matrix,
}

#[derive(Debug, Clone)]
enum State {
    Empty,
    Loaded(Loaded),
}

/// A time-series table with a derived row-sum column.
///
/// Created empty (or loaded straight away with [`Dataset::open`]); every
/// accessor fails with [`DataError::DataNotLoaded`] until a load succeeds.
/// Loading again replaces all state; a failed load keeps the previous one.
pub struct Dataset {
    options: DatasetOptions,
    state: State,
    observer: Box<dyn DatasetObserver>,
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset::new(DatasetOptions::default())
    }
}

impl Dataset {
    pub fn new(options: DatasetOptions) -> Self {
        Dataset::with_observer(options, Box::new(LogObserver))
    }

    pub fn with_observer(options: DatasetOptions, observer: Box<dyn DatasetObserver>) -> Self {
        Dataset {
            options,
            state: State::Empty,
            observer,
        }
    }

    /// Create a dataset and load `path` immediately.
    pub fn open(path: impl AsRef<Path>, options: DatasetOptions) -> Result<Self> {
        let mut dataset = Dataset::new(options);
        dataset.load(path)?;
        Ok(dataset)
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// Update options by key; unknown keys fail with
    /// [`DataError::InvalidOption`] and leave the options unchanged.
    pub fn set_options<'a>(
        &mut self,
        updates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        self.options.set_many(updates)?;
        self.observer.on_event(&DatasetEvent::OptionsUpdated {
            options: &self.options,
        });
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    fn loaded(&self) -> Result<&Loaded> {
        match &self.state {
            State::Loaded(loaded) => Ok(loaded),
            State::Empty => Err(DataError::DataNotLoaded),
        }
    }

    /// Load `path`, split timestamps from channels and cache the combined
    /// table.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match self.read(path) {
            Ok(loaded) => {
                self.observer.on_event(&DatasetEvent::Loaded {
                    path,
                    rows: loaded.timestamps.len(),
                    channels: loaded.channels.cols(),
                    loader: self.options.loader,
                });
                self.state = State::Loaded(loaded);
                Ok(())
            }
            Err(error) => {
                self.observer
                    .on_event(&DatasetEvent::LoadFailed { path, error: &error });
                Err(error)
            }
        }
    }

    fn read(&self, path: &Path) -> Result<Loaded> {
        let table = load_csv(path, &LoadOptions::from(&self.options))?;
        if !table.header_skipped || table.header_synthesized {
            self.observer.on_event(&DatasetEvent::HeaderFallback {
                path,
                synthesized: table.header_synthesized,
            });
        }

        let (timestamps, channels) = table.matrix.split_first_column();
        if channels.cols() == 0 {
            return Err(DataError::csv_read(path, "no channel columns"));
        }
        let combined = append_row_sum(&channels, None)?;

        Ok(Loaded {
            source: path.to_path_buf(),
            timestamps,
            channels,
            header: table.header,
            combined,
        })
    }

    /// Path of the most recent successful load.
    pub fn source(&self) -> Result<&Path> {
        Ok(&self.loaded()?.source)
    }

    /// `(table, timestamps)`. With `combined` the table includes the
    /// derived column; otherwise it is the raw channels.
    pub fn get_data(&self, combined: bool) -> Result<(&Matrix, &[f64])> {
        let loaded = self.loaded()?;
        let table = if combined {
            &loaded.combined
        } else {
            &loaded.channels
        };
        Ok((table, &loaded.timestamps))
    }

    /// Header fields as loaded: timestamp name, then channel names.
    pub fn header_fields(&self) -> Result<&[String]> {
        Ok(&self.loaded()?.header)
    }

    /// Comma-joined header; with `combined`, `added_header` is appended.
    pub fn header(&self, combined: bool) -> Result<String> {
        let mut fields = self.loaded()?.header.clone();
        if combined {
            fields.push(self.options.added_header.clone());
        }
        Ok(fields.join(","))
    }

    /// Channels with the row sum of `targets` (all channels when `None`)
    /// appended. The cached combined table is not changed.
    pub fn aggregate(&self, targets: Option<&[usize]>) -> Result<Matrix> {
        append_row_sum(&self.loaded()?.channels, targets)
    }

    /// Write timestamps plus the combined table to `path`.
    ///
    /// The derived column is named `label`, or `added_header` when `None`.
    /// Returns the written table and the comma-joined header.
    pub fn save(&self, path: impl AsRef<Path>, label: Option<&str>) -> Result<(Matrix, String)> {
        let path = path.as_ref();
        let loaded = self.loaded()?;

        let mut fields = loaded.header.clone();
        fields.push(label.unwrap_or(&self.options.added_header).to_string());
        let header = fields.join(",");
        let file_header = fields.join(self.options.delimiter_char().to_string().as_str());

        let table = loaded.combined.with_leading_column(&loaded.timestamps);
        let summary = write_table(path, &table, &file_header, &WriteOptions::from(&self.options))?;

        if let Some(dir) = &summary.created_dir {
            self.observer
                .on_event(&DatasetEvent::DirectoryCreated { path: dir });
        }
        self.observer.on_event(&DatasetEvent::Saved {
            path,
            rows: summary.rows,
            header: &header,
        });
        Ok((table, header))
    }
}
