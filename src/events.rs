use std::path::Path;

use crate::config::{DatasetOptions, LoaderKind};
use crate::error::DataError;

/// Something notable that happened inside a [`crate::Dataset`].
#[derive(Debug)]
pub enum DatasetEvent<'a> {
    Loaded {
        path: &'a Path,
        rows: usize,
        channels: usize,
        loader: LoaderKind,
    },
    LoadFailed {
        path: &'a Path,
        error: &'a DataError,
    },
    /// The header line could not be used as-is: either the header-skipping
    /// parse failed and line one was read as data, or names were generated.
    HeaderFallback {
        path: &'a Path,
        synthesized: bool,
    },
    Saved {
        path: &'a Path,
        rows: usize,
        header: &'a str,
    },
    DirectoryCreated {
        path: &'a Path,
    },
    OptionsUpdated {
        options: &'a DatasetOptions,
    },
}

/// Receives [`DatasetEvent`]s. The dataset itself never prints.
pub trait DatasetObserver {
    fn on_event(&self, event: &DatasetEvent<'_>);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl DatasetObserver for LogObserver {
    fn on_event(&self, event: &DatasetEvent<'_>) {
        match event {
            DatasetEvent::Loaded {
                path,
                rows,
                channels,
                loader,
            } => log::info!(
                "Loaded {} ({loader} loader): {channels} channels without timestamp, {rows} rows",
                path.display()
            ),
            DatasetEvent::LoadFailed { path, error } => {
                log::error!("Failed to load {}: {error}", path.display())
            }
            DatasetEvent::HeaderFallback { path, synthesized } => {
                if *synthesized {
                    log::warn!(
                        "{}: first line is numeric, generated column names",
                        path.display()
                    )
                } else {
                    log::warn!(
                        "{}: parsing after the header failed, read line one as data",
                        path.display()
                    )
                }
            }
            DatasetEvent::Saved { path, rows, header } => log::info!(
                "Saved {rows} rows to {} with header: {header}",
                path.display()
            ),
            DatasetEvent::DirectoryCreated { path } => {
                log::warn!("Directory created: {}", path.display())
            }
            DatasetEvent::OptionsUpdated { options } => log::info!(
                "Options updated: delimiter={:?} fmt={} loader={} added_header={:?} fillna={} fillna_value={} comments={:?}",
                options.delimiter_char(),
                options.fmt,
                options.loader,
                options.added_header,
                options.fillna,
                options.fillna_value,
                options.comments
            ),
        }
    }
}
