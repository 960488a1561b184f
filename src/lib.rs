pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod events;
pub mod plot;
pub mod settings;
pub mod state;
pub mod ui;

pub use config::{DatasetOptions, LoaderKind};
pub use dataset::Dataset;
pub use error::DataError;
