//! Construcción de datasets de posturas (de pie, sentado, caminando) a partir de
//! grabaciones de captura de movimiento: reparación de huecos, ventaneo y
//! características cinemáticas por ventana.

pub mod csv_loader;
pub mod dataset;
pub mod error;
pub mod gap_repair;
pub mod manifest;
pub mod table;
pub mod types;
pub mod window_builder;

pub use dataset::{Dataset, DatasetConfig, EmptyRecordingPolicy, ManifestEntry, Sample};
pub use error::DatasetError;
pub use gap_repair::{repair, LeadingGapPolicy};
pub use table::{DenseTable, RawTable};
pub use types::{ActivityLabel, ChannelRange};
pub use window_builder::{WindowBatch, WindowBuilder};
