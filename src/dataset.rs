use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DatasetError, Result};
use crate::gap_repair::{repair, LeadingGapPolicy};
use crate::table::RawTable;
use crate::types::{ActivityLabel, ChannelRange, DEFAULT_SEC_PER_FRAME, FEATURES_PER_FRAME};
use crate::window_builder::{FeatureMatrix, WindowBuilder};

/// Qué hacer cuando una grabación no tiene ninguna fila completa
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRecordingPolicy {
    /// Aborta la construcción completa
    #[default]
    Abort,
    /// Omite la grabación, la registra con `warn!` y la lista en `Dataset::skipped`
    SkipAndWarn,
}

/// Parámetros de construcción del dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Duración de cada ventana en segundos
    pub window_duration_secs: f64,
    /// Periodo de muestreo de las grabaciones (default: 0.008333)
    #[serde(default = "default_sec_per_frame")]
    pub sec_per_frame: f64,
    #[serde(default)]
    pub on_empty_recording: EmptyRecordingPolicy,
    #[serde(default)]
    pub leading_gaps: LeadingGapPolicy,
}

fn default_sec_per_frame() -> f64 {
    DEFAULT_SEC_PER_FRAME
}

impl DatasetConfig {
    pub fn new(window_duration_secs: f64) -> Self {
        Self {
            window_duration_secs,
            sec_per_frame: DEFAULT_SEC_PER_FRAME,
            on_empty_recording: EmptyRecordingPolicy::default(),
            leading_gaps: LeadingGapPolicy::default(),
        }
    }

    /// Número de frames por ventana: floor(duración / periodo), al menos 1
    pub fn frames_per_window(&self) -> Result<usize> {
        let invalid = || DatasetError::InvalidWindowDuration {
            duration_secs: self.window_duration_secs,
            sec_per_frame: self.sec_per_frame,
        };

        if !self.window_duration_secs.is_finite()
            || !self.sec_per_frame.is_finite()
            || self.sec_per_frame <= 0.0
        {
            return Err(invalid());
        }

        let frames = (self.window_duration_secs / self.sec_per_frame).floor();
        if frames < 1.0 {
            return Err(invalid());
        }
        // El ancho de fila (6 * frames) tiene que caber en usize
        let frames = frames as usize;
        FEATURES_PER_FRAME.checked_mul(frames).ok_or_else(invalid)?;
        Ok(frames)
    }
}

/// Entrada del manifiesto: la tabla cruda ya cargada, su bloque de canales y su etiqueta
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub id: String,
    pub table: RawTable,
    pub channels: ChannelRange,
    pub label: ActivityLabel,
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        table: RawTable,
        channels: ChannelRange,
        label: ActivityLabel,
    ) -> Self {
        Self {
            id: id.into(),
            table,
            channels,
            label,
        }
    }
}

/// Aporte de una grabación al dataset
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub id: String,
    pub label: ActivityLabel,
    pub raw_rows: usize,
    pub dense_rows: usize,
    pub windows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecording {
    pub id: String,
    pub error: DatasetError,
}

/// Una muestra del dataset: fila de características y su etiqueta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub features: &'a [f32],
    pub label: ActivityLabel,
}

/// Dataset etiquetado, inmutable una vez construido
#[derive(Debug, Clone)]
pub struct Dataset {
    features: FeatureMatrix,
    labels: Vec<ActivityLabel>,
    frames_per_window: usize,
    recordings: Vec<RecordingSummary>,
    skipped: Vec<SkippedRecording>,
}

impl Dataset {
    /// Repara y ventanea cada grabación en orden y concatena sus filas.
    /// Todas las ventanas de una grabación llevan la etiqueta de su entrada.
    pub fn assemble(manifest: &[ManifestEntry], config: &DatasetConfig) -> Result<Self> {
        let frames_per_window = config.frames_per_window()?;
        let builder = WindowBuilder::new(frames_per_window, config.sec_per_frame);

        let mut features = FeatureMatrix::new(builder.feature_width());
        let mut labels = Vec::new();
        let mut recordings = Vec::with_capacity(manifest.len());
        let mut skipped = Vec::new();

        for entry in manifest {
            let dense = match repair(&entry.table, entry.channels, config.leading_gaps) {
                Ok(dense) => dense,
                Err(DatasetError::EmptyRecording { .. })
                    if config.on_empty_recording == EmptyRecordingPolicy::SkipAndWarn =>
                {
                    warn!(recording = %entry.id, "grabación sin filas completas, se omite");
                    skipped.push(SkippedRecording {
                        id: entry.id.clone(),
                        error: DatasetError::EmptyRecording {
                            recording: entry.id.clone(),
                        },
                    });
                    continue;
                }
                Err(e) => return Err(e.for_recording(&entry.id)),
            };

            let batch = builder.build(&dense);
            let windows = batch.window_count();
            debug!(
                recording = %entry.id,
                label = %entry.label,
                dense_rows = dense.len(),
                windows,
                "grabación procesada"
            );

            labels.extend(std::iter::repeat(entry.label).take(windows));
            features.append(&mut batch.into_features());
            recordings.push(RecordingSummary {
                id: entry.id.clone(),
                label: entry.label,
                raw_rows: entry.table.num_rows(),
                dense_rows: dense.len(),
                windows,
            });
        }

        info!(
            recordings = recordings.len(),
            skipped = skipped.len(),
            samples = labels.len(),
            frames_per_window,
            "dataset construido"
        );

        Ok(Self {
            features,
            labels,
            frames_per_window,
            recordings,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Acceso por índice; fuera de [0, len) falla con `IndexOutOfRange`
    pub fn at(&self, index: isize) -> Result<Sample<'_>> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn get(&self, index: usize) -> Option<Sample<'_>> {
        let label = *self.labels.get(index)?;
        let features = self.features.row(index)?;
        Some(Sample { features, label })
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample<'_>> + '_ {
        self.features
            .rows()
            .zip(self.labels.iter())
            .map(|(features, &label)| Sample { features, label })
    }

    pub fn frames_per_window(&self) -> usize {
        self.frames_per_window
    }

    pub fn feature_width(&self) -> usize {
        self.features.width()
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn labels(&self) -> &[ActivityLabel] {
        &self.labels
    }

    /// Número de muestras por clase, indexado por `ActivityLabel::index`
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for label in &self.labels {
            counts[label.index() as usize] += 1;
        }
        counts
    }

    pub fn recordings(&self) -> &[RecordingSummary] {
        &self.recordings
    }

    pub fn skipped(&self) -> &[SkippedRecording] {
        &self.skipped
    }
}
