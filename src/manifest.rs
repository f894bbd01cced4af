use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::csv_loader::{load_table_from_csv, MOCAP_METADATA_ROWS};
use crate::dataset::{DatasetConfig, ManifestEntry};
use crate::types::{ActivityLabel, ChannelRange};

/// Etiqueta en el manifiesto: nombre ("walking") o índice (2)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum LabelValue {
    Index(u8),
    Name(ActivityLabel),
}

impl LabelValue {
    fn resolve(self) -> Result<ActivityLabel> {
        match self {
            Self::Name(label) => Ok(label),
            Self::Index(idx) => ActivityLabel::from_index(idx)
                .ok_or_else(|| anyhow!("Etiqueta {} fuera de rango (0..=2)", idx)),
        }
    }
}

fn default_skip_rows() -> usize {
    MOCAP_METADATA_ROWS
}

#[derive(Debug, Clone, Deserialize)]
struct RecordingItem {
    id: Option<String>,
    path: PathBuf,
    channel_start: usize,
    label: LabelValue,
    #[serde(default = "default_skip_rows")]
    skip_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    config: Option<DatasetConfig>,
    recordings: Vec<RecordingItem>,
}

/// Manifiesto JSON: lista explícita de grabaciones con su bloque de canales y etiqueta.
/// Las rutas relativas se resuelven desde el directorio del manifiesto.
#[derive(Debug, Clone)]
pub struct Manifest {
    base_dir: PathBuf,
    file: ManifestFile,
}

impl Manifest {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("No se pudo leer el manifiesto {:?}", path))?;
        let file: ManifestFile = serde_json::from_str(&content)
            .with_context(|| format!("Manifiesto JSON inválido {:?}", path))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self { base_dir, file })
    }

    pub fn config(&self) -> Option<&DatasetConfig> {
        self.file.config.as_ref()
    }

    pub fn len(&self) -> usize {
        self.file.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.recordings.is_empty()
    }

    /// Carga todas las tablas en el orden del manifiesto
    pub fn load_entries(&self) -> Result<Vec<ManifestEntry>> {
        self.file
            .recordings
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let path = self.base_dir.join(&item.path);
                let id = item
                    .id
                    .clone()
                    .unwrap_or_else(|| item.path.display().to_string());
                let label = item
                    .label
                    .resolve()
                    .with_context(|| format!("Entrada {} ({}) del manifiesto", idx, id))?;
                let table = load_table_from_csv(&path, item.skip_rows)?;
                debug!(recording = %id, rows = table.num_rows(), "tabla cargada");
                Ok(ManifestEntry::new(
                    id,
                    table,
                    ChannelRange::new(item.channel_start),
                    label,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, EmptyRecordingPolicy};
    use crate::gap_repair::LeadingGapPolicy;

    fn write_csv(dir: &Path, name: &str, frames: usize) {
        let mut content = String::from("Frame,Time,RX,RY,RZ,X,Y,Z\n");
        for i in 0..frames {
            content.push_str(&format!("{},{},0,0,0,0,{},0\n", i, i as f64 * 0.5, i));
        }
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_manifest_loads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "a.csv", 4);
        write_csv(dir.path(), "b.csv", 6);
        let manifest_path = dir.path().join("manifest.json");
        fs::write(
            &manifest_path,
            r#"{
                "config": { "window_duration_secs": 0.5, "sec_per_frame": 0.5,
                            "on_empty_recording": "skip_and_warn", "leading_gaps": "backfill" },
                "recordings": [
                    { "id": "a", "path": "a.csv", "channel_start": 2, "label": "sitting", "skip_rows": 0 },
                    { "path": "b.csv", "channel_start": 2, "label": 2, "skip_rows": 0 }
                ]
            }"#,
        )
        .unwrap();

        let manifest = Manifest::from_path(&manifest_path).unwrap();
        let config = manifest.config().cloned().unwrap();
        assert_eq!(config.on_empty_recording, EmptyRecordingPolicy::SkipAndWarn);
        assert_eq!(config.leading_gaps, LeadingGapPolicy::Backfill);

        let entries = manifest.load_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a");
        assert_eq!(entries[1].id, "b.csv");
        assert_eq!(entries[1].label, ActivityLabel::Walking);

        let dataset = Dataset::assemble(&entries, &config).unwrap();
        assert_eq!(dataset.len(), 8);
        assert_eq!(dataset.class_counts(), [0, 3, 5]);
    }

    #[test]
    fn test_label_index_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "a.csv", 2);
        let manifest_path = dir.path().join("manifest.json");
        fs::write(
            &manifest_path,
            r#"{ "recordings": [ { "path": "a.csv", "channel_start": 2, "label": 7 } ] }"#,
        )
        .unwrap();

        let manifest = Manifest::from_path(&manifest_path).unwrap();
        assert!(manifest.config().is_none());
        assert!(manifest.load_entries().is_err());
    }

    #[test]
    fn test_missing_csv_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.json");
        fs::write(
            &manifest_path,
            r#"{ "recordings": [ { "path": "nope.csv", "channel_start": 0, "label": "standing" } ] }"#,
        )
        .unwrap();
        let err = Manifest::from_path(&manifest_path)
            .unwrap()
            .load_entries()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("nope.csv"));
    }
}
