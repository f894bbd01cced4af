use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Periodo de muestreo del sistema de captura (120 Hz)
pub const DEFAULT_SEC_PER_FRAME: f64 = 0.008333;

/// Canales seguidos por grabación: [x_rot, y_rot, z_rot, x_pos, y_pos, z_pos]
pub const NUM_TRACKED_CHANNELS: usize = 6;

/// Valores por fila derivada: [x_rot, y_rot, z_rot, y_pos, v_vertical, v_horizontal]
pub const FEATURES_PER_FRAME: usize = 6;

/// Una muestra densa (sin huecos) de los 6 canales seguidos
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackedFrame {
    /// Rotaciones x, y, z
    pub rot: [f64; 3],
    /// Posiciones x, y, z
    pub pos: [f64; 3],
}

impl TrackedFrame {
    /// Crea un TrackedFrame desde una fila en el orden de la tabla cruda
    pub fn from_channels(ch: [f64; NUM_TRACKED_CHANNELS]) -> Self {
        Self {
            rot: [ch[0], ch[1], ch[2]],
            pos: [ch[3], ch[4], ch[5]],
        }
    }

    pub fn to_channels(&self) -> [f64; NUM_TRACKED_CHANNELS] {
        [
            self.rot[0],
            self.rot[1],
            self.rot[2],
            self.pos[0],
            self.pos[1],
            self.pos[2],
        ]
    }
}

/// Fila derivada de una muestra y su predecesora
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedRow {
    pub rot: [f64; 3],
    pub y_pos: f64,
    pub vertical_velocity: f64,
    pub horizontal_velocity: f64,
}

impl DerivedRow {
    /// Escribe la fila en formato plano dentro de una fila de características.
    /// Layout: [t][c] donde t=frame dentro de la ventana, c=canal derivado
    pub fn to_flat_array(&self, output: &mut [f32], time_idx: usize) {
        let base_idx = time_idx * FEATURES_PER_FRAME;
        output[base_idx] = self.rot[0] as f32;
        output[base_idx + 1] = self.rot[1] as f32;
        output[base_idx + 2] = self.rot[2] as f32;
        output[base_idx + 3] = self.y_pos as f32;
        output[base_idx + 4] = self.vertical_velocity as f32;
        output[base_idx + 5] = self.horizontal_velocity as f32;
    }
}

/// Bloque contiguo de 6 columnas que contiene los canales seguidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRange {
    start: usize,
}

impl ChannelRange {
    pub fn new(start: usize) -> Self {
        Self { start }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Fin exclusivo del bloque; `None` si no cabe en `usize`
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(NUM_TRACKED_CHANNELS)
    }

    pub fn columns(&self) -> Option<Range<usize>> {
        Some(self.start..self.end()?)
    }
}

/// Estado de actividad asociado a una grabación completa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLabel {
    Standing = 0,
    Sitting = 1,
    Walking = 2,
}

impl ActivityLabel {
    pub const ALL: [ActivityLabel; 3] = [Self::Standing, Self::Sitting, Self::Walking];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standing => "standing",
            Self::Sitting => "sitting",
            Self::Walking => "walking",
        }
    }
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_range_spans_six_columns() {
        assert_eq!(ChannelRange::new(2).columns(), Some(2..8));
        assert_eq!(ChannelRange::new(29).end(), Some(35));
        assert_eq!(ChannelRange::new(usize::MAX - 2).end(), None);
        assert_eq!(ChannelRange::new(usize::MAX - 2).columns(), None);
    }

    #[test]
    fn test_label_indices() {
        assert_eq!(ActivityLabel::Standing.index(), 0);
        assert_eq!(ActivityLabel::Sitting.index(), 1);
        assert_eq!(ActivityLabel::Walking.index(), 2);
        assert_eq!(ActivityLabel::from_index(2), Some(ActivityLabel::Walking));
        assert_eq!(ActivityLabel::from_index(3), None);
    }

    #[test]
    fn test_label_serde_names() {
        let label: ActivityLabel = serde_json::from_str("\"sitting\"").unwrap();
        assert_eq!(label, ActivityLabel::Sitting);
        assert_eq!(serde_json::to_string(&ActivityLabel::Walking).unwrap(), "\"walking\"");
    }

    #[test]
    fn test_derived_row_flat_layout() {
        let row = DerivedRow {
            rot: [1.0, 2.0, 3.0],
            y_pos: 4.0,
            vertical_velocity: 5.0,
            horizontal_velocity: 6.0,
        };
        let mut flat = vec![0.0f32; 12];
        row.to_flat_array(&mut flat, 1);
        assert_eq!(&flat[..6], &[0.0; 6]);
        assert_eq!(&flat[6..], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
