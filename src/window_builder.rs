use tracing::debug;

use crate::table::DenseTable;
use crate::types::{DerivedRow, DEFAULT_SEC_PER_FRAME, FEATURES_PER_FRAME};

/// Matriz de características en orden de filas: una fila por ventana
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    width: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            data: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.data.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        let start = idx.checked_mul(self.width)?;
        self.data.get(start..start + self.width)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.width.max(1))
    }

    /// Añade todas las filas de `other` al final (mismo ancho)
    pub fn append(&mut self, other: &mut FeatureMatrix) {
        debug_assert_eq!(self.width, other.width);
        self.data.append(&mut other.data);
    }
}

/// Ventanas de una grabación
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch {
    features: FeatureMatrix,
}

impl WindowBatch {
    pub fn window_count(&self) -> usize {
        self.features.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.features.rows()
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn into_features(self) -> FeatureMatrix {
        self.features
    }
}

/// Calcula las filas derivadas: la fila 0 sólo sirve de referencia para la velocidad
pub fn derive_rows(dense: &DenseTable, sec_per_frame: f64) -> Vec<DerivedRow> {
    dense
        .frames()
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let dx = cur.pos[0] - prev.pos[0];
            let dy = cur.pos[1] - prev.pos[1];
            let dz = cur.pos[2] - prev.pos[2];
            DerivedRow {
                rot: cur.rot,
                y_pos: cur.pos[1],
                vertical_velocity: dy / sec_per_frame,
                horizontal_velocity: (dx * dx + dz * dz).sqrt() / sec_per_frame,
            }
        })
        .collect()
}

/// Agrupa filas derivadas en ventanas de `frames_per_window` frames
#[derive(Debug, Clone, Copy)]
pub struct WindowBuilder {
    frames_per_window: usize,
    sec_per_frame: f64,
}

impl WindowBuilder {
    /// `frames_per_window` se acota a [1, usize::MAX / 6] (`DatasetConfig` ya lo valida)
    pub fn new(frames_per_window: usize, sec_per_frame: f64) -> Self {
        Self {
            frames_per_window: frames_per_window.clamp(1, usize::MAX / FEATURES_PER_FRAME),
            sec_per_frame,
        }
    }

    pub fn frames_per_window(&self) -> usize {
        self.frames_per_window
    }

    /// Ancho de cada fila de características: 6 * frames_per_window
    pub fn feature_width(&self) -> usize {
        FEATURES_PER_FRAME * self.frames_per_window
    }

    pub fn build(&self, dense: &DenseTable) -> WindowBatch {
        let derived = derive_rows(dense, self.sec_per_frame);

        // El resto que no completa una ventana se descarta, nunca se rellena
        let valid_count = derived.len() - derived.len() % self.frames_per_window;
        let window_count = valid_count / self.frames_per_window;

        let mut features = FeatureMatrix::new(self.feature_width());
        features.data = vec![0.0; window_count * self.feature_width()];

        for (window, out) in derived[..valid_count]
            .chunks_exact(self.frames_per_window)
            .zip(features.data.chunks_exact_mut(self.feature_width()))
        {
            for (t, row) in window.iter().enumerate() {
                row.to_flat_array(out, t);
            }
        }

        debug!(
            frames = dense.len(),
            derived = derived.len(),
            dropped = derived.len() - valid_count,
            windows = window_count,
            "ventanas construidas"
        );

        WindowBatch { features }
    }
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self::new(1, DEFAULT_SEC_PER_FRAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> DenseTable {
        DenseTable::from(
            (0..n)
                .map(|i| {
                    let v = i as f64;
                    [v, 10.0 + v, 20.0 + v, 2.0 * v, v * v, 0.0]
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_vertical_velocity_scenario() {
        let dense = DenseTable::from(vec![
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 3.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 6.0, 0.0],
        ]);
        let batch = WindowBuilder::new(1, 1.0).build(&dense);
        assert_eq!(batch.window_count(), 3);

        let rows: Vec<&[f32]> = batch.rows().collect();
        assert_eq!(rows[0], &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(rows[1], &[0.0, 0.0, 0.0, 3.0, 2.0, 0.0]);
        assert_eq!(rows[2], &[0.0, 0.0, 0.0, 6.0, 3.0, 0.0]);
    }

    #[test]
    fn test_horizontal_velocity_uses_x_and_z() {
        let dense = DenseTable::from(vec![
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 3.0, 7.0, 4.0],
        ]);
        let derived = derive_rows(&dense, 0.5);
        assert_eq!(derived.len(), 1);
        assert_relative_eq!(derived[0].horizontal_velocity, 10.0);
        assert_relative_eq!(derived[0].vertical_velocity, 14.0);
        assert_relative_eq!(derived[0].y_pos, 7.0);
    }

    #[test]
    fn test_window_count_and_width() {
        for n in 0..20 {
            for w in 1..6 {
                let batch = WindowBuilder::new(w, 0.01).build(&ramp(n));
                let expected = if n < 2 { 0 } else { (n - 1) / w };
                assert_eq!(batch.window_count(), expected, "n={} w={}", n, w);
                assert!(batch.rows().all(|r| r.len() == 6 * w));
            }
        }
    }

    #[test]
    fn test_frames_per_window_is_clamped() {
        assert_eq!(WindowBuilder::new(0, 1.0).frames_per_window(), 1);
        let wide = WindowBuilder::new(usize::MAX, 1.0);
        assert_eq!(wide.feature_width(), 6 * (usize::MAX / 6));
        assert_eq!(wide.build(&ramp(10)).window_count(), 0);
    }

    #[test]
    fn test_short_tables_yield_nothing() {
        let builder = WindowBuilder::new(1, DEFAULT_SEC_PER_FRAME);
        assert_eq!(builder.build(&DenseTable::default()).window_count(), 0);
        assert_eq!(builder.build(&ramp(1)).window_count(), 0);
    }

    #[test]
    fn test_rows_are_time_major() {
        // 7 frames -> 6 filas derivadas -> 2 ventanas de 3, sin resto
        let batch = WindowBuilder::new(3, 1.0).build(&ramp(7));
        assert_eq!(batch.window_count(), 2);
        let second = batch.features().row(1).unwrap();
        // Primera fila derivada de la segunda ventana = frame 4
        assert_eq!(&second[..4], &[4.0, 14.0, 24.0, 16.0]);
        assert_relative_eq!(second[4], 7.0); // 16 - 9
        assert_relative_eq!(second[5], 2.0); // |dx| = 2
        // Última fila derivada = frame 6
        assert_eq!(&second[12..16], &[6.0, 16.0, 26.0, 36.0]);
    }

    #[test]
    fn test_remainder_is_truncated() {
        // 6 frames -> 5 derivadas -> 2 ventanas de 2, se pierde la última
        let batch = WindowBuilder::new(2, 1.0).build(&ramp(6));
        assert_eq!(batch.window_count(), 2);
        let last = batch.features().row(1).unwrap();
        assert_eq!(last[6], 4.0);
        assert!(batch.features().row(2).is_none());
    }
}
