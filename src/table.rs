use crate::types::{TrackedFrame, NUM_TRACKED_CHANNELS};

/// Tabla cruda de una grabación: filas = instantes, columnas = canales.
/// `None` marca un valor ausente.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<f64>>>) -> Self {
        Self { headers, rows }
    }

    /// Tabla sin cabeceras; las columnas se nombran por su índice
    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let headers = (0..width).map(|c| c.to_string()).collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Columnas presentes en todas las filas. Sin filas, el ancho de las cabeceras.
    pub fn num_columns(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .min()
            .unwrap_or(self.headers.len())
    }
}

/// Salida de la reparación de huecos: 6 canales densos, sin valores ausentes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseTable {
    frames: Vec<TrackedFrame>,
}

impl DenseTable {
    pub fn new(frames: Vec<TrackedFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[TrackedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Vuelve a la forma cruda (columnas 0..6), útil para reaplicar la reparación
    pub fn to_raw_table(&self) -> RawTable {
        let headers = ["x_rot", "y_rot", "z_rot", "x_pos", "y_pos", "z_pos"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows = self
            .frames
            .iter()
            .map(|f| f.to_channels().iter().map(|&v| Some(v)).collect())
            .collect();
        RawTable::new(headers, rows)
    }
}

impl From<Vec<[f64; NUM_TRACKED_CHANNELS]>> for DenseTable {
    fn from(rows: Vec<[f64; NUM_TRACKED_CHANNELS]>) -> Self {
        Self::new(rows.into_iter().map(TrackedFrame::from_channels).collect())
    }
}
