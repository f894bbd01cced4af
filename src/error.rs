use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Grabación '{recording}' sin ninguna fila con los 6 canales observados")]
    EmptyRecording { recording: String },

    #[error("Duración de ventana inválida: {duration_secs}s con {sec_per_frame}s por frame no alcanza un frame")]
    InvalidWindowDuration { duration_secs: f64, sec_per_frame: f64 },

    #[error("Índice {index} fuera de rango (longitud {len})")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Selección de canales inválida en '{recording}': {reason}")]
    InvalidChannelSelection { recording: String, reason: String },

    #[error("Grabación '{recording}': columna {column} sin valor observado en las primeras {rows} filas")]
    LeadingGap {
        recording: String,
        column: usize,
        rows: usize,
    },
}

impl DatasetError {
    /// Asocia el error al identificador de la grabación que lo produjo
    pub fn for_recording(self, id: &str) -> Self {
        match self {
            Self::EmptyRecording { .. } => Self::EmptyRecording {
                recording: id.to_string(),
            },
            Self::InvalidChannelSelection { reason, .. } => Self::InvalidChannelSelection {
                recording: id.to_string(),
                reason,
            },
            Self::LeadingGap { column, rows, .. } => Self::LeadingGap {
                recording: id.to_string(),
                column,
                rows,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
