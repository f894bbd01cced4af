use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DatasetError, Result};
use crate::table::{DenseTable, RawTable};
use crate::types::{ChannelRange, TrackedFrame, NUM_TRACKED_CHANNELS};

/// Qué hacer con valores ausentes antes de la primera observación de una columna.
/// La interpolación lineal no puede resolverlos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadingGapPolicy {
    /// Falla la grabación con `DatasetError::LeadingGap`
    #[default]
    Reject,
    /// Copia hacia atrás el primer valor observado de cada columna
    Backfill,
    /// Descarta las filas iniciales hasta que todas las columnas tengan valor
    Trim,
}

/// Recorta las filas finales incompletas, interpola huecos interiores y
/// devuelve los 6 canales seguidos como tabla densa.
pub fn repair(
    table: &RawTable,
    channels: ChannelRange,
    leading: LeadingGapPolicy,
) -> Result<DenseTable> {
    let columns = select_columns(table, channels)?;

    // Última fila con los 6 canales observados
    let valid_len = (0..table.num_rows())
        .rev()
        .find(|&r| columns.iter().all(|col| col[r].is_some()))
        .map(|r| r + 1)
        .ok_or_else(|| DatasetError::EmptyRecording {
            recording: String::new(),
        })?;

    let mut firsts = [0usize; NUM_TRACKED_CHANNELS];
    for (c, col) in columns.iter().enumerate() {
        // valid_len - 1 está observada en todas las columnas
        firsts[c] = col[..valid_len]
            .iter()
            .position(Option::is_some)
            .unwrap_or(valid_len - 1);
    }

    let trim = match leading {
        LeadingGapPolicy::Reject => {
            if let Some((c, &rows)) = firsts.iter().enumerate().find(|&(_, &f)| f > 0) {
                return Err(DatasetError::LeadingGap {
                    recording: String::new(),
                    column: channels.start() + c,
                    rows,
                });
            }
            0
        }
        LeadingGapPolicy::Backfill => 0,
        LeadingGapPolicy::Trim => firsts.iter().copied().max().unwrap_or(0),
    };

    let mut dense: Vec<Vec<f64>> = Vec::with_capacity(NUM_TRACKED_CHANNELS);
    let mut filled = 0usize;
    for (col, &first) in columns.iter().zip(&firsts) {
        let observed = &col[first..valid_len];
        filled += observed.iter().filter(|v| v.is_none()).count();
        let mut values = interpolate_linear(observed);
        if first > 0 && leading == LeadingGapPolicy::Backfill {
            let mut backfilled = vec![values[0]; first];
            backfilled.append(&mut values);
            values = backfilled;
        } else if trim > first {
            values.drain(..trim - first);
        }
        dense.push(values);
    }

    let len = valid_len - trim;
    let frames = (0..len)
        .map(|r| TrackedFrame::from_channels(std::array::from_fn(|c| dense[c][r])))
        .collect();

    debug!(
        rows = table.num_rows(),
        valid_len,
        trimmed = trim,
        interpolated = filled,
        "huecos reparados"
    );

    Ok(DenseTable::new(frames))
}

/// Extrae las 6 columnas seleccionadas; NaN cuenta como ausente
fn select_columns(
    table: &RawTable,
    channels: ChannelRange,
) -> Result<[Vec<Option<f64>>; NUM_TRACKED_CHANNELS]> {
    let out_of_bounds = || DatasetError::InvalidChannelSelection {
        recording: String::new(),
        reason: format!(
            "columnas desde {} fuera de una tabla de {} columnas",
            channels.start(),
            table.num_columns()
        ),
    };
    let end = channels.end().ok_or_else(out_of_bounds)?;
    if end > table.num_columns() {
        return Err(out_of_bounds());
    }

    let mut columns: [Vec<Option<f64>>; NUM_TRACKED_CHANNELS] =
        std::array::from_fn(|_| Vec::with_capacity(table.num_rows()));

    for (r, row) in table.rows().iter().enumerate() {
        for (c, col) in columns.iter_mut().enumerate() {
            let value = match row.get(channels.start() + c).copied().flatten() {
                Some(v) if v.is_nan() => None,
                Some(v) if v.is_infinite() => {
                    return Err(DatasetError::InvalidChannelSelection {
                        recording: String::new(),
                        reason: format!(
                            "valor no finito en fila {} columna {}",
                            r,
                            channels.start() + c
                        ),
                    });
                }
                other => other,
            };
            col.push(value);
        }
    }

    Ok(columns)
}

/// Interpolación lineal sobre el índice de fila. El primer y el último valor
/// deben estar observados.
fn interpolate_linear(column: &[Option<f64>]) -> Vec<f64> {
    let mut out = Vec::with_capacity(column.len());
    let mut last: Option<(usize, f64)> = None;

    for (i, value) in column.iter().enumerate() {
        let Some(b) = *value else { continue };
        if let Some((i0, a)) = last {
            let span = (i - i0) as f64;
            for k in i0 + 1..i {
                out.push(a + (b - a) * (k - i0) as f64 / span);
            }
        }
        out.push(b);
        last = Some((i, b));
    }

    out
}
