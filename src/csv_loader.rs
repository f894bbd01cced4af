use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

use crate::dataset::Dataset;
use crate::table::RawTable;

/// Líneas de metadatos antes de la cabecera en una exportación de Motive
pub const MOCAP_METADATA_ROWS: usize = 6;

/// Carga una tabla cruda desde un CSV: `skip_rows` líneas de metadatos, una fila
/// de cabecera y luego una fila por frame. Celdas vacías o `NaN` son valores ausentes.
pub fn load_table_from_csv(path: impl AsRef<Path>, skip_rows: usize) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;
    let mut buf = BufReader::new(file);

    // Los metadatos se saltan por líneas, no por registros CSV
    let mut meta = String::new();
    for skipped in 0..skip_rows {
        meta.clear();
        if buf.read_line(&mut meta)? == 0 {
            bail!("El CSV {:?} termina en la línea {} de metadatos", path, skipped + 1);
        }
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(buf);

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Cabecera inválida en {:?}", path))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        bail!("El CSV {:?} no contiene cabecera tras {} líneas", path, skip_rows);
    }

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let line = skip_rows + row_idx + 2;
        let record = result.with_context(|| format!("Fila {} inválida en {:?}", line, path))?;

        let mut row = Vec::with_capacity(headers.len().max(record.len()));
        for (col, cell) in record.iter().enumerate() {
            row.push(parse_cell(cell).with_context(|| {
                format!("Valor no numérico en fila {} columna {} de {:?}", line, col, path)
            })?);
        }
        // Filas cortas: el resto de columnas se considera ausente
        if row.len() < headers.len() {
            row.resize(headers.len(), None);
        }
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

fn parse_cell(cell: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value: f64 = cell.parse()?;
    Ok(Some(value))
}

/// Escribe el dataset como CSV: `label,f0,f1,...` con una fila por muestra
pub fn write_dataset_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut out = WriterBuilder::new().from_writer(writer);

    let mut header = Vec::with_capacity(dataset.feature_width() + 1);
    header.push("label".to_string());
    header.extend((0..dataset.feature_width()).map(|i| format!("f{}", i)));
    out.write_record(&header)?;

    for sample in dataset.iter() {
        ensure!(
            sample.features.len() == dataset.feature_width(),
            "Fila con {} valores, se esperaban {}",
            sample.features.len(),
            dataset.feature_width()
        );
        let mut record = Vec::with_capacity(header.len());
        record.push(sample.label.index().to_string());
        record.extend(sample.features.iter().map(|v| v.to_string()));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_dataset_csv_to_path(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("No se pudo crear {:?}", path))?;
    write_dataset_csv(dataset, std::io::BufWriter::new(file))
        .with_context(|| format!("Error escribiendo {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetConfig, ManifestEntry};
    use crate::types::{ActivityLabel, ChannelRange};

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_skips_metadata_and_reads_missing() {
        let file = write_tmp(
            "Format Version,1.23,Take Name,t1\n\
             \n\
             ,,Rigid Body\n\
             ,,Skeleton\n\
             ,,ID\n\
             ,,Rotation\n\
             Frame,Time (Seconds),X,Y,Z,X,Y,Z\n\
             0,0.0,1,2,3,4,5,6\n\
             1,0.008333,1,,3,NaN,5,6\n\
             2,0.016666,1,2\n",
        );
        let table = load_table_from_csv(file.path(), MOCAP_METADATA_ROWS).unwrap();
        assert_eq!(table.headers()[0], "Frame");
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 8);
        assert_eq!(table.rows()[1][3], None);
        assert_eq!(table.rows()[1][5], None);
        assert_eq!(table.rows()[2][4], None);
        assert_eq!(table.rows()[0][7], Some(6.0));
    }

    #[test]
    fn test_load_rejects_text_cells() {
        let file = write_tmp("a,b\n1,2\n3,oops\n");
        let err = load_table_from_csv(file.path(), 0).unwrap_err();
        assert!(format!("{:#}", err).contains("columna 1"));
    }

    #[test]
    fn test_load_without_header_fails() {
        let file = write_tmp("meta\n");
        assert!(load_table_from_csv(file.path(), 1).is_err());
    }

    #[test]
    fn test_write_dataset_csv() {
        let table = RawTable::from_rows(
            (0..3)
                .map(|i| vec![Some(0.0), Some(0.0), Some(0.0), Some(0.0), Some(i as f64), Some(0.0)])
                .collect(),
        );
        let manifest = vec![ManifestEntry::new(
            "r",
            table,
            ChannelRange::new(0),
            ActivityLabel::Walking,
        )];
        let config = DatasetConfig {
            sec_per_frame: 1.0,
            ..DatasetConfig::new(1.0)
        };
        let dataset = Dataset::assemble(&manifest, &config).unwrap();

        let mut buf = Vec::new();
        write_dataset_csv(&dataset, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "label,f0,f1,f2,f3,f4,f5");
        assert_eq!(lines[1], "2,0,0,0,1,1,0");
        assert_eq!(lines[2], "2,0,0,0,2,1,0");
        assert_eq!(lines.len(), 3);
    }
}
