/*
Constructor de datasets de posturas

Lee un manifiesto JSON con grabaciones de captura de movimiento (CSV exportado),
repara huecos, ventanea cada grabación y escribe un CSV plano `label,f0,...`
listo para entrenar un clasificador (0 de pie, 1 sentado, 2 caminando).

Ejemplo:
    RUST_LOG=debug ./target/release/posturas datos/manifest.json --window 0.5 -o dataset.csv
*/

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use posturas::csv_loader::write_dataset_csv_to_path;
use posturas::manifest::Manifest;
use posturas::types::ActivityLabel;
use posturas::{Dataset, DatasetConfig, EmptyRecordingPolicy, LeadingGapPolicy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnEmpty {
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LeadingGaps {
    Reject,
    Backfill,
    Trim,
}

#[derive(Debug, Parser)]
#[command(name = "posturas", version, about = "Construye un dataset de ventanas etiquetadas")]
struct Args {
    /// Manifiesto JSON con las grabaciones
    manifest: PathBuf,

    /// Duración de cada ventana en segundos (sobrescribe el manifiesto)
    #[arg(short, long)]
    window: Option<f64>,

    /// Periodo de muestreo en segundos
    #[arg(long)]
    sec_per_frame: Option<f64>,

    /// Política para grabaciones sin filas completas
    #[arg(long, value_enum)]
    on_empty: Option<OnEmpty>,

    /// Política para huecos al inicio de una columna
    #[arg(long, value_enum)]
    leading_gaps: Option<LeadingGaps>,

    /// CSV de salida
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn resolve_config(args: &Args, manifest: &Manifest) -> Result<DatasetConfig> {
    let mut config = match (manifest.config(), args.window) {
        (Some(config), _) => config.clone(),
        (None, Some(window)) => DatasetConfig::new(window),
        (None, None) => {
            return Err(anyhow!(
                "Falta la duración de ventana: usa --window o \"config\" en el manifiesto"
            ))
        }
    };

    if let Some(window) = args.window {
        config.window_duration_secs = window;
    }
    if let Some(spf) = args.sec_per_frame {
        config.sec_per_frame = spf;
    }
    if let Some(policy) = args.on_empty {
        config.on_empty_recording = match policy {
            OnEmpty::Abort => EmptyRecordingPolicy::Abort,
            OnEmpty::Skip => EmptyRecordingPolicy::SkipAndWarn,
        };
    }
    if let Some(policy) = args.leading_gaps {
        config.leading_gaps = match policy {
            LeadingGaps::Reject => LeadingGapPolicy::Reject,
            LeadingGaps::Backfill => LeadingGapPolicy::Backfill,
            LeadingGaps::Trim => LeadingGapPolicy::Trim,
        };
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let manifest = Manifest::from_path(&args.manifest)?;
    let config = resolve_config(&args, &manifest)?;

    println!("📂 Manifiesto {:?}: {} grabaciones", args.manifest, manifest.len());
    let entries = manifest.load_entries()?;
    let dataset = Dataset::assemble(&entries, &config)?;

    println!(
        "\n✅ {} muestras de {} valores ({} frames por ventana)",
        dataset.len(),
        dataset.feature_width(),
        dataset.frames_per_window()
    );
    let counts = dataset.class_counts();
    for label in ActivityLabel::ALL {
        println!("  {:<14} {:>6}", label.to_string(), counts[label.index() as usize]);
    }
    for skipped in dataset.skipped() {
        println!("⚠️  Omitida: {} ({})", skipped.id, skipped.error);
    }

    if let Some(output) = &args.output {
        write_dataset_csv_to_path(&dataset, output)?;
        println!("\n💾 Dataset escrito en {:?}", output);
    }

    Ok(())
}
