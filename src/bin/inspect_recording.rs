use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use posturas::csv_loader::{load_table_from_csv, MOCAP_METADATA_ROWS};
use posturas::types::DEFAULT_SEC_PER_FRAME;
use posturas::window_builder::derive_rows;
use posturas::{repair, ChannelRange, DatasetConfig, LeadingGapPolicy, WindowBuilder};

/// Repara y ventanea una sola grabación y muestra el resultado
#[derive(Debug, Parser)]
#[command(name = "inspect_recording")]
struct Args {
    /// CSV de la grabación
    csv: PathBuf,

    /// Primera de las 6 columnas seguidas
    #[arg(short, long)]
    channel_start: usize,

    /// Duración de ventana en segundos
    #[arg(short, long, default_value_t = 0.5)]
    window: f64,

    #[arg(long, default_value_t = DEFAULT_SEC_PER_FRAME)]
    sec_per_frame: f64,

    #[arg(long, default_value_t = MOCAP_METADATA_ROWS)]
    skip_rows: usize,

    /// Rellenar huecos iniciales en lugar de fallar
    #[arg(long)]
    backfill: bool,

    /// Imprimir las filas derivadas
    #[arg(long)]
    dump_derived: bool,

    /// Imprimir la primera ventana aplanada
    #[arg(long)]
    dump_window: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    println!("🎞️  Inspeccionando {:?}", args.csv);

    let table = load_table_from_csv(&args.csv, args.skip_rows)?;
    let channels = ChannelRange::new(args.channel_start);
    let leading = if args.backfill {
        LeadingGapPolicy::Backfill
    } else {
        LeadingGapPolicy::Reject
    };
    let dense = repair(&table, channels, leading)
        .with_context(|| format!("No se pudo reparar {:?}", args.csv))?;

    let config = DatasetConfig {
        sec_per_frame: args.sec_per_frame,
        ..DatasetConfig::new(args.window)
    };
    let builder = WindowBuilder::new(config.frames_per_window()?, config.sec_per_frame);
    let batch = builder.build(&dense);

    let headers = table.headers();
    println!("Columnas seleccionadas:");
    for col in channels.columns().into_iter().flatten() {
        println!("  {:>3}: {}", col, headers.get(col).map(String::as_str).unwrap_or("?"));
    }
    println!(
        "\nFilas: {} crudas, {} válidas, {} ventanas de {} frames",
        table.num_rows(),
        dense.len(),
        batch.window_count(),
        builder.frames_per_window()
    );

    if args.dump_derived {
        println!("\n📊 Filas derivadas [x_rot y_rot z_rot y_pos v_vert v_horiz]:");
        for (idx, row) in derive_rows(&dense, config.sec_per_frame).iter().enumerate() {
            println!(
                "  {:05}: {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                idx + 1,
                row.rot[0],
                row.rot[1],
                row.rot[2],
                row.y_pos,
                row.vertical_velocity,
                row.horizontal_velocity
            );
        }
    }

    if args.dump_window {
        match batch.rows().next() {
            Some(first) => {
                println!("\n🧱 Primera ventana ({} valores):", first.len());
                for (idx, value) in first.iter().enumerate() {
                    println!("  {:04}: {:>12.6}", idx, value);
                }
            }
            None => println!("\nℹ️  La grabación no completa ninguna ventana"),
        }
    }

    Ok(())
}
