//! Arrivals command: summarize endpoints against a target polygon.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use driftcast::arrival::{summarize, ArrivalRegion};
use driftcast::io::{read_positions, write_arrivals_vtu};

/// Arrivals command arguments.
#[derive(Args)]
pub struct ArrivalsArgs {
    /// Positions CSV produced by the simulate command
    #[arg(short, long, default_value = "final_positions.csv")]
    pub positions: PathBuf,

    /// Target polygon as whitespace-separated lon,lat pairs, e.g.
    /// "34.05,31.20 34.45,31.20 34.45,31.45 34.05,31.45"
    #[arg(long)]
    pub polygon: Option<String>,

    /// Also write the arrival map as a VTU file
    #[arg(long)]
    pub vtk: Option<PathBuf>,
}

/// Execute the arrivals command.
pub fn execute(args: ArrivalsArgs) -> Result<()> {
    let records = read_positions(&args.positions)
        .with_context(|| format!("Cannot read positions {}", args.positions.display()))?;
    info!("{} endpoints loaded", records.len());

    let region = match &args.polygon {
        Some(text) => ArrivalRegion::from_vertex_list(text)?,
        None => ArrivalRegion::default_region(),
    };

    let summary = summarize(&region, &records);
    println!("{}", summary);

    if let Some(vtk_path) = &args.vtk {
        write_arrivals_vtu(vtk_path, &records, None, &region)
            .with_context(|| format!("Cannot write {}", vtk_path.display()))?;
        println!("Saved arrival map to {}", vtk_path.display());
    }

    Ok(())
}
