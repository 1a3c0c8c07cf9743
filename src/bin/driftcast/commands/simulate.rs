//! Simulate command: advect particles through a downloaded forecast.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use driftcast::fetch::FORECAST_HOURS;
use driftcast::particle::BUOYANT_WEIGHT_KG;

/// Simulate command arguments.
#[derive(Args)]
pub struct SimulateArgs {
    /// Release schedule CSV
    #[arg(short, long, default_value = "release_schedule_15min.csv")]
    pub schedule: PathBuf,

    /// Downloaded forecast NetCDF file
    #[arg(short, long)]
    pub currents: PathBuf,

    /// Simulation start date (YYYY-MM-DD); defaults to SIM_START_DATE
    /// or today (UTC)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Simulated duration in hours
    #[arg(long, default_value_t = FORECAST_HOURS)]
    pub hours: i64,

    /// Time step in minutes
    #[arg(long, default_value_t = 15.0)]
    pub dt_minutes: f64,

    /// Initial particle weight in kg
    #[arg(long, default_value_t = BUOYANT_WEIGHT_KG)]
    pub weight: f64,

    /// Enable windage with this coefficient (fraction of wind velocity);
    /// requires wind variables in the forecast file
    #[arg(long)]
    pub windage: Option<f64>,

    /// Wind variable names in the forecast file (with --windage)
    #[arg(long, default_value = "u10", requires = "windage")]
    pub wind_u_var: String,

    /// Wind variable names in the forecast file (with --windage)
    #[arg(long, default_value = "v10", requires = "windage")]
    pub wind_v_var: String,

    /// Enable exponential weight decay with this rate (1/s)
    #[arg(long)]
    pub decay_rate: Option<f64>,

    /// Weight below which a particle is removed (with --decay-rate)
    #[arg(long, default_value_t = 1e-3)]
    pub weight_threshold: f64,

    /// Release each site at its scheduled time instead of all at start
    #[arg(long)]
    pub staggered: bool,

    /// Output positions CSV
    #[arg(short, long, default_value = "final_positions.csv")]
    pub out: PathBuf,
}

/// Execute the simulate command.
#[cfg(feature = "netcdf")]
pub fn execute(args: SimulateArgs) -> Result<()> {
    use anyhow::Context;
    use chrono::Duration;
    use log::info;

    use driftcast::field::{fieldset_from_netcdf, NetcdfFieldConfig};
    use driftcast::io::write_positions;
    use driftcast::kernel::{
        AdvectionRk4, FieldWindage, KernelChain, WeightDecay, DECAY_RATE, WEIGHT_THRESHOLD,
        WINDAGE_COEFF,
    };
    use driftcast::particle::ParticleSet;
    use driftcast::schedule::ReleaseSchedule;
    use driftcast::sim::{run, SimulationConfig};

    let schedule = ReleaseSchedule::from_path(&args.schedule)
        .with_context(|| format!("Cannot read schedule {}", args.schedule.display()))?;
    let start_date = super::resolve_start_date(args.start_date)?;
    let window = schedule.forecast_window(start_date, Duration::hours(args.hours));

    let mut field_config = NetcdfFieldConfig::new();
    if args.windage.is_some() {
        field_config = field_config.with_wind_names(&args.wind_u_var, &args.wind_v_var);
    }
    let mut fields = fieldset_from_netcdf(&args.currents, &field_config)
        .with_context(|| format!("Cannot read forecast {}", args.currents.display()))?;
    if fields.reference().is_none() {
        // No decodable time units: align the field clock with the run
        fields = fields.with_reference(window.start);
    }

    let mut chain = KernelChain::new().with(AdvectionRk4);
    if let Some(coeff) = args.windage {
        fields.add_constant(WINDAGE_COEFF, coeff);
        chain = chain.with(FieldWindage::new(&fields)?);
    }
    if let Some(rate) = args.decay_rate {
        fields.add_constant(DECAY_RATE, rate);
        fields.add_constant(WEIGHT_THRESHOLD, args.weight_threshold);
        chain = chain.with(WeightDecay);
    }

    let sites = schedule.sites();
    info!(
        "{} release sites, kernels [{}], window {}",
        sites.len(),
        chain.describe(),
        window
    );

    let mut pset = if args.staggered {
        ParticleSet::from_sites_staggered(&sites, window.start, args.weight)
    } else {
        ParticleSet::from_sites(&sites, window.start, args.weight)
    };

    let config = SimulationConfig::new(args.dt_minutes * 60.0, window.duration_seconds())
        .with_verbose(true);
    let result = run(&mut pset, &chain, &fields, &config)?;

    for p in pset.particles() {
        println!(
            "release_id={}: final_lon={:.4}, final_lat={:.4}",
            p.release_id, p.lon, p.lat
        );
    }

    write_positions(&args.out, pset.particles())
        .with_context(|| format!("Cannot write {}", args.out.display()))?;
    info!(
        "{} steps: {} active, {} evaporated, {} beached, {} out of domain",
        result.n_steps, result.active, result.evaporated, result.beached, result.out_of_domain
    );
    println!("Saved final positions to {}", args.out.display());
    Ok(())
}

/// Execute the simulate command (unavailable in this build).
#[cfg(not(feature = "netcdf"))]
pub fn execute(_args: SimulateArgs) -> Result<()> {
    anyhow::bail!("this build has no NetCDF support; rebuild with --features netcdf")
}
