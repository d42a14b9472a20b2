use clap::Parser;
use ignition_val_core::{
    Apparatus, ApparatusCorrection, Composition, DataPoint, ErrorReduction, ExperimentRecord,
    IgnitionCriterion, SpeciesFraction, SyntheticSolver, Unit, UnitValue, ValidationConfig,
    Validator,
};

/// Ignition-delay validation demo against the synthetic kinetics backend
#[derive(Parser, Debug)]
#[command(name = "ignition-val-demo")]
#[command(about = "Validate predicted ignition delays over a temperature ladder", long_about = None)]
struct Args {
    /// Initial pressure in kPa
    #[arg(short, long, default_value_t = 220.0)]
    pressure_kpa: f64,

    /// Coldest datapoint temperature in K
    #[arg(long, default_value_t = 1100.0)]
    t_min: f64,

    /// Hottest datapoint temperature in K
    #[arg(long, default_value_t = 1300.0)]
    t_max: f64,

    /// Number of datapoints across the temperature ladder
    #[arg(short = 'n', long, default_value_t = 8)]
    points: usize,

    /// Facility pressure-rise rate in 1/ms (non-ideal shock tube)
    #[arg(short, long)]
    rise_rate: Option<f64>,

    /// Detect ignition from a species peak instead of pressure d/dt max
    #[arg(short, long)]
    species: Option<String>,

    /// Error reduction: mean, median or rms
    #[arg(long, default_value = "mean")]
    reduction: String,

    /// Cap on worker threads (0 = rayon default)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Relative signal noise amplitude
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Noise RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Multiplier applied to the correlation delay to fake measurements
    #[arg(long, default_value_t = 1.05)]
    measurement_bias: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    println!("=== Ignition Delay Validation Demo ===\n");

    let mut mech = SyntheticSolver::hydrogen_oxygen();
    if args.noise > 0.0 {
        println!(
            "Signal noise: {:.2}% relative, seed {}",
            args.noise * 100.0,
            args.seed
        );
        mech = mech.with_noise(args.noise, args.seed);
    }

    let criterion = match &args.species {
        Some(name) => IgnitionCriterion::species_peak(name.clone()),
        None => IgnitionCriterion::pressure_rise(),
    };
    println!("Criterion: {}", criterion);

    let correction = args.rise_rate.map(|rate| {
        println!("Facility pressure rise: {rate:.3} 1/ms");
        ApparatusCorrection::with_pressure_rise(UnitValue::new(rate, Unit::PerMillisecond))
    });

    let reduction = match args.reduction.to_lowercase().as_str() {
        "median" => ErrorReduction::MedianAbsolute,
        "rms" => ErrorReduction::RootMeanSquare,
        _ => ErrorReduction::MeanAbsolute,
    };

    // Temperature ladder with measured delays faked from a biased copy of
    // the backend correlation, so the score reflects the bias alone
    let composition = Composition::mole(vec![
        SpeciesFraction::new("H2", 0.00444),
        SpeciesFraction::new("O2", 0.00566),
        SpeciesFraction::new("Ar", 0.9899),
    ])
    .expect("fixed composition is valid");
    let pressure_pa = args.pressure_kpa * 1.0e3;
    let points = args.points.max(2);
    let correlation = mech.correlation();

    let datapoints: Vec<DataPoint> = (0..points)
        .map(|i| {
            let frac = i as f64 / (points - 1) as f64;
            let temperature_k = args.t_min + frac * (args.t_max - args.t_min);
            let measured_s =
                args.measurement_bias * correlation.tau(temperature_k, pressure_pa);
            DataPoint {
                temperature: UnitValue::new(temperature_k, Unit::Kelvin),
                pressure: UnitValue::new(args.pressure_kpa, Unit::Kilopascal),
                composition: composition.clone(),
                ignition: criterion.clone(),
                correction: correction.clone(),
                measured_delay: UnitValue::new(measured_s * 1.0e6, Unit::Microsecond),
            }
        })
        .collect();
    println!(
        "Record: {} shock-tube datapoints, {:.1}-{:.1} K at {:.0} kPa\n",
        datapoints.len(),
        args.t_min,
        args.t_max,
        args.pressure_kpa
    );

    let record = ExperimentRecord::new(Apparatus::ShockTube, datapoints);
    let config = ValidationConfig {
        reduction,
        max_parallel: (args.threads > 0).then_some(args.threads),
        ..ValidationConfig::default()
    };

    let summary = match Validator::new(&mech).with_config(config).validate_record(&record) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("validation failed: {err}");
            std::process::exit(1);
        }
    };

    println!("{:>3}  {:>9}  {:>13}  {:>13}  {:>9}", "#", "T [K]", "measured [us]", "predicted [us]", "error");
    for result in &summary.results {
        let temperature = result.temperature.magnitude();
        match &result.outcome {
            Ok(comparison) => {
                println!(
                    "{:>3}  {:>9.2}  {:>13.2}  {:>13.2}  {:>8.2}%",
                    result.index,
                    temperature,
                    comparison.measured.magnitude(),
                    comparison.predicted.magnitude(),
                    comparison.relative_error * 100.0
                );
            }
            Err(err) => {
                println!("{:>3}  {:>9.2}  {err}", result.index, temperature);
            }
        }
    }

    println!(
        "\n{} succeeded, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    match summary.score {
        Some(score) => println!("Aggregate error ({}): {:.2}%", summary.reduction, score * 100.0),
        None => println!("No aggregate score: every datapoint failed"),
    }
}
