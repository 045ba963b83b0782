//! Generate a random piecewise-normal series, run the online detector over
//! it and write both the series and the most likely run lengths to disk.
//!
//! Produces `data_input.csv` (one observation per line) and
//! `data_output.csv` (one run length per line).

use bocpd::generators::normal_segments;
use bocpd::utils::{map_changepoints, write_series};
use bocpd::{Bocpd, ConstantHazard, StudentTUpdater};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error + 'static>> {
    let mut rng = SmallRng::seed_from_u64(100);

    println!("Generating sequence");
    let (partition, data) = normal_segments(5, 50, 1000, &mut rng)?;
    write_series("data_input.csv", &data)?;
    println!("Segment lengths = {partition:?}");

    let model = StudentTUpdater::new(&[0.1], &[0.01], &[1.0], &[0.0])?;
    let mut cpd = Bocpd::new(250.0, ConstantHazard, model)?;

    println!("Generating run-length probabilities");
    let mut rs: Vec<Vec<f64>> = Vec::with_capacity(data.len());
    for x in &data {
        rs.push(cpd.update(*x)?.to_vec());
    }

    let boundaries: Vec<usize> = partition
        .iter()
        .scan(0, |acc, len| {
            *acc += len;
            Some(*acc)
        })
        .collect();
    println!("True boundaries = {boundaries:?}");
    println!("MAP change points = {:?}", map_changepoints(&rs));

    write_series("data_output.csv", cpd.maxes())?;
    Ok(())
}
