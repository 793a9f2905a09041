// Small demo of the criteria in the library.
// Run with:
//   cargo run -- [config.json]
// Set RUST_LOG=debug to see per-forward log lines.
use ferrite_loss::{CriterionConfig, Matrix, Result};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => CriterionConfig::load_json(&path)?,
        None => CriterionConfig::default(),
    };
    let mut criterion = config.build();

    let scores = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
    let labels = Matrix::one_hot(&[2], 3)?;
    let loss = criterion.call(&scores, &labels)?;
    println!("{}: scores {:?} labels {:?}", criterion.name(), scores.data, labels.data);
    println!("  loss       = {:.4?}", loss);
    println!("  derivative = {:.4?}", criterion.derivative()?.data);

    // Same batch shifted by +1000: a stable criterion reports the same loss.
    let shifted = scores.map(|x| x + 1000.0);
    println!("  shifted    = {:.4?}", criterion.forward(&shifted, &labels)?);

    let batch = Matrix::random(4, 3).map(|x| x * 10.0);
    let targets = Matrix::one_hot(&[0, 1, 2, 0], 3)?;
    let loss = criterion.forward(&batch, &targets)?;
    let mean = loss.iter().sum::<f64>() / loss.len() as f64;
    println!("random batch of {}: mean loss = {:.4}", batch.rows, mean);

    Ok(())
}
