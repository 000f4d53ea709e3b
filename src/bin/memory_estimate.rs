use std::env;
use std::path::Path;
use view_fusion::config::memory_estimate::load_config;
use view_fusion::estimate::{estimate_memory, MemoryEstimate};
use view_fusion::volume::io::write_json_file;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    env_logger::init();
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let estimate = estimate_memory(&config.plan, &config.dataset).map_err(|e| e.to_string())?;
    print_text_summary(&estimate, config.dataset.memory_budget_bytes);

    if let Some(path) = &config.estimate_json {
        write_json_file(path, &estimate)?;
        println!("\nJSON estimate written to {}", path.display());
    }
    Ok(())
}

fn print_text_summary(estimate: &MemoryEstimate, budget_bytes: u64) {
    let [x, y, z] = estimate.output_dims;
    println!("Output: {x} x {y} x {z} px ({} voxels)", estimate.output_pixels);
    println!("{}", estimate.summary());
    println!("Inputs: {}", estimate.input_summary());
    println!("  input_mb: {:.1}", estimate.input_mb);
    println!("  processing_mb: {:.1}", estimate.processing_mb);
    println!("  output_mb: {:.1}", estimate.output_mb);
    if !estimate.fits(budget_bytes) {
        println!(
            "  warning: exceeds memory budget of {:.0} MB",
            budget_bytes as f64 / view_fusion::estimate::MIB
        );
    }
}

fn usage() -> String {
    "Usage: memory_estimate <config.json>".to_string()
}
