use std::env;
use std::path::Path;
use std::time::Instant;
use view_fusion::blend::{content_coverage, weights_from_mask, WeightField};
use view_fusion::config::fusion_demo::{load_config, FusionDemoConfig, SceneConfig};
use view_fusion::diagnostics::{FusionDemoReport, WeightFieldReport};
use view_fusion::fusion::{FusedVolume, FusionInput, Fuser, FusionPlan};
use view_fusion::volume::io::{save_slice_png, write_json_file};
use view_fusion::volume::{BoundingBox, Volume};

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
    let scene = &config.scene;
    if scene.size == 0 {
        return Err("scene.size must be positive".to_string());
    }

    let specimen = specimen(scene.size);
    let base = block_average(&specimen, scene.base_block.max(1));
    let details = detail_views(&specimen, scene.overlap);

    let mut weights = Vec::with_capacity(details.len());
    let mut weight_reports = Vec::with_capacity(details.len());
    for (i, view) in details.iter().enumerate() {
        let start = Instant::now();
        let mask = content_coverage(view, None, scene.empty_run).map_err(|e| e.to_string())?;
        let field: WeightField =
            weights_from_mask(&mask, config.params.blending_range).map_err(|e| e.to_string())?;
        let field = field.with_origin(view.origin);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        weight_reports.push(WeightFieldReport::new(
            i,
            &mask,
            &field.data,
            view.origin,
            elapsed_ms,
        ));
        weights.push(field);
    }

    let mut inputs = vec![FusionInput::base(&base)];
    for (view, field) in details.iter().zip(&weights) {
        inputs.push(FusionInput::detail(view, Some(field)));
    }

    let plan = demo_plan(&config, scene);
    let fuser = Fuser::new(plan, config.params.clone(), inputs).map_err(|e| e.to_string())?;
    let geometry = fuser.geometry().clone();
    let result = fuser.fuse().map_err(|e| e.to_string())?;

    let z = geometry.dims[2] / 2;
    match &result.volume {
        FusedVolume::Float32(v) => save_slice_png(v, z, &config.output.slice_png)?,
        FusedVolume::UInt16(v) => save_slice_png(v, z, &config.output.slice_png)?,
        FusedVolume::UInt8(v) => save_slice_png(v, z, &config.output.slice_png)?,
    }

    let report = FusionDemoReport {
        geometry,
        weights: weight_reports,
        fusion: result.report,
    };
    write_json_file(&config.output.report_json, &report)?;

    println!(
        "Fused {} ({:?}) from {} views in {:.3} ms, coverage {:.1}%",
        report.geometry.dimensions_label(),
        report.fusion.pixel_type,
        details.len() + 1,
        report.fusion.elapsed_ms,
        report.fusion.coverage_fraction() * 100.0
    );
    println!("Saved slice z={z} to {}", config.output.slice_png.display());
    println!("Saved report to {}", config.output.report_json.display());
    Ok(())
}

fn demo_plan(config: &FusionDemoConfig, scene: &SceneConfig) -> FusionPlan {
    FusionPlan::new(BoundingBox::from_origin_dims([0, 0, 0], [scene.size; 3]))
        .with_downsampling(config.downsampling)
        .with_pixel_type(config.pixel_type)
}

/// Bright blobs on a dim gradient, never zero inside the specimen.
fn specimen(size: usize) -> Volume<u16> {
    let mut vol = Volume::<u16>::new([size; 3]);
    let c = size as f64 / 2.0;
    let sigma = (size as f64 / 6.0).max(1.0);
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let (dx, dy, dz) = (x as f64 - c, y as f64 - c, z as f64 - c);
                let blob = (-(dx * dx + dy * dy + dz * dz) / (2.0 * sigma * sigma)).exp();
                let stripes = if (x / 4 + y / 4) % 2 == 0 { 300.0 } else { 0.0 };
                let value = 100.0 + 4.0 * z as f64 + stripes + 3000.0 * blob;
                vol.set([x, y, z], value.round() as u16);
            }
        }
    }
    vol
}

/// Coarse stand-in for the base view: every `block`³ cell takes its mean.
fn block_average(src: &Volume<u16>, block: usize) -> Volume<u16> {
    let [nx, ny, nz] = src.dims;
    let mut out = Volume::<u16>::new(src.dims).with_origin(src.origin);
    for bz in (0..nz).step_by(block) {
        for by in (0..ny).step_by(block) {
            for bx in (0..nx).step_by(block) {
                let (ex, ey, ez) = ((bx + block).min(nx), (by + block).min(ny), (bz + block).min(nz));
                let mut sum = 0u64;
                let mut count = 0u64;
                for z in bz..ez {
                    for y in by..ey {
                        for x in bx..ex {
                            sum += src.get([x, y, z]) as u64;
                            count += 1;
                        }
                    }
                }
                let mean = (sum / count.max(1)) as u16;
                for z in bz..ez {
                    for y in by..ey {
                        for x in bx..ex {
                            out.set([x, y, z], mean);
                        }
                    }
                }
            }
        }
    }
    out
}

/// Two detail views splitting the specimen along x, sharing `overlap` columns.
/// Each is resampled into the full frame with zero padding where it saw nothing.
fn detail_views(src: &Volume<u16>, overlap: usize) -> Vec<Volume<u16>> {
    let nx = src.dims[0];
    let half = nx / 2;
    let lo = half.saturating_sub(overlap / 2);
    let hi = (half + overlap.div_ceil(2)).min(nx);
    [(0, hi), (lo, nx)]
        .into_iter()
        .map(|(x0, x1)| {
            let mut view = Volume::<u16>::new(src.dims).with_origin(src.origin);
            for z in 0..src.dims[2] {
                for y in 0..src.dims[1] {
                    for x in x0..x1 {
                        view.set([x, y, z], src.get([x, y, z]));
                    }
                }
            }
            view
        })
        .collect()
}

fn usage() -> String {
    "Usage: fusion_demo <config.json>".to_string()
}
