//! I/O helpers for inspecting volumes and writing reports.
//!
//! - `save_slice_png`: write one z-plane of a volume to a grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{Sample, Volume};
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Save the `z`-th plane of `volume` as an 8-bit PNG.
///
/// Intensities are stretched linearly from the plane's minimum to its maximum;
/// a constant plane is written black.
pub fn save_slice_png<T: Sample>(volume: &Volume<T>, z: usize, path: &Path) -> Result<(), String> {
    let [nx, ny, nz] = volume.dims;
    if z >= nz {
        return Err(format!("Slice {z} is outside a volume with {nz} planes"));
    }
    ensure_parent_dir(path)?;
    let plane = volume.slice_z(z);
    let (lo, hi) = plane.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        let v = v.to_f64();
        (lo.min(v), hi.max(v))
    });
    let scale = if hi > lo { 255.0 / (hi - lo) } else { 0.0 };

    let mut out = GrayImage::new(nx as u32, ny as u32);
    for y in 0..ny {
        let row = &plane[y * nx..(y + 1) * nx];
        for (x, &px) in row.iter().enumerate() {
            let v = ((px.to_f64() - lo) * scale).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v.round() as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Write `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let file =
        File::create(path).map_err(|e| format!("Failed to save {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))?;
    writer
        .flush()
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).map_err(|e| {
            format!("Failed to save {}: cannot create {}: {e}", path.display(), dir.display())
        }),
        _ => Ok(()),
    }
}
