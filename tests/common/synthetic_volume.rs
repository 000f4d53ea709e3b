use view_fusion::volume::Volume;

/// Volume whose voxels hold their world x coordinate plus `offset`.
pub fn ramp_x_f32(dims: [usize; 3], origin: [i64; 3], offset: f32) -> Volume<f32> {
    assert!(dims.iter().all(|&d| d > 0), "volume dimensions must be positive");
    let mut vol = Volume::<f32>::new(dims).with_origin(origin);
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                vol.set([x, y, z], offset + (origin[0] + x as i64) as f32);
            }
        }
    }
    vol
}

/// Volume whose voxels hold their world z coordinate.
pub fn ramp_z_f32(dims: [usize; 3], origin: [i64; 3]) -> Volume<f32> {
    let mut vol = Volume::<f32>::new(dims).with_origin(origin);
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                vol.set([x, y, z], (origin[2] + z as i64) as f32);
            }
        }
    }
    vol
}

/// 3-D checkerboard of `lo`/`hi` cells with edge length `cell`.
pub fn checker_u16(dims: [usize; 3], cell: usize, lo: u16, hi: u16) -> Volume<u16> {
    assert!(cell > 0, "cell size must be positive");
    let mut vol = Volume::<u16>::new(dims);
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let parity = (x / cell + y / cell + z / cell) & 1;
                vol.set([x, y, z], if parity == 0 { lo } else { hi });
            }
        }
    }
    vol
}
