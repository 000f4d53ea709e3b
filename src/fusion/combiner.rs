//! Portion-parallel weighted combination of co-registered views.
//!
//! For every output voxel the combiner
//! - maps the voxel to its nearest world position,
//! - gathers `(value, weight)` from each detail view covering that position
//!   (detail views without a weight field get one built from their full
//!   extent over `blending_range`),
//! - lets the base view fill in through [`ResolutionFallback`],
//! - writes `Σ value·weight / Σ weight`, or the background value when no view
//!   contributes.
//!
//! Workers each own one portion of the output's linear index space and write
//! it through a disjoint mutable slice; inputs and weights are shared
//! read-only. The first failing portion aborts the run and no output is
//! returned.

use super::fallback::ResolutionFallback;
use super::geometry::OutputGeometry;
use super::pixel::{FusedVolume, OutputPixel};
use super::plan::{FusionParams, FusionPlan, PixelType};
use crate::blend::{weights_for_volume, WeightField};
use crate::diagnostics::FusionReport;
use crate::error::{FusionError, SampleError};
use crate::portion::{divide_into_portions, split_by_portions, validate_partition, Portion, VoxelIndexer};
use crate::volume::{Volume, VolumeView};
use log::{debug, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a view takes part in the weighted combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputRole {
    /// Low-resolution view used only where detail views are not trusted.
    Base,
    /// Regular view weighted by its own weight field.
    Detail,
}

/// One view handed to the combiner.
#[derive(Clone, Copy)]
pub struct FusionInput<'a> {
    pub volume: &'a dyn VolumeView,
    /// Must match the view's shape. `None` treats the whole view as covered
    /// and blends from its edges over the run's blending range.
    pub weights: Option<&'a WeightField>,
    pub role: InputRole,
}

impl<'a> FusionInput<'a> {
    pub fn detail(volume: &'a dyn VolumeView, weights: Option<&'a WeightField>) -> Self {
        Self {
            volume,
            weights,
            role: InputRole::Detail,
        }
    }

    pub fn base(volume: &'a dyn VolumeView) -> Self {
        Self {
            volume,
            weights: None,
            role: InputRole::Base,
        }
    }

    pub fn with_weights(mut self, weights: &'a WeightField) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Local position and weight at `world`, `None` when the view does not
    /// cover it. Without `weights` every voxel of the view counts with 1.
    #[inline]
    fn coverage(
        &self,
        weights: Option<&WeightField>,
        world: [i64; 3],
    ) -> Option<([usize; 3], f64)> {
        let local = self.volume.local_position(world)?;
        let weight = weights.map_or(1.0, |w| w.get(local) as f64);
        (weight > 0.0).then_some((local, weight))
    }
}

impl std::fmt::Debug for FusionInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionInput")
            .field("dims", &self.volume.dims())
            .field("origin", &self.volume.origin())
            .field("weighted", &self.weights.is_some())
            .field("role", &self.role)
            .finish()
    }
}

/// Completed portions out of the total, reported after each portion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FusionProgress {
    pub completed: usize,
    pub total: usize,
}

impl FusionProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

pub type ProgressFn<'a> = &'a (dyn Fn(FusionProgress) + Sync);

#[derive(Clone, Debug)]
pub struct FusionResult {
    pub volume: FusedVolume,
    pub report: FusionReport,
}

/// Validated fusion run, ready to execute.
pub struct Fuser<'a> {
    plan: FusionPlan,
    params: FusionParams,
    geometry: OutputGeometry,
    fallback: ResolutionFallback,
    inputs: Vec<FusionInput<'a>>,
    /// Edge-blended weights for detail inputs that came without a field.
    derived_weights: Vec<Option<WeightField>>,
    base: Option<usize>,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Fuser<'a> {
    /// Check plan, parameters and inputs before any voxel is touched.
    ///
    /// Detail inputs without a weight field get one here, from the distance to
    /// their volume edge over `params.blending_range`.
    pub fn new(
        plan: FusionPlan,
        params: FusionParams,
        inputs: Vec<FusionInput<'a>>,
    ) -> Result<Self, FusionError> {
        let geometry = plan.output_geometry()?;
        if geometry.checked_num_voxels().is_none() {
            return Err(FusionError::OutputTooLarge {
                dims: geometry.dims,
            });
        }
        params.validate()?;
        let fallback = ResolutionFallback::new(params.fallback_threshold)?;
        if inputs.is_empty() {
            return Err(FusionError::NoInputs);
        }

        let mut base = None;
        for (i, input) in inputs.iter().enumerate() {
            if input.role == InputRole::Base {
                if let Some(first) = base {
                    return Err(FusionError::MultipleBaseInputs { first, second: i });
                }
                base = Some(i);
            }
            if input.volume.bounds().intersection(&plan.bounding_box).is_none() {
                warn!("input {i} does not overlap the output bounding box");
            }
            if let Some(weights) = input.weights {
                let dims = input.volume.dims();
                if weights.dims != dims {
                    return Err(FusionError::ShapeMismatch {
                        context: format!("weight field of input {i}"),
                        expected: dims,
                        found: weights.dims,
                    });
                }
            }
        }

        let derived_weights = inputs
            .iter()
            .map(|input| match (input.role, input.weights) {
                (InputRole::Detail, None) => {
                    weights_for_volume(input.volume, None, params.blending_range).map(Some)
                }
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            plan,
            params,
            geometry,
            fallback,
            inputs,
            derived_weights,
            base,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn plan(&self) -> &FusionPlan {
        &self.plan
    }

    pub fn geometry(&self) -> &OutputGeometry {
        &self.geometry
    }

    /// Portions sized for this run's worker count.
    pub fn portions(&self) -> Vec<Portion> {
        divide_into_portions(self.geometry.num_voxels(), self.worker_count())
    }

    pub fn fuse(&self) -> Result<FusionResult, FusionError> {
        let portions = self.portions();
        self.fuse_portions(&portions)
    }

    /// Fuse with caller-supplied portions, which must tile the output.
    pub fn fuse_portions(&self, portions: &[Portion]) -> Result<FusionResult, FusionError> {
        validate_partition(portions, self.geometry.num_voxels())?;
        match self.plan.pixel_type {
            PixelType::Float32 => self.fuse_typed::<f32>(portions),
            PixelType::UInt16 => self.fuse_typed::<u16>(portions),
            PixelType::UInt8 => self.fuse_typed::<u8>(portions),
        }
    }

    fn weights_of(&self, i: usize) -> Option<&WeightField> {
        self.inputs[i]
            .weights
            .or(self.derived_weights[i].as_ref())
    }

    fn worker_count(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            if self.params.threads == 0 {
                rayon::current_num_threads()
            } else {
                self.params.threads
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    fn fuse_typed<T: OutputPixel>(&self, portions: &[Portion]) -> Result<FusionResult, FusionError> {
        let start = Instant::now();
        let mut output = Volume::<T>::new(self.geometry.dims);
        output.origin = self.geometry.world_position([0, 0, 0]);

        let completed = AtomicUsize::new(0);
        let chunks = split_by_portions(&mut output.data, portions);
        let covered = self.run_portions(portions, chunks, &completed)?;

        let total = self.geometry.num_voxels();
        let report = FusionReport {
            output_dims: self.geometry.dims,
            pixel_type: T::PIXEL_TYPE,
            portions: portions.len(),
            workers: self.worker_count(),
            covered_voxels: covered,
            background_voxels: total - covered,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        debug!(
            "fused {:?} {:?} portions={} covered={} elapsed_ms={:.3}",
            report.output_dims, report.pixel_type, report.portions, covered, report.elapsed_ms
        );
        Ok(FusionResult {
            volume: T::into_fused(output),
            report,
        })
    }

    #[cfg(feature = "parallel")]
    fn run_portions<T: OutputPixel>(
        &self,
        portions: &[Portion],
        chunks: Vec<&mut [T]>,
        completed: &AtomicUsize,
    ) -> Result<usize, FusionError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.params.threads)
            .build()
            .map_err(|e| FusionError::ThreadPool {
                message: e.to_string(),
            })?;
        let covered: Vec<usize> = pool.install(|| {
            portions
                .par_iter()
                .zip(chunks.into_par_iter())
                .map(|(&portion, out)| self.run_portion(portion, out, completed, portions.len()))
                .collect::<Result<_, _>>()
        })?;
        Ok(covered.into_iter().sum())
    }

    #[cfg(not(feature = "parallel"))]
    fn run_portions<T: OutputPixel>(
        &self,
        portions: &[Portion],
        chunks: Vec<&mut [T]>,
        completed: &AtomicUsize,
    ) -> Result<usize, FusionError> {
        portions
            .iter()
            .zip(chunks)
            .map(|(&portion, out)| self.run_portion(portion, out, completed, portions.len()))
            .sum()
    }

    fn run_portion<T: OutputPixel>(
        &self,
        portion: Portion,
        out: &mut [T],
        completed: &AtomicUsize,
        total: usize,
    ) -> Result<usize, FusionError> {
        let covered = self
            .fuse_portion(portion, out)
            .map_err(|source| FusionError::Worker { portion, source })?;
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("fusion portion {done}/{total} done");
        if let Some(progress) = self.progress {
            progress(FusionProgress {
                completed: done,
                total,
            });
        }
        Ok(covered)
    }

    /// Fill `out` (the voxels of `portion`); returns the number of covered voxels.
    fn fuse_portion<T: OutputPixel>(&self, portion: Portion, out: &mut [T]) -> Result<usize, SampleError> {
        let indexer = VoxelIndexer::new(self.geometry.dims);
        let mut covered = 0usize;
        for (dst, pos) in out.iter_mut().zip(indexer.positions(portion)) {
            let world = self.geometry.world_position(pos);
            *dst = match self.fuse_voxel(world)? {
                Some(value) => {
                    covered += 1;
                    T::from_fused(value)
                }
                None => T::default(),
            };
        }
        Ok(covered)
    }

    /// Normalized weighted value at `world`, `None` when nothing covers it.
    fn fuse_voxel(&self, world: [i64; 3]) -> Result<Option<f64>, SampleError> {
        let mut weighted_sum = 0.0f64;
        let mut detail_weight = 0.0f64;
        for (i, input) in self.inputs.iter().enumerate() {
            if Some(i) == self.base {
                continue;
            }
            if let Some((local, weight)) = input.coverage(self.weights_of(i), world) {
                weighted_sum += input.volume.sample(local)? * weight;
                detail_weight += weight;
            }
        }

        let mut total_weight = detail_weight;
        if let Some(base) = self.base.map(|i| &self.inputs[i]) {
            let base_weight = self.fallback.base_weight(detail_weight);
            if base_weight > 0.0 {
                if let Some((local, _)) = base.coverage(base.weights, world) {
                    weighted_sum += base.volume.sample(local)? * base_weight;
                    total_weight += base_weight;
                }
            }
        }

        Ok((total_weight > 0.0).then(|| weighted_sum / total_weight))
    }
}

/// Validate and run one fusion with default portions.
pub fn fuse(
    plan: FusionPlan,
    params: FusionParams,
    inputs: Vec<FusionInput<'_>>,
) -> Result<FusionResult, FusionError> {
    Fuser::new(plan, params, inputs)?.fuse()
}
