//! Boundary point sampling.
//!
//! Every exterior-ring vertex of every polygon part is flattened into one
//! sequence in document order, then every Nth vertex is kept. Interior
//! rings (holes) are never sampled.

use std::num::NonZeroUsize;

use isochrone_map_analysis_models::SamplePoint;

use crate::{BoundaryError, Region};

/// Sampling interval used when the caller does not pick one.
pub const DEFAULT_SAMPLING_INTERVAL: usize = 20;

/// A user-selected sampling interval, bounded to `5..=50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingInterval(NonZeroUsize);

impl SamplingInterval {
    /// Smallest interval offered to users.
    pub const MIN: usize = 5;
    /// Largest interval offered to users.
    pub const MAX: usize = 50;
    /// Slider step between offered intervals.
    pub const STEP: usize = 5;

    /// Validates a user-selected interval.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::InvalidInterval`] if `value` is outside
    /// [`Self::MIN`]`..=`[`Self::MAX`].
    pub fn new(value: usize) -> Result<Self, BoundaryError> {
        NonZeroUsize::new(value)
            .filter(|_| (Self::MIN..=Self::MAX).contains(&value))
            .map(Self)
            .ok_or(BoundaryError::InvalidInterval {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// The interval as a step size.
    #[must_use]
    pub const fn get(self) -> NonZeroUsize {
        self.0
    }

    /// Every interval offered on the slider.
    pub fn options() -> impl Iterator<Item = usize> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP)
    }
}

impl Default for SamplingInterval {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_SAMPLING_INTERVAL).unwrap_or(NonZeroUsize::MIN))
    }
}

/// Downsamples a region's exterior vertices to every `interval`th point.
///
/// The result has exactly `ceil(V / interval)` points, where `V` is the
/// total exterior vertex count, and starts with the first vertex of the
/// first part.
///
/// # Errors
///
/// Returns [`BoundaryError::EmptyRegion`] if the region has no exterior
/// vertices.
pub fn sample_boundary(
    region: &Region,
    interval: NonZeroUsize,
) -> Result<Vec<SamplePoint>, BoundaryError> {
    let points: Vec<SamplePoint> = region
        .geometry()
        .0
        .iter()
        .flat_map(|polygon| polygon.exterior().0.iter())
        .step_by(interval.get())
        .map(|coord| SamplePoint::new(coord.x, coord.y))
        .collect();

    if points.is_empty() {
        return Err(BoundaryError::EmptyRegion);
    }

    log::info!(
        "Using {} sample point(s) from the region boundary (every {} of {} vertices)",
        points.len(),
        interval,
        region.exterior_vertex_count()
    );

    Ok(points)
}
