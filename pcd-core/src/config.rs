use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("step size must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("ground percentile must be within [0, 100], got {0}")]
    PercentileOutOfRange(f64),
    #[error("max render points must be at least 1")]
    ZeroMaxRenderPoints,
}

/// Parameters for one pipeline run, passed explicitly into each stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Half-width of each square sampling window, meters.
    pub window_radius: f64,
    /// Distance between neighboring window centers, meters.
    pub step_size: f64,
    /// Windows with fewer points than this are treated as noise.
    pub min_points_per_chunk: usize,
    /// Upper bound on the number of ranked chunks handed to the renderer.
    pub max_chunks_to_show: usize,
    /// Per-chunk point budget before rendering; larger chunks are sampled.
    pub max_render_points: usize,
    /// Height percentile used as the ground/object split threshold.
    pub ground_percentile: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_radius: 20.0,
            step_size: 15.0,
            min_points_per_chunk: 800,
            max_chunks_to_show: 8,
            max_render_points: 180_000,
            ground_percentile: 20.0,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.window_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.window_radius));
        }
        if !(self.step_size > 0.0) {
            return Err(ConfigError::NonPositiveStep(self.step_size));
        }
        if !(0.0..=100.0).contains(&self.ground_percentile) {
            return Err(ConfigError::PercentileOutOfRange(self.ground_percentile));
        }
        if self.max_render_points == 0 {
            return Err(ConfigError::ZeroMaxRenderPoints);
        }
        Ok(())
    }
}
