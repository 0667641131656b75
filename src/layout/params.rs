//! Layout analysis parameters.

/// Controls the parallel nearest-neighbour edge construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringOptions {
    /// Number of worker threads for the edge construction step.
    ///
    /// `-1` (or any value below 1) uses the process-wide rayon pool, `1`
    /// runs sequentially, larger values build a dedicated pool of that
    /// size. Results are identical for every setting.
    pub max_workers: isize,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self { max_workers: -1 }
    }
}

/// Parameters for nearest-neighbour word extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct WordExtractorOptions {
    /// Two letters join the same word when the gap between them is below
    /// this multiple of the larger glyph dimension involved.
    pub maximum_distance_multiplier: f64,

    /// Worker threads for the underlying clustering step.
    pub max_workers: isize,
}

impl Default for WordExtractorOptions {
    fn default() -> Self {
        Self {
            maximum_distance_multiplier: 0.2,
            max_workers: -1,
        }
    }
}
