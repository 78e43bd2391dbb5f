// Summary statistics shared by the aggregators and the renderer

/// Linear-interpolated percentile over already sorted data.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted_data[0];
    }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}

/// Five-number summary plus Tukey whiskers and outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Summarize a sample. Returns `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut ys = values.to_vec();
        ys.sort_by(f64::total_cmp);

        let q1 = percentile(&ys, 0.25);
        let median = percentile(&ys, 0.50);
        let q3 = percentile(&ys, 0.75);
        let iqr = q3 - q1;

        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        // Whiskers: most extreme data points still inside the fences
        let lower_whisker = ys.iter().copied().find(|&v| v >= lower_fence).unwrap_or(q1);
        let upper_whisker = ys
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= upper_fence)
            .unwrap_or(q3);

        let outliers = ys
            .iter()
            .copied()
            .filter(|&v| v < lower_fence || v > upper_fence)
            .collect();

        Some(Self {
            min: ys[0],
            q1,
            median,
            q3,
            max: ys[ys.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Equal-width bin edges spanning `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bins {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

impl Bins {
    /// Bins covering the observed values. A zero-width range gets unit-width bins.
    pub fn spanning(values: &[f64], count: usize) -> Option<Self> {
        if values.is_empty() || count == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let range = max - min;
        let width = if range == 0.0 { 1.0 } else { range / count as f64 };
        Some(Self {
            start: min,
            width,
            count,
        })
    }

    /// Bin holding `value`. Bins are half-open except the last, which is closed
    /// so the maximum lands inside the range.
    pub fn index_of(&self, value: f64) -> usize {
        let idx = ((value - self.start) / self.width).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.count - 1)
        }
    }

    pub fn edges(&self, idx: usize) -> (f64, f64) {
        let lo = self.start + idx as f64 * self.width;
        (lo, lo + self.width)
    }
}
