//! Histograms, normalized distributions and running moments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw trial counts per outcome value.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: BTreeMap<u32, u64>,
}

impl Histogram {
    pub fn record(&mut self, value: u32) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Percent of `trials` per value.
    pub fn normalize(&self, trials: u32) -> Distribution {
        let scale = 100.0 / trials.max(1) as f64;
        Distribution(self.counts.iter().map(|(&v, &n)| (v, n as f64 * scale)).collect())
    }
}

/// Raw trial counts per outcome pair.
#[derive(Debug, Clone, Default)]
pub struct JointHistogram {
    counts: BTreeMap<(u32, u32), u64>,
}

impl JointHistogram {
    pub fn record(&mut self, x: u32, y: u32) {
        *self.counts.entry((x, y)).or_insert(0) += 1;
    }

    pub fn normalize(&self, trials: u32) -> JointDistribution {
        let scale = 100.0 / trials.max(1) as f64;
        JointDistribution(self.counts.iter().map(|(&k, &n)| (k, n as f64 * scale)).collect())
    }
}

/// Percent of trials per outcome value. Values never observed are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution(BTreeMap<u32, f64>);

impl Distribution {
    pub fn get(&self, value: u32) -> f64 {
        self.0.get(&value).copied().unwrap_or(0.0)
    }

    /// Percent of trials with an outcome of at least `k`.
    pub fn at_least(&self, k: u32) -> f64 {
        self.0.range(k..).map(|(_, p)| p).sum()
    }

    /// Most frequent value; the smallest one wins ties.
    pub fn mode(&self) -> Option<u32> {
        let mut best: Option<(u32, f64)> = None;
        for (&v, &p) in &self.0 {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((v, p));
            }
        }
        best.map(|(v, _)| v)
    }

    /// Sum of all percentages; 100 up to rounding.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn mean(&self) -> f64 {
        self.0.iter().map(|(&v, &p)| v as f64 * p).sum::<f64>() / 100.0
    }

    pub fn max_value(&self) -> Option<u32> {
        self.0.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&v, &p)| (v, p))
    }
}

/// One cell of a joint distribution in its wire form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCell {
    pub x: u32,
    pub y: u32,
    pub percent: f64,
}

/// Percent of trials per outcome pair, serialized as a list of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<JointCell>", from = "Vec<JointCell>")]
pub struct JointDistribution(BTreeMap<(u32, u32), f64>);

impl JointDistribution {
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.0.get(&(x, y)).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Distribution of the first coordinate alone.
    pub fn marginal_x(&self) -> Distribution {
        let mut out = BTreeMap::new();
        for (&(x, _), &p) in &self.0 {
            *out.entry(x).or_insert(0.0) += p;
        }
        Distribution(out)
    }

    pub fn marginal_y(&self) -> Distribution {
        let mut out = BTreeMap::new();
        for (&(_, y), &p) in &self.0 {
            *out.entry(y).or_insert(0.0) += p;
        }
        Distribution(out)
    }

    pub fn cells(&self) -> impl Iterator<Item = JointCell> + '_ {
        self.0.iter().map(|(&(x, y), &percent)| JointCell { x, y, percent })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<JointDistribution> for Vec<JointCell> {
    fn from(joint: JointDistribution) -> Self {
        joint.cells().collect()
    }
}

impl From<Vec<JointCell>> for JointDistribution {
    fn from(cells: Vec<JointCell>) -> Self {
        let mut map = BTreeMap::new();
        for cell in cells {
            *map.entry((cell.x, cell.y)).or_insert(0.0) += cell.percent;
        }
        JointDistribution(map)
    }
}

/// Running sum and sum of squares for one quantity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Moments {
    sum: f64,
    sum_sq: f64,
    n: u64,
}

impl Moments {
    pub fn record(&mut self, value: u32) {
        let v = value as f64;
        self.sum += v;
        self.sum_sq += v * v;
        self.n += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.sum / self.n as f64
    }

    /// Population standard deviation; rounding never yields a negative variance.
    pub fn std_dev(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.n as f64 - mean * mean).max(0.0).sqrt()
    }

    pub fn summary(&self) -> SymbolStats {
        SymbolStats {
            mean: self.mean(),
            std_dev: self.std_dev(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub mean: f64,
    pub std_dev: f64,
}
