//! Location Marks - multiset of marks given to one location
//!
//! Keeps a running sum next to the marks so averaging never rescans.

/// Number of decimal digits the average mark is rounded to
pub const AVG_DECIMALS: i32 = 5;

/// Marks recorded for a single location
#[derive(Debug, Clone, Default)]
pub struct LocationMarks {
    marks: Vec<u8>,
    sum: u64,
}

impl LocationMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mark: u8) {
        self.marks.push(mark);
        self.sum += u64::from(mark);
    }

    pub fn marks(&self) -> &[u8] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Mean mark rounded to `AVG_DECIMALS` digits, `None` without marks
    pub fn average(&self) -> Option<f64> {
        if self.marks.is_empty() {
            return None;
        }
        let mean = self.sum as f64 / self.marks.len() as f64;
        Some(round_to(mean, AVG_DECIMALS))
    }
}

/// Round half away from zero to `digits` decimal places
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
