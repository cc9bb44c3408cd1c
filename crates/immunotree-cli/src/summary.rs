use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Aggregate of trial values. `std_dev` is the population standard deviation.
pub struct Summary {
    pub trials: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl Summary {
    pub fn from_values(values: &[i64]) -> Self {
        if values.is_empty() {
            return Summary {
                trials: 0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Summary {
            trials: values.len(),
            mean,
            std_dev: variance.sqrt(),
        }
    }
}
