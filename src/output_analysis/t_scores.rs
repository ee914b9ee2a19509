//! Two-sided Student's t critical values, `t(1 - alpha / 2, df)`.  Degrees
//! of freedom beyond the table use the closest smaller tabulated row, which
//! gives a slightly wider (conservative) interval.

use num_traits::Float;

use crate::utils::errors::SimulationError;

const ALPHAS: [f64; 6] = [0.2, 0.1, 0.05, 0.02, 0.01, 0.001];

// Rows: degrees of freedom 1..=30, then 40, 60, and 120
const TABLE: [(usize, [f64; 6]); 33] = [
    (1, [3.078, 6.314, 12.706, 31.821, 63.657, 636.619]),
    (2, [1.886, 2.920, 4.303, 6.965, 9.925, 31.599]),
    (3, [1.638, 2.353, 3.182, 4.541, 5.841, 12.924]),
    (4, [1.533, 2.132, 2.776, 3.747, 4.604, 8.610]),
    (5, [1.476, 2.015, 2.571, 3.365, 4.032, 6.869]),
    (6, [1.440, 1.943, 2.447, 3.143, 3.707, 5.959]),
    (7, [1.415, 1.895, 2.365, 2.998, 3.499, 5.408]),
    (8, [1.397, 1.860, 2.306, 2.896, 3.355, 5.041]),
    (9, [1.383, 1.833, 2.262, 2.821, 3.250, 4.781]),
    (10, [1.372, 1.812, 2.228, 2.764, 3.169, 4.587]),
    (11, [1.363, 1.796, 2.201, 2.718, 3.106, 4.437]),
    (12, [1.356, 1.782, 2.179, 2.681, 3.055, 4.318]),
    (13, [1.350, 1.771, 2.160, 2.650, 3.012, 4.221]),
    (14, [1.345, 1.761, 2.145, 2.624, 2.977, 4.140]),
    (15, [1.341, 1.753, 2.131, 2.602, 2.947, 4.073]),
    (16, [1.337, 1.746, 2.120, 2.583, 2.921, 4.015]),
    (17, [1.333, 1.740, 2.110, 2.567, 2.898, 3.965]),
    (18, [1.330, 1.734, 2.101, 2.552, 2.878, 3.922]),
    (19, [1.328, 1.729, 2.093, 2.539, 2.861, 3.883]),
    (20, [1.325, 1.725, 2.086, 2.528, 2.845, 3.850]),
    (21, [1.323, 1.721, 2.080, 2.518, 2.831, 3.819]),
    (22, [1.321, 1.717, 2.074, 2.508, 2.819, 3.792]),
    (23, [1.319, 1.714, 2.069, 2.500, 2.807, 3.768]),
    (24, [1.318, 1.711, 2.064, 2.492, 2.797, 3.745]),
    (25, [1.316, 1.708, 2.060, 2.485, 2.787, 3.725]),
    (26, [1.315, 1.706, 2.056, 2.479, 2.779, 3.707]),
    (27, [1.314, 1.703, 2.052, 2.473, 2.771, 3.690]),
    (28, [1.313, 1.701, 2.048, 2.467, 2.763, 3.674]),
    (29, [1.311, 1.699, 2.045, 2.462, 2.756, 3.659]),
    (30, [1.310, 1.697, 2.042, 2.457, 2.750, 3.646]),
    (40, [1.303, 1.684, 2.021, 2.423, 2.704, 3.551]),
    (60, [1.296, 1.671, 2.000, 2.390, 2.660, 3.460]),
    (120, [1.289, 1.658, 1.980, 2.358, 2.617, 3.373]),
];

/// The critical value for a two-sided interval at significance `alpha`,
/// with `degrees_of_freedom` degrees of freedom.
pub fn t_score<T: Float>(alpha: T, degrees_of_freedom: usize) -> Result<T, SimulationError> {
    let alpha = alpha.to_f64().ok_or(SimulationError::FloatConvError)?;
    let column = ALPHAS
        .iter()
        .position(|tabulated| (tabulated - alpha).abs() < 1.0e-9)
        .ok_or(SimulationError::UnsupportedConfidenceLevel(alpha))?;
    let degrees_of_freedom = degrees_of_freedom.max(1);
    let row = TABLE
        .iter()
        .rev()
        .find(|(df, _)| *df <= degrees_of_freedom)
        .unwrap_or(&TABLE[0]);
    T::from(row.1[column]).ok_or(SimulationError::FloatConvError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabulated_values_are_returned() -> Result<(), SimulationError> {
        assert_eq!(t_score(0.05, 9)?, 2.262);
        assert_eq!(t_score(0.1, 29)?, 1.699);
        assert_eq!(t_score(0.001, 1)?, 636.619);
        Ok(())
    }

    #[test]
    fn large_samples_fall_back_to_smaller_rows() -> Result<(), SimulationError> {
        assert_eq!(t_score(0.05, 45)?, 2.021);
        assert_eq!(t_score(0.05, 119)?, 2.000);
        assert_eq!(t_score(0.05, 100_000)?, 1.980);
        Ok(())
    }

    #[test]
    fn untabulated_alpha_is_an_error() {
        assert!(matches!(
            t_score(0.07, 10),
            Err(SimulationError::UnsupportedConfidenceLevel(_))
        ));
    }
}
