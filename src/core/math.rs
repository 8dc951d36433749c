/// Logistic transform `1 / (1 + e^-x)`
#[inline]
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Hard clamp into [0, 1]; NaN collapses to 0
#[inline]
pub fn clip01(x: f64) -> f64 {
    x.max(0.0).min(1.0)
}

/// Keep a probability `epsilon` away from 0 and 1
#[inline]
pub fn clamp_probability(p: f64, epsilon: f64) -> f64 {
    p.max(epsilon).min(1.0 - epsilon)
}

/// Log-odds of a probability already clamped away from 0 and 1
#[inline]
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// `1 - |x - y|`, clipped
#[inline]
pub fn closeness(x: f64, y: f64) -> f64 {
    clip01(1.0 - (x - y).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_midpoint() {
        assert_eq!(logistic(0.0), 0.5);
        assert!(logistic(10.0) > 0.9999);
        assert!(logistic(-10.0) < 0.0001);
    }

    #[test]
    fn test_clip01_handles_nan() {
        assert_eq!(clip01(f64::NAN), 0.0);
        assert_eq!(clip01(-3.0), 0.0);
        assert_eq!(clip01(7.0), 1.0);
        assert_eq!(clip01(0.25), 0.25);
    }

    #[test]
    fn test_logit_inverts_logistic() {
        for p in [0.1, 0.5, 0.9] {
            assert!((logistic(logit(p)) - p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clamp_probability() {
        assert_eq!(clamp_probability(0.0, 1e-6), 1e-6);
        assert_eq!(clamp_probability(1.0, 1e-6), 1.0 - 1e-6);
        assert!(logit(clamp_probability(0.0, 1e-6)).is_finite());
    }
}
