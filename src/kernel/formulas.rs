//! Stateless mappings from raw counts and ratios to normalized risk
//! contributions in `[0, 1]`.

/// Floor applied to every divisor.
pub const DIVISOR_FLOOR: f64 = 1e-9;

/// Clamps `value` into `[lo, hi]`. NaN maps to `lo`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() || value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

pub fn clamp_unit(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

pub fn sigmoid(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    // exp(-x) saturates to inf for very negative x, which still yields 0.
    clamp_unit(1.0 / (1.0 + (-x).exp()))
}

/// Saturating violation pressure: `1 - exp(-lambda1 * violations)`.
pub fn violation_pressure(violations: u64, lambda1: f64) -> f64 {
    clamp_unit(1.0 - (-lambda1 * violations as f64).exp())
}

pub fn context_drift(drift: f64, dmax: f64) -> f64 {
    clamp_unit(drift / dmax.max(DIVISOR_FLOOR))
}

pub fn tool_instability(open_ratio: f64) -> f64 {
    clamp_unit(open_ratio)
}

/// Retry rate over the window relative to the tolerated rate. Zero when no
/// requests were seen, whatever the retry count.
pub fn retry_pressure(retries: u64, requests: u64, rmax: f64) -> f64 {
    if requests == 0 {
        return 0.0;
    }
    let rate = retries as f64 / requests as f64;
    clamp_unit(rate / rmax.max(DIVISOR_FLOOR))
}

pub fn reset_staleness(reset_age_seconds: f64, t_target: f64, k: f64) -> f64 {
    sigmoid(k * (reset_age_seconds - t_target))
}
