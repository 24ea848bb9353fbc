use libm::erf;
use std::f64::consts::PI;

// Below this argument the series converges quickly; above it the
// erf + upward recursion route is stable.
const SERIES_LIMIT: f64 = 30.0;

/// Boys function F_n(x) = ∫_0^1 t^{2n} exp(-x t^2) dt.
pub fn boys_function(n: usize, x: f64) -> f64 {
    boys_table(n, x)[n]
}

/// F_0(x) .. F_nmax(x) in one pass.
pub fn boys_table(nmax: usize, x: f64) -> Vec<f64> {
    assert!(x >= 0.0, "Boys function argument must be nonnegative");
    let mut vals = vec![0.0; nmax + 1];
    let emx = (-x).exp();

    if x < SERIES_LIMIT {
        // F_N(x) = e^{-x} Σ_k (2x)^k / ((2N+1)(2N+3)...(2N+2k+1))
        let mut term = 1.0 / (2 * nmax + 1) as f64;
        let mut sum = term;
        for k in 1..500 {
            term *= 2.0 * x / (2 * nmax + 2 * k + 1) as f64;
            sum += term;
            if term < sum * 1e-17 {
                break;
            }
        }
        vals[nmax] = emx * sum;

        // downward recursion: F_{n-1} = (2x F_n + e^{-x}) / (2n - 1)
        for n in (1..=nmax).rev() {
            vals[n - 1] = (2.0 * x * vals[n] + emx) / (2 * n - 1) as f64;
        }
    } else {
        let sx = x.sqrt();
        vals[0] = 0.5 * (PI / x).sqrt() * erf(sx);
        for n in 1..=nmax {
            vals[n] = ((2 * n - 1) as f64 * vals[n - 1] - emx) / (2.0 * x);
        }
    }

    vals
}

// Simpson's rule integration
#[cfg(test)]
pub(crate) fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}
