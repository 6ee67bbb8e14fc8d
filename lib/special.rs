//! Bessel-function sequences for the polynomial expansion coefficients, and
//! the analytic bound on the truncation error.
//!
//! Both sequences are computed with Miller's backward recurrence: starting
//! well above the highest requested order with arbitrary values, the
//! recurrence relation is run downward (where it is numerically stable for
//! the minimal solution) and the result is fixed up by a sum rule. This gives
//! every order up to `nmax` in a single pass at full relative precision,
//! including the deep tail that decides where the expansion is truncated.

// running values are rescaled by this factor whenever they exceed its inverse
const RESCALE: f64 = 1e-10;

// first index of the backward recurrence for orders up to `nmax` at `x`
//
// the start must lie well beyond both `nmax` and the turning point at `n = x`,
// where the sequence changes from oscillating (or slowly varying) to rapidly
// decaying; the margin grows like the square root of the order
fn start_index(x: f64, nmax: usize) -> usize {
    let n = nmax.max(x.ceil() as usize).max(1);
    let m = n + ((160 * n) as f64).sqrt() as usize + 10;
    m + m % 2
}

// first index of the backward recurrence for `exp(-x) I_n(x)`
//
// past `n ~ sqrt(x)` the scaled values fall off like `exp(-n^2 / 2x)`, so for
// large `x` the start need not reach the turning point
fn start_index_scaled(x: f64, nmax: usize) -> usize {
    let turn = x.min((200.0 * x).sqrt()).ceil() as usize;
    let n = nmax.max(turn).max(1);
    let m = n + ((160 * n) as f64).sqrt() as usize + (40.0 * x).sqrt() as usize + 10;
    m + m % 2
}

// run `next(k, this, above)`, yielding the value at `k - 1`, from `m` down to
// 1; returns all values for orders `0..=m` up to a common factor
fn backward_recurrence<F>(m: usize, next: F) -> Vec<f64>
where F: Fn(usize, f64, f64) -> f64
{
    let mut vals: Vec<f64> = vec![0.0; m + 2];
    vals[m] = 1.0;
    for k in (1..=m).rev() {
        let prev = next(k, vals[k], vals[k + 1]);
        vals[k - 1] = prev;
        if prev.abs() > RESCALE.recip() {
            vals[k - 1..].iter_mut().for_each(|v| { *v *= RESCALE; });
        }
    }
    vals.truncate(m + 1);
    vals
}

/// Compute the Bessel functions of the first kind `J_n(x)` for all orders
/// `n = 0..=nmax`.
///
/// Negative arguments are handled through `J_n(-x) = (-1)^n J_n(x)`.
pub fn bessel_j_sequence(x: f64, nmax: usize) -> Vec<f64> {
    if x == 0.0 {
        let mut res = vec![0.0; nmax + 1];
        res[0] = 1.0;
        return res;
    }
    let ax = x.abs();
    let m = start_index(ax, nmax);
    let mut vals = backward_recurrence(m, |k, this, above| {
        2.0 * k as f64 / ax * this - above
    });
    // J_0 + 2 (J_2 + J_4 + ...) = 1
    let norm: f64
        = vals[0] + 2.0 * vals.iter().skip(2).step_by(2).sum::<f64>();
    vals.truncate(nmax + 1);
    vals.iter_mut().enumerate()
        .for_each(|(n, v)| {
            *v /= norm;
            if x < 0.0 && n % 2 == 1 { *v = -*v; }
        });
    vals
}

/// Compute the exponentially scaled modified Bessel functions of the first
/// kind `exp(-x) I_n(x)` for all orders `n = 0..=nmax` and `x >= 0`.
///
/// The scaling keeps the values finite for large arguments, where `I_n(x)`
/// itself overflows.
///
/// *Panics* if `x` is negative.
pub fn bessel_i_scaled_sequence(x: f64, nmax: usize) -> Vec<f64> {
    assert!(x >= 0.0, "bessel_i_scaled_sequence: argument must be non-negative");
    if x == 0.0 {
        let mut res = vec![0.0; nmax + 1];
        res[0] = 1.0;
        return res;
    }
    let m = start_index_scaled(x, nmax);
    let mut vals = backward_recurrence(m, |k, this, above| {
        2.0 * k as f64 / x * this + above
    });
    // exp(-x) (I_0 + 2 I_1 + 2 I_2 + ...) = 1
    let norm: f64 = vals[0] + 2.0 * vals.iter().skip(1).sum::<f64>();
    vals.truncate(nmax + 1);
    vals.iter_mut().for_each(|v| { *v /= norm; });
    vals
}

/// Analytic bound on the truncation error of an expansion at argument
/// `alpha` whose last summed order is `order`:
/// `2 * sum_{n > order} (alpha / 2)^n / n!`.
///
/// This bounds the tail of both the `2 |J_n(alpha)|` and the `2 I_n(alpha)`
/// coefficient sequences (the latter before exponential scaling).
pub fn truncation_bound(alpha: f64, order: usize) -> f64 {
    let half = alpha.abs() / 2.0;
    if half == 0.0 { return 0.0; }
    // first term of the tail, built up in log space to avoid overflow
    let n0 = order + 1;
    let log_first: f64
        = n0 as f64 * half.ln()
        - (1..=n0).map(|k| (k as f64).ln()).sum::<f64>();
    let mut term = log_first.exp();
    let mut acc = 0.0;
    let mut n = n0;
    while term > 0.0 && (acc == 0.0 || term > acc * f64::EPSILON) {
        acc += term;
        n += 1;
        term *= half / n as f64;
        // terms keep growing until n > alpha / 2; cap the work regardless
        if n > n0 + 100_000 { break; }
    }
    2.0 * acc
}
