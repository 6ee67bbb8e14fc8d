//! Miscellaneous tools.

use ndarray::{ self as nd, concatenate };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use rustfft as fft;

/// Generate an array of frequency-space coordinates to accompany a FFT of `n`
/// points for sampling interval `dt`.
///
/// Frequencies are returned in FFT order, i.e. non-negative frequencies first,
/// followed by the negative ones in increasing order.
pub fn fft_freq(n: usize, dt: f64) -> nd::Array1<f64> {
    if n % 2 == 0 {
        let fp: nd::Array1<f64>
            = (0..n / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..n / 2 + 1).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    } else {
        let fp: nd::Array1<f64>
            = (0..(n + 1) / 2)
            .map(|k| k as f64 / (n as f64 * dt))
            .collect();
        let fm: nd::Array1<f64>
            = (1..(n + 1) / 2).rev()
            .map(|k| -(k as f64) / (n as f64 * dt))
            .collect();
        concatenate!(nd::Axis(0), fp, fm)
    }
}

// run a complex FFT over every lane of `a` along `axis`
//
// lanes need not be contiguous (e.g. columns of a row-major matrix), so each
// one is copied through a scratch buffer; the plan is shared by all lanes
fn transform_lanes<S, D>(
    a: &mut nd::ArrayBase<S, D>,
    axis: usize,
    direction: fft::FftDirection,
)
where
    S: nd::DataMut<Elem = C64>,
    D: nd::Dimension,
{
    let n = a.len_of(nd::Axis(axis));
    if n == 0 { return; }
    let mut planner = fft::FftPlanner::<f64>::new();
    let plan = planner.plan_fft(n, direction);
    let mut buf: Vec<C64> = vec![C64::zero(); n];
    for mut lane in a.lanes_mut(nd::Axis(axis)) {
        buf.iter_mut().zip(lane.iter()).for_each(|(b, l)| { *b = *l; });
        plan.process(&mut buf);
        lane.iter_mut().zip(&buf).for_each(|(l, b)| { *l = *b; });
    }
}

/// Perform the complex-valued FFT along one axis in place.
pub fn fft_axis_inplace<S, D>(a: &mut nd::ArrayBase<S, D>, axis: usize)
where
    S: nd::DataMut<Elem = C64>,
    D: nd::Dimension,
{
    transform_lanes(a, axis, fft::FftDirection::Forward);
}

/// Perform the complex-valued inverse FFT along one axis in place.
///
/// The result is normalized, so that this function undoes
/// [`fft_axis_inplace`].
pub fn ifft_axis_inplace<S, D>(a: &mut nd::ArrayBase<S, D>, axis: usize)
where
    S: nd::DataMut<Elem = C64>,
    D: nd::Dimension,
{
    transform_lanes(a, axis, fft::FftDirection::Inverse);
    let n = a.len_of(nd::Axis(axis)) as f64;
    a.map_inplace(|ak| { *ak /= n; });
}
