//! Pulse shapes and laser fields, for use with
//! [`TimeDependentOperator`][crate::operator::TimeDependentOperator].
//!
//! All shapes are normalized to a maximum of 1 and vanish identically outside
//! a finite window, unlike a Gaussian.

use std::f64::consts::FRAC_PI_2;
use crate::error::{ PropError, PropResult };

/// Squared-cosine pulse `cos^2(pi (t - t0) / 2 half_width)` inside
/// `|t - t0| < half_width`, zero outside.
pub fn sin_square(t0: f64, half_width: f64) -> PropResult<impl Fn(f64) -> f64> {
    PropError::check_width(half_width)?;
    let scale = FRAC_PI_2 / half_width;
    Ok(move |t: f64| {
        let dt = (t - t0).abs();
        if dt < half_width { (scale * dt).cos().powi(2) } else { 0.0 }
    })
}

/// Rectangular pulse equal to 1 on `[t0 - half_width, t0 + half_width]`,
/// switched on and off over a time `border` with a quarter cosine period.
pub fn soft_rectangle(t0: f64, half_width: f64, border: f64)
    -> PropResult<impl Fn(f64) -> f64>
{
    PropError::check_width(half_width)?;
    PropError::check_width(border)?;
    let scale = FRAC_PI_2 / border;
    let rect_min = t0 - half_width;
    let rect_max = t0 + half_width;
    Ok(move |t: f64| {
        if t <= rect_min - border || t >= rect_max + border {
            0.0
        } else if t < rect_min {
            (scale * (rect_min - t)).cos()
        } else if t <= rect_max {
            1.0
        } else {
            (scale * (t - rect_max)).cos()
        }
    })
}

/// [`soft_rectangle`] with a border of a tenth of the half-width.
pub fn soft_rectangle_default(t0: f64, half_width: f64)
    -> PropResult<impl Fn(f64) -> f64>
{
    soft_rectangle(t0, half_width, half_width / 10.0)
}

/// Laser field `max_field * shape(t) * cos(omega t + phi)`.
///
/// Multiply with a dipole operator to couple it to the system:
/// ```ignore
/// let field = laser_field(0.1, sin_square(50.0, 50.0)?, 1.0, 0.0);
/// let coupling = TimeDependentOperator::new(Potential::new(&grid, |x| -x), field);
/// ```
pub fn laser_field<F>(max_field: f64, shape: F, omega: f64, phi: f64)
    -> impl Fn(f64) -> f64
where F: Fn(f64) -> f64
{
    move |t: f64| max_field * shape(t) * (omega * t + phi).cos()
}
