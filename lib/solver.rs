//! Common interface of all propagators.
//!
//! A [`Solver`] advances a state by one fixed, elementary time step. Longer
//! propagations are driven through [`Solver::propagate`], which returns a lazy
//! [`Propagation`] that yields the state at every multiple of the time step,
//! starting with the initial state itself.

use std::iter::FusedIterator;
use crate::{ error::PropResult, state::State };

/// A propagator with a fixed elementary time step.
pub trait Solver {
    /// The elementary time step.
    fn dt(&self) -> f64;

    /// Propagate `state` from time `t` to `t + dt`.
    ///
    /// The input state is left untouched; on failure, nothing is lost.
    fn step(&self, state: &State, t: f64) -> PropResult<State>;

    /// Propagate `state` over `num_steps` elementary time steps starting at
    /// `t0`.
    ///
    /// The returned iterator yields exactly `num_steps + 1` items at the times
    /// `t0 + k dt`, the first one being the initial state, unless a step
    /// fails; the error is then yielded in place of the state and the
    /// iterator ends. Nothing is computed until the iterator is advanced.
    fn propagate(&self, state: State, t0: f64, num_steps: usize)
        -> Propagation<'_, Self>
    {
        Propagation {
            solver: self,
            state,
            t0,
            k: 0,
            num_steps,
            done: false,
        }
    }
}

impl<S> Solver for &S
where S: Solver + ?Sized
{
    fn dt(&self) -> f64 { (**self).dt() }

    fn step(&self, state: &State, t: f64) -> PropResult<State> {
        (**self).step(state, t)
    }
}

/// Lazy, single-pass sequence of `(time, state)` pairs produced by
/// [`Solver::propagate`].
pub struct Propagation<'a, S>
where S: Solver + ?Sized
{
    solver: &'a S,
    // state at `t0 + k dt`
    state: State,
    t0: f64,
    k: usize,
    num_steps: usize,
    done: bool,
}

impl<'a, S> Propagation<'a, S>
where S: Solver + ?Sized
{
    fn time(&self, k: usize) -> f64 { self.t0 + k as f64 * self.solver.dt() }

    /// Consume the rest of the sequence and return the last state.
    pub fn last_state(self) -> PropResult<(f64, State)> {
        let t0 = self.t0;
        let init = self.state.clone();
        let mut last = (t0, init);
        for item in self {
            last = item?;
        }
        Ok(last)
    }
}

impl<'a, S> Iterator for Propagation<'a, S>
where S: Solver + ?Sized
{
    type Item = PropResult<(f64, State)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done { return None; }
        if self.k == 0 {
            self.k = 1;
            if self.num_steps == 0 { self.done = true; }
            return Some(Ok((self.t0, self.state.clone())));
        }
        match self.solver.step(&self.state, self.time(self.k - 1)) {
            Ok(next) => {
                let t = self.time(self.k);
                self.state = next;
                if self.k == self.num_steps {
                    self.done = true;
                } else {
                    self.k += 1;
                }
                Some(Ok((t, self.state.clone())))
            },
            Err(err) => {
                self.done = true;
                Some(Err(err))
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done { return (0, Some(0)); }
        let rem = self.num_steps + 1 - self.k;
        (0, Some(rem))
    }
}

impl<'a, S> FusedIterator for Propagation<'a, S>
where S: Solver + ?Sized
{ }
