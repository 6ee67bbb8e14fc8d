//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Representation](#representation)
//! - [Runge-Kutta integration](#runge-kutta-integration)
//! - [Chebychev propagation](#chebychev-propagation)
//! - [Relaxation](#relaxation)
//!
//! # Background
//! The dynamics of a closed quantum system are governed by the time-dependent
//! Schrödinger equation for a wave function, or the Liouville-von Neumann
//! equation for a density operator,
//! ```text
//! ∂ψ                     ∂ρ
//! -- = -i H ψ            -- = -i [H, ρ]
//! ∂t                     ∂t
//! ```
//! in units where *ħ* = 1. Both have the form *∂X*/*∂t* = *L*(*X*, *t*) with a
//! linear "generator" *L*, which is the only thing the solvers in this crate
//! ever see: a solver does not know whether it is propagating a wave function
//! or a density operator, and treats both as abstract vectors that can be
//! added and scaled.
//!
//! Two families of solvers are provided. General-purpose adaptive
//! Runge-Kutta integration works for any generator, including explicitly
//! time-dependent ones (e.g. a molecule in a laser field), but converges only
//! polynomially in the time step. For time-independent generators, a
//! polynomial expansion of the propagator *e*<sup>-i *H* *dt*</sup> in
//! Chebychev polynomials converges exponentially and can take very large
//! steps.
//!
//! # Representation
//! All states live on an equidistant grid
//! ```text
//! x[j] = x₀ + j δx, j ∊ {0, ..., N - 1}
//! ```
//! with periodic boundary conditions, and are stored in a *weighted* discrete
//! variable representation (DVR), where the coefficients are the values of
//! the wave function at the grid points times the square root of the
//! quadrature weight,
//! ```text
//! c[j] = √δx ψ(x[j])
//! ```
//! so that scalar products reduce to plain sums over coefficients. Local
//! operators such as potentials are diagonal in this representation. The
//! kinetic energy *k*²/2 *m* is diagonal in the conjugate plane-wave
//! representation and is applied with a pair of fast Fourier transforms:
//! ```text
//!       ψ[j]
//!         |
//!         '--> FFT ---.
//!                     |
//!                     V
//!                 k² / 2m
//!                     |
//!         .-- iFFT <--'
//!         |
//!         V
//!    (T ψ)[j]
//! ```
//! For a density operator *ρ*\[*i*, *j*\] (ket index *i*, bra index *j*),
//! multiplication from the left transforms along the first axis and
//! multiplication from the right along the second. The spectrum of the
//! kinetic energy is bounded by *k*<sub>max</sub>²/2 *m* with
//! *k*<sub>max</sub> = *π*/*δx*, which is what makes polynomial propagation
//! possible in the first place.
//!
//! # Runge-Kutta integration
//! The adaptive integrator uses the explicit embedded Runge-Kutta pair of
//! Dormand and Prince[^1], which produces a fifth-order solution along with a
//! fourth-order one from the same seven stages. Their difference estimates the
//! local error, which is measured in a scaled root-mean-square norm
//! ```text
//!                          y_new[j] - ŷ_new[j]
//! err² = (1/N) Σ  ( --------------------------------------- )²
//!               j   atol + rtol max(|y[j]|, |y_new[j]|)
//! ```
//! and a substep is accepted if *err* ≤ 1. In either case the next substep
//! size is
//! ```text
//! h' = h min(10, max(0.2, 0.9 err^(-1/5)))
//! ```
//! The last stage of an accepted substep is the first stage of the next one
//! ("first same as last"), so only six generator evaluations are needed per
//! substep. A nominal step *dt* is broken into as many substeps as needed,
//! with the last one shortened to land exactly on *t* + *dt*.
//!
//! # Chebychev propagation
//! For a time-independent Hamiltonian whose spectrum lies in
//! \[*E*<sub>min</sub>, *E*<sub>max</sub>\], define *ΔE* = *E*<sub>max</sub> -
//! *E*<sub>min</sub> and the normalized Hamiltonian
//! ```text
//!          2                ΔE
//! H_norm = -- (H - E_min - --)
//!          ΔE               2
//! ```
//! whose spectrum lies in \[-1, 1\]. With *α* = *ΔE* *dt*/2, the Jacobi-Anger
//! expansion gives[^2]
//! ```text
//!  -i H dt    -i (E_min + ΔE/2) dt   ∞
//! e         = e                      Σ a[n] (-i)ⁿ T[n](H_norm)
//!                                   n=0
//! ```
//! with Chebychev polynomials *T*\[*n*\] and coefficients *a*\[0\] =
//! *J*<sub>0</sub>(*α*), *a*\[*n*\] = 2 *J*<sub>*n*</sub>(*α*) given by Bessel
//! functions of the first kind. The terms *φ*\[*n*\] = (-*i*)<sup>*n*</sup>
//! *T*\[*n*\](*H*<sub>norm</sub>) *ψ* follow from the Chebychev recursion
//! ```text
//! φ[0] = ψ
//! φ[1] = X ψ
//! φ[n] = 2 X φ[n - 1] + φ[n - 2],       X = -i H_norm
//! ```
//! so every order costs one application of the generator. Because
//! |*T*\[*n*\](*x*)| ≤ 1 on \[-1, 1\], the error of truncating after order *N*
//! is bounded by the sum of the omitted coefficients, independently of the
//! state. For *n* > *α*, the Bessel functions decay super-exponentially,
//! ```text
//!             (α/2)ⁿ
//! |J_n(α)| ≤ ------
//!              n!
//! ```
//! so the order needed for a fixed accuracy grows only linearly with *α*, and
//! large time steps are cheaper than small ones. Conversely, if the actual
//! spectrum extends past the supplied bounds, the polynomials grow
//! exponentially in *n* and the result diverges. This cannot be detected from
//! within the recursion and shows up as a drifting norm.
//!
//! The Bessel functions themselves are computed for all orders at once with
//! Miller's backward recurrence[^3],
//! ```text
//!             2 n
//! J[n - 1] = --- J[n] - J[n + 1]
//!              x
//! ```
//! started at an order well beyond *x* from arbitrary small values and
//! normalized with the sum rule *J*<sub>0</sub> + 2 Σ *J*<sub>2*k*</sub> = 1.
//! Backward recurrence is stable for the minimal solution, whereas the
//! forward direction loses all precision as soon as *n* > *x*.
//!
//! # Relaxation
//! Substituting *t* → -*i* *τ* turns the propagator into
//! *e*<sup>-*H* *τ*</sup>, which damps every eigenstate with its energy.
//! Repeated application with renormalization in between converges to the
//! lowest eigenstate that overlaps with the initial state (or, applied to a
//! unit density operator, yields the thermal density operator at temperature
//! 1/*τ*). The same expansion applies with modified Bessel functions,
//! ```text
//!  -H dt    -E_min dt   ∞
//! e       = e           Σ a[n] (-1)ⁿ T[n](H_norm),   a[n] = (2 - δ[n, 0]) e^(-α) I_n(α)
//!                      n=0
//! ```
//! where the factor *e*<sup>-*α*</sup> keeps the coefficients bounded by 1.
//! With *X* = -*H*<sub>norm</sub>, the sign of the last term of the recursion
//! flips:
//! ```text
//! φ[n] = 2 X φ[n - 1] - φ[n - 2]
//! ```
//! Imaginary time only has a meaningful action from the left, so the same
//! propagator applies to wave functions and density operators alike.
//!
//! [^1]: J. R. Dormand and P. J. Prince, "A family of embedded Runge-Kutta
//! formulae." J. Comput. Appl. Math. **6** 1 19-26 (1980).
//!
//! [^2]: H. Tal-Ezer and R. Kosloff, "An accurate and efficient scheme for
//! propagating the time dependent Schrödinger equation." J. Chem. Phys.
//! **81** 3967 (1984).
//!
//! [^3]: W. H. Press et al., *Numerical Recipes* (3rd ed.), §6.5. Cambridge
//! University Press (2007).
