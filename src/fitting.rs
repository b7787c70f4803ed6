#![warn(missing_docs)]
//! Nonlinear least-squares curve fitting.
//!
//! This module wraps the Levenberg-Marquardt solver of the `levenberg-marquardt` crate behind a
//! simple functional interface: a model `f(x, p)`, the data points `(x, y)` and an initial guess
//! for the parameters `p`. The Jacobian is approximated by central finite differences so that
//! any closure can be fitted.
use crate::error::{BeamPropError, BpResult};
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::debug;
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};

/// Result of a successful [`curve_fit`].
#[derive(Debug, Clone)]
pub struct CurveFit {
    params: DVector<f64>,
    covariance: Option<DMatrix<f64>>,
    evaluations: usize,
}
impl CurveFit {
    /// Returns the fitted parameters in the order of the initial guess.
    #[must_use]
    pub const fn params(&self) -> &DVector<f64> {
        &self.params
    }
    /// Returns the estimated covariance of the fitted parameters.
    ///
    /// The covariance is `(JᵀJ)⁻¹ · SSR / (m - n)` with the Jacobian `J` at the solution. It is
    /// `None` if there are not more data points than parameters or if `JᵀJ` is singular.
    #[must_use]
    pub const fn covariance(&self) -> Option<&DMatrix<f64>> {
        self.covariance.as_ref()
    }
    /// Returns the standard errors (square root of the covariance diagonal) if a covariance is available.
    #[must_use]
    pub fn standard_errors(&self) -> Option<DVector<f64>> {
        self.covariance
            .as_ref()
            .map(|cov| cov.diagonal().map(f64::sqrt))
    }
    /// Returns the number of model evaluations performed by the solver.
    #[must_use]
    pub const fn evaluations(&self) -> usize {
        self.evaluations
    }
}

struct CurveFitProblem<'a, F>
where
    F: Fn(f64, &DVector<f64>) -> f64,
{
    model: F,
    x: &'a [f64],
    y: &'a [f64],
    params: DVector<f64>,
}

impl<F> CurveFitProblem<'_, F>
where
    F: Fn(f64, &DVector<f64>) -> f64,
{
    fn residuals_for(&self, params: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(self.y)
                .map(|(x, y)| (self.model)(*x, params) - y),
        )
    }
}

impl<F> LeastSquaresProblem<f64, Dyn, Dyn> for CurveFitProblem<'_, F>
where
    F: Fn(f64, &DVector<f64>) -> f64,
{
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, params: &DVector<f64>) {
        self.params.copy_from(params);
    }
    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }
    fn residuals(&self) -> Option<DVector<f64>> {
        let residuals = self.residuals_for(&self.params);
        residuals.iter().all(|r| r.is_finite()).then_some(residuals)
    }
    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let step_scale = f64::EPSILON.cbrt();
        let mut jacobian = DMatrix::<f64>::zeros(self.x.len(), self.params.len());
        for (col, p) in self.params.iter().enumerate() {
            let step = if *p == 0.0 {
                step_scale
            } else {
                step_scale * p.abs()
            };
            let mut forward = self.params.clone();
            forward[col] += step;
            let mut backward = self.params.clone();
            backward[col] -= step;
            let derivative =
                (self.residuals_for(&forward) - self.residuals_for(&backward)) / (2.0 * step);
            jacobian.set_column(col, &derivative);
        }
        jacobian.iter().all(|d| d.is_finite()).then_some(jacobian)
    }
}

/// Fit the parameters of `model` to the data points `(x, y)` by nonlinear least squares.
///
/// The model is called as `model(x, p)` and must return the predicted `y` value. The solver
/// starts at `initial_guess`.
///
/// # Errors
///
/// This function will return an error if
///   - `x` and `y` differ in length, the initial guess is empty or there are fewer data points than parameters.
///   - the data contains non-finite values.
///   - the solver does not converge ([`BeamPropError::FitDidNotConverge`]).
pub fn curve_fit<F>(model: F, x: &[f64], y: &[f64], initial_guess: &[f64]) -> BpResult<CurveFit>
where
    F: Fn(f64, &DVector<f64>) -> f64,
{
    if x.len() != y.len() {
        return Err(BeamPropError::InvalidParameter(format!(
            "number of x values ({}) and y values ({}) must be equal",
            x.len(),
            y.len()
        )));
    }
    if initial_guess.is_empty() {
        return Err(BeamPropError::InvalidParameter(
            "at least one parameter must be fitted".into(),
        ));
    }
    if x.len() < initial_guess.len() {
        return Err(BeamPropError::InvalidParameter(format!(
            "{} data points are not enough to fit {} parameters",
            x.len(),
            initial_guess.len()
        )));
    }
    if x.iter().chain(y).chain(initial_guess).any(|v| !v.is_finite()) {
        return Err(BeamPropError::InvalidParameter(
            "fit data and initial guess must be finite".into(),
        ));
    }
    let problem = CurveFitProblem {
        model,
        x,
        y,
        params: DVector::from_column_slice(initial_guess),
    };
    let (problem, report) = LevenbergMarquardt::new().minimize(problem);
    debug!(
        "curve fit finished after {} evaluations: {:?}",
        report.number_of_evaluations, report.termination
    );
    if !report.termination.was_successful() {
        return Err(BeamPropError::FitDidNotConverge(format!(
            "{:?} after {} evaluations",
            report.termination, report.number_of_evaluations
        )));
    }
    let params = problem.params();
    if params.iter().any(|p| !p.is_finite()) {
        return Err(BeamPropError::FitDidNotConverge(
            "solver returned non-finite parameters".into(),
        ));
    }
    let covariance = estimate_covariance(&problem);
    Ok(CurveFit {
        params,
        covariance,
        evaluations: report.number_of_evaluations,
    })
}

fn estimate_covariance<F>(problem: &CurveFitProblem<'_, F>) -> Option<DMatrix<f64>>
where
    F: Fn(f64, &DVector<f64>) -> f64,
{
    let nr_of_points = problem.x.len();
    let nr_of_params = problem.params.len();
    if nr_of_points <= nr_of_params {
        return None;
    }
    let jacobian = problem.jacobian()?;
    let residuals = problem.residuals()?;
    #[allow(clippy::cast_precision_loss)]
    let variance = residuals.norm_squared() / (nr_of_points - nr_of_params) as f64;
    (jacobian.transpose() * &jacobian)
        .try_inverse()
        .map(|inverse| inverse * variance)
}
