//! Mathematical building blocks shared by the engines.
//!
//! - `distributions`: normal and Student-t distribution functions
//! - `statistics`: moments and dispersion estimators for return samples
//! - `solvers`: Newton-Raphson root finding

pub mod distributions;
pub mod solvers;
pub mod statistics;
