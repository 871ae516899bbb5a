//! Root-finding solvers.

mod config;
mod newton_raphson;

pub use config::SolverConfig;
pub use newton_raphson::{NewtonRaphsonSolver, NewtonReport, NewtonStatus};
