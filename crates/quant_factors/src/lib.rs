//! # quant_factors: Multi-factor return models
//!
//! Ordinary-least-squares factor regressions, return attribution and
//! rolling-window loading stability.
//!
//! This crate provides:
//! - [`FactorCatalogue`]: named factor return series (synthetic
//!   Market/SMB/HML/UMD by default)
//! - [`ols::ols`]: normal-equation regression with t-statistics and p-values
//! - Pure model functions: [`fit_model`], [`attribute`], [`stability`]
//! - [`FactorEngine`]: provider-backed fits with a fingerprinted cache and
//!   concurrent batch exposures
//!
//! ## Conventions
//!
//! - Series are daily returns, oldest first, aligned on the trailing index
//! - `Factor::exposure` is the fitted loading
//! - R² lies in [0, 1]; adjusted R² is never clamped

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod catalogue;
pub mod engine;
pub mod model;
pub mod ols;

pub use catalogue::{FactorCatalogue, StandardFactor};
pub use engine::FactorEngine;
pub use model::{
    attribute, fit_model, stability, stability_score, Factor, FactorAttribution,
    FactorContribution, FactorModel, FactorStability, SIGNIFICANCE_LEVEL,
};
