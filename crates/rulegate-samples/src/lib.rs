//! Sample mortgage-eligibility policy.
//!
//! A realistic policy of six rules over a [`MortgageApplication`], with
//! per-product thresholds (first-time buyer vs buy-to-let) stored in a
//! nested lookup. Used by the CLI and as an integration-test substrate;
//! nothing in here is required to embed the engine.

#![forbid(unsafe_code)]

pub mod application;
pub mod policy;

pub use application::MortgageApplication;
pub use policy::{mortgage_lookups, mortgage_policy};
