//! Web service for the composite predictor
//!
//! Serves the input form, the two-stage prediction endpoint and the
//! health/metrics endpoints on top of [`predictor_lib`].

pub mod api;
pub mod config;
pub mod form;
