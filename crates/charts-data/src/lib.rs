//! Data layer for tutor-charts.
//!
//! Responsible for loading decoded workbook documents, classifying and
//! filtering sheets and rows, aggregating session records, and building the
//! chart descriptors handed to the rendering layer.

pub mod aggregator;
pub mod analysis;
pub mod builder;
pub mod filter;
pub mod reader;

pub use charts_core as core;
