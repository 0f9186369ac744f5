//! End-to-end pipeline scenarios.

mod persistence;
mod pipeline;
mod support;
