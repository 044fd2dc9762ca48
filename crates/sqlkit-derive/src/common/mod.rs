//! Common utilities for the derive macros.

pub mod syn_types;
