//! Property-based tests for gradient color math

mod brightening;
