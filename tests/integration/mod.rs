//! Integration tests for the glint resolution engine

mod attempt_suppression;
mod gradient_cache;
mod resolver_chain;
