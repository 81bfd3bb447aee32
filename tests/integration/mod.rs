//! Integration tests for table-insight.

pub mod http_test;
pub mod support;
