//! Integration tests for Audit-Intel
//!
//! These tests use wiremock to stand in for the contest platform and run
//! the collector, storage, and API end-to-end.

mod api_tests;
mod collect_tests;
mod support;
