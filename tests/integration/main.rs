#[path = "../common/mod.rs"]
mod common;

mod ladder_flow_tests;
