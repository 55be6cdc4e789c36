#[path = "../common/mod.rs"]
mod common;

mod ladder_store_tests;
mod test_helpers;
