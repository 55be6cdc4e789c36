pub mod test_utils;
pub mod tracing_utils;
