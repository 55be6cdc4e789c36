pub mod constants;
pub mod integrity;
pub mod resolver;
pub mod structures;
pub mod validation;
