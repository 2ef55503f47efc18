pub mod handler;
pub mod model;
