pub mod configure;
pub mod schema;
pub mod status;
