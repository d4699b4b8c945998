pub mod convert;
pub mod server;
