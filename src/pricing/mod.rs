pub mod calculator;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod tax;

pub use calculator::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use service::*;
pub use tax::*;
