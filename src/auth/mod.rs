// Authentication module
// Verifies bearer tokens issued by the external auth provider; admin routes
// require the `admin` role

pub mod error;
pub mod middleware;
pub mod token;

pub use error::AuthError;
pub use middleware::AdminUser;
pub use token::{Claims, Role, TokenService};
