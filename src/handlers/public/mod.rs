// Endpoints that need no token
pub mod info;
pub mod login;

pub use info::{health, root};
pub use login::login;
