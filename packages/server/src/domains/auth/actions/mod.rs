//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers.

mod login;
mod password_reset;

pub use login::{login, me};
pub use password_reset::{
    forgot_password, reset_password, FORGOT_PASSWORD_MESSAGE, RESET_PASSWORD_MESSAGE,
    RESET_TOKEN_TTL_MINUTES,
};
