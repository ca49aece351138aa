//! Auth domain - email/password login, JWT sessions, password reset
//!
//! Responsibilities:
//! - bcrypt password hashing
//! - JWT token issue and verification
//! - Single-use, hashed password reset tokens

pub mod actions;
pub mod data;
pub mod jwt;
pub mod password;

pub use data::{
    ForgotPasswordInput, LoginInput, LoginResponse, MessageResponse, ResetPasswordInput,
};
pub use jwt::{Claims, JwtService};
