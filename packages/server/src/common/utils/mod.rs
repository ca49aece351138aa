pub mod tokens;
pub mod validation;

pub use tokens::*;
pub use validation::*;
