//! Display wrappers that print client values in the colored key/value log style.

pub mod favorites;
pub mod instruction_error;
