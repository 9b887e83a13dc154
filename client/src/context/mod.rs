pub mod favorites;
pub mod token;
