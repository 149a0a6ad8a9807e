pub mod generation;
pub mod user;

pub use generation::*;
pub use user::*;
