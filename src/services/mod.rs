pub mod generation;
pub mod provider;
pub mod quota;

pub use generation::*;
pub use provider::*;
pub use quota::*;
