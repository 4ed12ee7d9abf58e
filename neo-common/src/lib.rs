//! Wire types shared between the NEO feed backend and its clients.

mod types;
pub use types::*;
