pub mod pagination;
pub mod phone;

pub use pagination::*;
pub use phone::*;
