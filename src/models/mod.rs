pub mod common;
pub mod event;
pub mod payment;
pub mod refund;
pub mod reservation;
pub mod stats;
pub mod ticket;
pub mod transfer;
pub mod user;

pub use common::*;
pub use event::*;
pub use payment::*;
pub use refund::*;
pub use reservation::*;
pub use stats::*;
pub use ticket::*;
pub use transfer::*;
pub use user::*;
