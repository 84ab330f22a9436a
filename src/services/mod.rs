pub mod event_service;
pub mod payment_service;
pub mod refund_service;
pub mod reservation_service;
pub mod stats_service;
pub mod ticket_service;
pub mod transfer_service;
pub mod user_service;

pub use event_service::*;
pub use payment_service::*;
pub use refund_service::*;
pub use reservation_service::*;
pub use stats_service::*;
pub use ticket_service::*;
pub use transfer_service::*;
pub use user_service::*;
