pub mod admin;
pub mod event;
pub mod payment;
pub mod reservation;
pub mod ticket;
pub mod transfer;
pub mod user;

pub use admin::admin_config;
pub use event::event_config;
pub use payment::payment_config;
pub use reservation::reservation_config;
pub use ticket::ticket_config;
pub use transfer::transfer_config;
pub use user::user_config;
