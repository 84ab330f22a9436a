pub mod events;
pub mod payment_transactions;
pub mod refund_accounts;
pub mod refund_request_mappings;
pub mod reservations;
pub mod tickets;
pub mod transfer_histories;
pub mod users;

pub use events::*;
pub use payment_transactions::*;
pub use refund_accounts::*;
pub use refund_request_mappings::*;
pub use reservations::*;
pub use tickets::*;
pub use transfer_histories::*;
pub use users::*;
