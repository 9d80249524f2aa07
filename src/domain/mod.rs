pub mod account;
pub mod events;

pub use account::{Account, AccountError, AccountUpdate, NewAccount};
pub use events::{AccountEvent, ACCOUNT_EVENT_TYPES};
