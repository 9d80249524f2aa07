pub mod services;

pub use services::{AccountProfile, AccountService};
