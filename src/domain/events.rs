use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain events announced after every successful mutation. Consumers only
/// get the account id and look the rest up themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountEvent {
    AccountCreated { account_id: Uuid },
    AccountModified { account_id: Uuid },
    AccountDeleted { account_id: Uuid },
}

impl AccountEvent {
    pub fn account_id(&self) -> Uuid {
        match self {
            AccountEvent::AccountCreated { account_id } => *account_id,
            AccountEvent::AccountModified { account_id } => *account_id,
            AccountEvent::AccountDeleted { account_id } => *account_id,
        }
    }

    /// Wire name of the event; each name maps to a destination declared at
    /// startup.
    pub fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::AccountCreated { .. } => "account_created",
            AccountEvent::AccountModified { .. } => "account_modified",
            AccountEvent::AccountDeleted { .. } => "account_deleted",
        }
    }
}

/// All event names the service publishes, used to declare destinations once
/// at startup.
pub const ACCOUNT_EVENT_TYPES: [&str; 3] =
    ["account_created", "account_modified", "account_deleted"];
