pub mod notification;
pub mod user;
pub mod withdrawal;

pub use notification::{NotificationPayload, PushTarget, CURRENCY_SYMBOL};
pub use user::UserAccount;
pub use withdrawal::{Amount, WithdrawalRequest, WithdrawalStatus};
