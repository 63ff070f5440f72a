pub mod aggregate;

pub use aggregate::{Notification, NotificationKind, NotificationListItem, Recipient};
