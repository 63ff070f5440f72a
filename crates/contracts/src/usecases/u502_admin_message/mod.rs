pub mod request;
pub mod response;

pub use request::AdminMessageRequest;
pub use response::{AdminMessageResponse, DeliveryMethod, DeliveryReport};

use crate::usecases::common::UseCaseMetadata;

pub struct AdminMessage;

impl UseCaseMetadata for AdminMessage {
    fn usecase_index() -> &'static str {
        "u502"
    }

    fn usecase_name() -> &'static str {
        "admin_message"
    }

    fn display_name() -> &'static str {
        "Message to user"
    }

    fn description() -> &'static str {
        "In-app notification to one user plus an email through the first working transport"
    }
}
