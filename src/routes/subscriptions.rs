mod errors;
mod helpers;
mod subscriptions;

pub use errors::SubscribeError;
pub use subscriptions::{SubscribeRequest, subscribe, subscribe_json_config};
