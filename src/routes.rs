mod contact;
mod health_check;
mod helpers;
mod subscriptions;

pub use contact::*;
pub use health_check::*;
pub use helpers::*;
pub use subscriptions::*;
