pub mod identity;
pub mod messages;

pub use identity::{IdentityService, NewUser};
pub use messages::MessageService;
