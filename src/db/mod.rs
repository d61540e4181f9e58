pub mod models;
pub mod users;
pub mod messages;

pub use models::{Message, MessageDetail, ReceivedMessage, SentMessage, User, UserSummary};
pub use users::UserRepository;
pub use messages::MessageRepository;
