use std::sync::Arc;
use crate::config::Config;
use crate::service::{IdentityService, MessageService};

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub messages: MessageService,
    pub config: Arc<Config>,
}
