use crate::model::id::UserId;

pub mod event;

pub struct AccessToken(pub String);

impl AccessToken {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl Default for AccessToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}
