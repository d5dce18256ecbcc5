use crate::model::id::UserId;

pub struct CreateToken {
    pub user_id: UserId,
    pub access_token: String,
}

impl CreateToken {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            access_token: super::AccessToken::new().0,
        }
    }
}
