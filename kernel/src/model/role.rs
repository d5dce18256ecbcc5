use strum::{AsRefStr, EnumString};

#[derive(Debug, EnumString, AsRefStr, Default, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    User,
}
