use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::{ProfileVisibility, UserEntity};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesModel {
    pub allow_friend_requests: Option<bool>,
    pub profile_visibility: Option<ProfileVisibility>,
}

pub struct UpdatePreferences {
    pub allow_friend_requests: Option<bool>,
    pub profile_visibility: Option<ProfileVisibility>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub allow_friend_requests: bool,
    pub profile_visibility: ProfileVisibility,
}

impl From<UserEntity> for PreferencesResponse {
    fn from(entity: UserEntity) -> Self {
        PreferencesResponse {
            allow_friend_requests: entity.allow_friend_requests,
            profile_visibility: entity.profile_visibility,
        }
    }
}
