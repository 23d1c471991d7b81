use crate::{
    api::error::{Error, SystemError},
    modules::friend::schema::{FRIENDSHIP_PAIR_KEY, PENDING_REQUEST_PAIR_KEY},
};

#[derive(thiserror::Error, Debug)]
pub enum RelationshipError {
    #[error("cannot send a friend request to yourself")]
    InvalidTarget,
    #[error("target user not found")]
    TargetNotFound,
    #[error("user is not accepting friend requests")]
    RequestsDisabled,
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("a pending friend request already exists between these users")]
    RequestAlreadyExists,
    /// Also returned when the request exists but the caller may not act on it.
    #[error("friend request not found")]
    RequestNotFound,
    /// Also returned when the caller is not a member of the friendship.
    #[error("friendship not found")]
    FriendshipNotFound,
    #[error(transparent)]
    System(SystemError),
}

impl From<SystemError> for RelationshipError {
    fn from(err: SystemError) -> Self {
        let business = match err.conflict_constraint() {
            Some(FRIENDSHIP_PAIR_KEY) => Some(RelationshipError::AlreadyFriends),
            Some(PENDING_REQUEST_PAIR_KEY) => Some(RelationshipError::RequestAlreadyExists),
            _ => None,
        };
        business.unwrap_or(RelationshipError::System(err))
    }
}

impl From<RelationshipError> for Error {
    fn from(value: RelationshipError) -> Self {
        match value {
            RelationshipError::InvalidTarget => {
                Error::bad_request("Cannot send friend request to yourself")
            }
            RelationshipError::TargetNotFound => Error::not_found("Receiver user not found"),
            RelationshipError::RequestsDisabled => {
                Error::forbidden("User is not accepting friend requests")
            }
            RelationshipError::AlreadyFriends => Error::conflict("Users are already friends"),
            RelationshipError::RequestAlreadyExists => {
                Error::conflict("Friend request already exists")
            }
            RelationshipError::RequestNotFound => Error::not_found("Friend request not found"),
            RelationshipError::FriendshipNotFound => Error::not_found("Friendship not found"),
            RelationshipError::System(err) => err.into(),
        }
    }
}
