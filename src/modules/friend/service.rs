use std::sync::Arc;

use uuid::Uuid;

use crate::modules::{
    friend::{
        error::RelationshipError,
        model::{
            FriendRequestResponse, FriendResponse, NewFriendRequest, ProfileAccessResponse,
            RelationshipStatus, RespondAction, RespondOutcome,
        },
        repository::FriendRepo,
        schema::FriendRequestEntity,
    },
    user::{
        repository::UserRepository,
        schema::{ProfileVisibility, UserEntity},
    },
};

/// Trims the optional request message; blank messages are stored as absent.
fn normalize_message(message: Option<String>) -> Option<String> {
    message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRepo>,
    user_repo: Arc<dyn UserRepository>,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRepo>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        tracing::info!("FriendService initialized with dependencies");
        FriendService { friend_repo, user_repo }
    }

    pub async fn get_friends(&self, user_id: &str) -> Result<Vec<FriendResponse>, RelationshipError> {
        Ok(self.friend_repo.find_friends(user_id).await?)
    }

    pub async fn get_incoming_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, RelationshipError> {
        Ok(self.friend_repo.find_friend_request_to_user(user_id).await?)
    }

    pub async fn get_outgoing_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, RelationshipError> {
        Ok(self.friend_repo.find_friend_request_from_user(user_id).await?)
    }

    pub async fn remove_friend(
        &self,
        user_id: &str,
        friendship_id: Uuid,
    ) -> Result<(), RelationshipError> {
        if !self.friend_repo.delete_friendship(&friendship_id, user_id).await? {
            tracing::debug!("User {} cannot remove friendship {}", user_id, friendship_id);
            return Err(RelationshipError::FriendshipNotFound);
        }

        tracing::info!("User {} removed friendship {}", user_id, friendship_id);
        Ok(())
    }

    pub async fn send_friend_request(
        &self,
        sender_id: &str,
        receiver_id: &str,
        message: Option<String>,
    ) -> Result<FriendRequestEntity, RelationshipError> {
        if receiver_id == sender_id {
            return Err(RelationshipError::InvalidTarget);
        }

        let receiver = self
            .user_repo
            .find_by_id(receiver_id)
            .await?
            .ok_or(RelationshipError::TargetNotFound)?;

        if !receiver.allow_friend_requests {
            tracing::debug!("User {} does not accept requests from {}", receiver_id, sender_id);
            return Err(RelationshipError::RequestsDisabled);
        }

        let (friendship, pending) = tokio::try_join!(
            self.friend_repo.find_friendship(sender_id, receiver_id),
            self.friend_repo.find_pending_request(sender_id, receiver_id),
        )?;

        if friendship.is_some() {
            return Err(RelationshipError::AlreadyFriends);
        }

        if pending.is_some() {
            return Err(RelationshipError::RequestAlreadyExists);
        }

        // The store re-checks both conditions atomically; a racing writer
        // surfaces as the same business error through the constraint name.
        let friend_request = self
            .friend_repo
            .create_friend_request(&NewFriendRequest {
                id: Uuid::now_v7(),
                from_user_id: sender_id.to_string(),
                to_user_id: receiver_id.to_string(),
                message: normalize_message(message),
            })
            .await?;

        tracing::info!(
            "Friend request {} sent from {} to {}",
            friend_request.id,
            sender_id,
            receiver_id
        );

        Ok(friend_request)
    }

    pub async fn respond_to_friend_request(
        &self,
        user_id: &str,
        request_id: Uuid,
        action: RespondAction,
    ) -> Result<RespondOutcome, RelationshipError> {
        let outcome = match action {
            RespondAction::Accept => self
                .friend_repo
                .accept_friend_request_atomic(&request_id, user_id)
                .await?
                .map(|friendship| RespondOutcome::Accepted { friendship }),
            RespondAction::Decline => self
                .friend_repo
                .decline_friend_request(&request_id, user_id)
                .await?
                .map(|request| RespondOutcome::Declined { request }),
        };

        let outcome = outcome.ok_or(RelationshipError::RequestNotFound)?;
        tracing::info!("Friend request {} {} by {}", request_id, outcome.tag(), user_id);

        Ok(outcome)
    }

    pub async fn cancel_friend_request(
        &self,
        user_id: &str,
        request_id: Uuid,
    ) -> Result<(), RelationshipError> {
        if !self.friend_repo.cancel_friend_request(&request_id, user_id).await? {
            return Err(RelationshipError::RequestNotFound);
        }

        tracing::info!("Friend request {} cancelled by {}", request_id, user_id);
        Ok(())
    }

    pub async fn get_relationship_status(
        &self,
        viewer_id: &str,
        subject_id: &str,
    ) -> Result<RelationshipStatus, RelationshipError> {
        if viewer_id == subject_id {
            return Ok(RelationshipStatus::Myself);
        }

        match self.user_repo.find_by_id(subject_id).await? {
            Some(subject) => self.resolve_status(viewer_id, &subject).await,
            None => Ok(RelationshipStatus::UserNotFound),
        }
    }

    /// Status precedence below `userNotFound`, for a subject already loaded.
    async fn resolve_status(
        &self,
        viewer_id: &str,
        subject: &UserEntity,
    ) -> Result<RelationshipStatus, RelationshipError> {
        if viewer_id == subject.id {
            return Ok(RelationshipStatus::Myself);
        }

        let (friendship, pending) = tokio::try_join!(
            self.friend_repo.find_friendship(viewer_id, &subject.id),
            self.friend_repo.find_pending_request(viewer_id, &subject.id),
        )?;

        if let Some(friendship) = friendship {
            return Ok(RelationshipStatus::Friends { friendship_id: friendship.id });
        }

        if let Some(request) = pending {
            return Ok(if request.from_user_id == viewer_id {
                RelationshipStatus::RequestSent { request_id: request.id }
            } else {
                RelationshipStatus::RequestReceived { request_id: request.id }
            });
        }

        if !subject.allow_friend_requests {
            return Ok(RelationshipStatus::NotAccepting);
        }

        Ok(RelationshipStatus::NoRelation)
    }

    pub async fn get_profile_access(
        &self,
        viewer_id: &str,
        subject_id: &str,
    ) -> Result<ProfileAccessResponse, RelationshipError> {
        let subject = self
            .user_repo
            .find_by_id(subject_id)
            .await?
            .ok_or(RelationshipError::TargetNotFound)?;

        let relationship = self.resolve_status(viewer_id, &subject).await?;

        let can_view = match (&relationship, subject.profile_visibility) {
            (RelationshipStatus::Myself, _) => true,
            (_, ProfileVisibility::Public) => true,
            (status, ProfileVisibility::Friends) => status.is_friends(),
            (_, ProfileVisibility::Private) => false,
        };

        Ok(ProfileAccessResponse {
            user_id: subject.id,
            visibility: subject.profile_visibility,
            can_view,
            relationship,
        })
    }
}
