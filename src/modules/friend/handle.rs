use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::friend::{
        model::{
            FriendRequestBody, FriendRequestResponse, FriendResponse, RelationshipStatus,
            RespondAction, RespondOutcome,
        },
        schema::FriendRequestEntity,
        service::FriendService,
    },
    utils::ValidatedJson,
};

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let body = body.0;
    let request =
        friend_service.send_friend_request(&sender_id, &body.recipient_id, body.message).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[post("/requests/{request_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<RespondOutcome>, error::Error> {
    let receiver_id = get_claims(&req)?.sub;
    let outcome = friend_service
        .respond_to_friend_request(&receiver_id, *request_id, RespondAction::Accept)
        .await?;

    Ok(success::Success::ok(Some(outcome)).message("Friend request accepted successfully"))
}

#[post("/requests/{request_id}/decline")]
pub async fn decline_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<RespondOutcome>, error::Error> {
    let receiver_id = get_claims(&req)?.sub;
    let outcome = friend_service
        .respond_to_friend_request(&receiver_id, *request_id, RespondAction::Decline)
        .await?;

    Ok(success::Success::ok(Some(outcome)).message("Friend request declined"))
}

#[delete("/requests/{request_id}")]
pub async fn cancel_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    friend_service.cancel_friend_request(&sender_id, *request_id).await?;
    Ok(success::Success::no_content())
}

#[get("/requests/incoming")]
pub async fn list_incoming_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_incoming_requests(&user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/requests/outgoing")]
pub async fn list_outgoing_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_outgoing_requests(&user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/status/{user_id}")]
pub async fn get_relationship_status(
    friend_service: web::Data<FriendService>,
    subject_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<RelationshipStatus>, error::Error> {
    let viewer_id = get_claims(&req)?.sub;
    let status = friend_service.get_relationship_status(&viewer_id, &subject_id).await?;

    Ok(success::Success::ok(Some(status)))
}

#[get("")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.get_friends(&user_id).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[delete("/{friendship_id}")]
pub async fn remove_friend(
    friend_service: web::Data<FriendService>,
    friendship_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    friend_service.remove_friend(&user_id, *friendship_id).await?;
    Ok(success::Success::no_content())
}
