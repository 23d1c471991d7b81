use actix_web::{get, patch, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{model::ProfileAccessResponse, service::FriendService},
        user::{
            model::{PreferencesResponse, UpdatePreferencesModel},
            service::UserService,
        },
    },
    utils::ValidatedJson,
};

#[get("/me/preferences")]
pub async fn get_preferences(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<PreferencesResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let preferences = user_service.get_preferences(&id).await?;
    Ok(success::Success::ok(Some(preferences)).message("Preferences retrieved successfully"))
}

#[patch("/me/preferences")]
pub async fn update_preferences(
    user_service: web::Data<UserService>,
    body: ValidatedJson<UpdatePreferencesModel>,
    req: HttpRequest,
) -> Result<success::Success<PreferencesResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let preferences = user_service.update_preferences(&id, body.0).await?;
    Ok(success::Success::ok(Some(preferences)).message("Preferences updated successfully"))
}

#[get("/{user_id}/access")]
pub async fn get_profile_access(
    friend_service: web::Data<FriendService>,
    subject_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<ProfileAccessResponse>, error::Error> {
    let viewer_id = get_claims(&req)?.sub;
    let access = friend_service.get_profile_access(&viewer_id, &subject_id).await?;
    Ok(success::Success::ok(Some(access)))
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::{header, StatusCode},
        test::{call_service, read_body_json, TestRequest},
    };
    use serde_json::{json, Value};

    use crate::{
        modules::user::schema::ProfileVisibility,
        test::{bearer, test_app, TestContext},
    };

    #[actix_web::test]
    async fn test_update_preferences_closes_requests() {
        let ctx = TestContext::new();
        ctx.add_user("user_alice", true);
        ctx.add_user("user_bob", true);
        let app = test_app!(ctx);

        let req = TestRequest::patch()
            .uri("/api/users/me/preferences")
            .insert_header((header::AUTHORIZATION, bearer("user_bob")))
            .set_json(json!({ "allowFriendRequests": false }))
            .to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = read_body_json(res).await;
        assert_eq!(body["data"]["allowFriendRequests"], false);
        assert_eq!(body["data"]["profileVisibility"], "public");

        let req = TestRequest::get()
            .uri("/api/friends/status/user_bob")
            .insert_header((header::AUTHORIZATION, bearer("user_alice")))
            .to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["data"]["status"], "notAccepting");

        let req = TestRequest::get()
            .uri("/api/users/me/preferences")
            .insert_header((header::AUTHORIZATION, bearer("user_bob")))
            .to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["data"]["allowFriendRequests"], false);
    }

    #[actix_web::test]
    async fn test_empty_preferences_update_is_rejected() {
        let ctx = TestContext::new();
        ctx.add_user("user_alice", true);
        let app = test_app!(ctx);

        let req = TestRequest::patch()
            .uri("/api/users/me/preferences")
            .insert_header((header::AUTHORIZATION, bearer("user_alice")))
            .set_json(json!({}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_profile_access_follows_friendship() {
        let ctx = TestContext::new();
        ctx.add_user("user_alice", true);
        ctx.add_user("user_bob", true);
        ctx.add_user_with_visibility("user_dave", ProfileVisibility::Friends);
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/users/user_dave/access")
            .insert_header((header::AUTHORIZATION, bearer("user_alice")))
            .to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["data"]["canView"], false);
        assert_eq!(body["data"]["visibility"], "friends");
        assert_eq!(body["data"]["relationship"]["status"], "none");

        ctx.befriend("user_alice", "user_dave").await;

        let req = TestRequest::get()
            .uri("/api/users/user_dave/access")
            .insert_header((header::AUTHORIZATION, bearer("user_alice")))
            .to_request();
        let body: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(body["data"]["canView"], true);
        assert_eq!(body["data"]["relationship"]["status"], "friends");

        let req = TestRequest::get()
            .uri("/api/users/user_ghost/access")
            .insert_header((header::AUTHORIZATION, bearer("user_alice")))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
