use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::models::intern::InternView;
use crate::state::AppState;
use crate::store::interns;

use super::{AuthenticatedIntern, HttpError};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/", get(dashboard_data))
}

/// The requesting intern with their rewards.
async fn dashboard_data(
    AuthenticatedIntern(intern_id): AuthenticatedIntern,
    State(state): State<AppState>,
) -> Result<Json<InternView>, HttpError> {
    let (intern, rewards) = interns::with_rewards(&state.database, intern_id).await?;
    let view = InternView::from_records(&intern, &rewards)?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::json;

    use super::super::test_support::{read_json, send, test_state};
    use crate::auth::{self, Signup};
    use crate::fixtures::BADGE_TIERS;
    use crate::state::AppState;
    use crate::store::rewards::{self, NewReward};

    async fn registered_intern(state: &AppState) -> i32 {
        let signup = Signup {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "correct-horse".to_string(),
            referral_code: Some("jane2025".to_string()),
        };
        auth::register(&state.database, signup).await.unwrap().id
    }

    fn dashboard_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get("/api/dashboard/");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn new_intern_has_empty_dashboard() {
        let state = test_state().await;
        let intern_id = registered_intern(&state).await;
        let token = state.tokens.issue(intern_id).unwrap().token;

        let response = send(&state, dashboard_request(Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await,
            json!({
                "id": intern_id,
                "name": "Jane Doe",
                "email": "jane@example.com",
                "referral_code": "jane2025",
                "total_donations": "0.00",
                "rewards": [],
            })
        );
    }

    #[tokio::test]
    async fn dashboard_lists_all_rewards_with_unlock_state() {
        let state = test_state().await;
        let intern_id = registered_intern(&state).await;
        for (index, tier) in BADGE_TIERS.iter().enumerate() {
            let mut reward =
                NewReward::new(intern_id, tier.name, tier.description, tier.points_required);
            if index < 2 {
                reward = reward.unlocked();
            }
            rewards::create(&state.database, reward).await.unwrap();
        }
        let token = state.tokens.issue(intern_id).unwrap().token;

        let body = read_json(send(&state, dashboard_request(Some(&token))).await).await;
        let rewards = body["rewards"].as_array().unwrap();
        assert_eq!(rewards.len(), 5);
        let unlocked = rewards
            .iter()
            .filter(|reward| reward["is_unlocked"] == json!(true))
            .count();
        assert_eq!(unlocked, 2);
        assert_eq!(rewards[0]["name"], "Bronze Badge");
    }

    #[tokio::test]
    async fn dashboard_requires_a_valid_token() {
        let state = test_state().await;

        for token in [None, Some("forged.token.value")] {
            let response = send(&state, dashboard_request(token)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(read_json(response).await["code"], "not_authenticated");
        }
    }

    #[tokio::test]
    async fn dashboard_for_deleted_intern_is_not_found() {
        let state = test_state().await;
        let intern_id = registered_intern(&state).await;
        let token = state.tokens.issue(intern_id).unwrap().token;
        crate::store::interns::delete(&state.database, intern_id)
            .await
            .unwrap();

        let response = send(&state, dashboard_request(Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["code"], "not_found");
    }
}
