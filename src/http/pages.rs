use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::state::AppState;

const LOGIN_PAGE: &str = include_str!("../../templates/login.html");
const DASHBOARD_PAGE: &str = include_str!("../../templates/dashboard.html");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/dashboard/", get(dashboard_page))
}

pub(super) async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}
