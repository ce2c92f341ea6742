use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use super::{errors::ServerError, pages};
use crate::AppState;

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/_", get(pages::admin::versions))
        .route("/", get(pages::home::home_page))
        .route(
            "/login",
            get(pages::login::login_get).post(pages::login::login_post),
        )
        .route("/logout", post(pages::login::logout))
        .nest("/recipes", recipe_routes())
        .route("/categories", get(pages::categories::categories_index))
        .route(
            "/categories/{meal_type}",
            get(pages::categories::category_recipes),
        )
        .route("/planner", get(pages::planner::planner_page))
        .route("/planner/assign", post(pages::planner::assign_json))
        .route("/planner/slots", post(pages::planner::assign_slot))
        .route("/planner/slots/clear", post(pages::planner::clear_slot))
        .route("/admin/comments", get(pages::admin::pending_comments))
        .route(
            "/admin/comments/approve",
            post(pages::admin::approve_comments),
        )
        .fallback(fallback)
}

fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(pages::recipes::recipes_index).post(pages::recipes::create_recipe),
        )
        .route("/new", get(pages::recipes::new_recipe))
        .route("/{id}", get(pages::recipes::recipe_detail))
        .route(
            "/{id}/edit",
            get(pages::recipes::edit_recipe).post(pages::recipes::update_recipe),
        )
        .route(
            "/{id}/delete",
            get(pages::recipes::delete_recipe_get).post(pages::recipes::delete_recipe),
        )
        .route("/{id}/comments", post(pages::comments::create_comment))
        .route(
            "/{id}/comments/{comment_id}/edit",
            get(pages::comments::edit_comment).post(pages::comments::update_comment),
        )
        .route(
            "/{id}/comments/{comment_id}/delete",
            post(pages::comments::delete_comment),
        )
}

async fn fallback(uri: Uri) -> ServerError {
    ServerError::not_found(&format!("Page {}", uri.path()))
}
