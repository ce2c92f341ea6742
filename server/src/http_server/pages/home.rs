use axum::extract::State;
use db::{cooking::Recipe, users::User};
use maud::{html, Markup};

use crate::{
    http_server::{
        current_user::MaybeUser,
        flash::Flash,
        templates::{
            base,
            buttons::LinkButton,
            recipes::RecipeGrid,
            Layout,
        },
        ResponseResult,
    },
    AppState,
};

const FEATURED_RECIPES: i64 = 4;

pub(crate) async fn home_page(
    State(app_state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
) -> ResponseResult<Markup> {
    let featured = Recipe::random(app_state.db(), FEATURED_RECIPES).await?;
    let total_recipes = Recipe::count(app_state.db()).await?;
    let total_users = User::count(app_state.db()).await?;

    Ok(base(
        Layout::new("Home", user.user(), flash.take()),
        html! {
            section class="py-12 text-center" {
                h1 class="text-4xl font-bold mb-4" { "Cook something new this week" }
                p class="text-lg text-stone-600 mb-8" {
                    "Share your favourite recipes, find new ones, and plan the week's meals."
                }

                (LinkButton::primary(html! { "Browse recipes" }, "/recipes"))
                " "
                @if user.user().is_some() {
                    (LinkButton::secondary(html! { "Add a recipe" }, "/recipes/new"))
                } @else {
                    (LinkButton::secondary(html! { "Log in to share" }, "/login"))
                }
            }

            section class="grid grid-cols-2 gap-4 max-w-md m-auto mb-12 text-center" {
                div class="bg-white rounded-lg shadow p-4" {
                    p class="text-3xl font-bold" { (total_recipes) }
                    p class="text-stone-600" { "Recipes" }
                }
                div class="bg-white rounded-lg shadow p-4" {
                    p class="text-3xl font-bold" { (total_users) }
                    p class="text-stone-600" { "Cooks" }
                }
            }

            section {
                h2 class="text-2xl font-semibold mb-4" { "Featured recipes" }

                @if featured.is_empty() {
                    p class="text-stone-600" { "No recipes yet. Be the first to add one!" }
                } @else {
                    (RecipeGrid(&featured))
                }
            }
        },
    ))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use db::cooking::Recipe;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::http_server::test_helpers::{create_test_app, recipe_fields, response_text};

    #[sqlx::test(migrations = "../db/migrations")]
    async fn home_shows_counts_and_featured_recipes(pool: PgPool) {
        let author = db::users::User::get_or_create_by_username(&pool, "maria")
            .await
            .unwrap();
        Recipe::create(&pool, author.user_id, &recipe_fields("Tomato Soup"))
            .await
            .unwrap();

        let app = create_test_app(pool);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response_text(response).await;
        assert!(body.contains("Tomato Soup"));
        assert!(body.contains("Log in to share"));
    }
}
