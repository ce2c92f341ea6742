use axum::{extract::State, response::Redirect};
use db::cooking::Comment;
use maud::{html, Markup};
use uuid::Uuid;

use crate::{
    http_server::{
        current_user::StaffUser,
        errors::ServerError,
        flash::Flash,
        templates::{base, buttons::ButtonType, recipes::time_ago, Layout},
        ResponseResult,
    },
    AppState,
};

pub(crate) async fn versions(State(app): State<AppState>) -> Markup {
    html! {
      p { "cookbook " (app.versions.version) }
      p { "Git Commit: " (app.versions.git_commit) }
      p { "Site: " (app.app.app_url("/")) }
    }
}

pub(crate) async fn pending_comments(
    State(app_state): State<AppState>,
    StaffUser(staff): StaffUser,
    flash: Flash,
) -> ResponseResult<Markup> {
    let pending = Comment::list_pending(app_state.db()).await?;

    Ok(base(
        Layout::new("Moderation", Some(&staff.user), flash.take()),
        html! {
            h1 class="text-3xl font-bold my-6" { "Pending comments (" (pending.len()) ")" }

            @if pending.is_empty() {
                p class="text-stone-600" { "Nothing waiting for approval." }
            } @else {
                form method="post" action="/admin/comments/approve" {
                    table class="w-full bg-white rounded-lg shadow mb-4" {
                        thead {
                            tr class="text-left" {
                                th class="p-2" {}
                                th class="p-2" { "Comment" }
                                th class="p-2" { "Recipe" }
                                th class="p-2" { "Author" }
                                th class="p-2" { "Posted" }
                            }
                        }
                        tbody {
                            @for comment in &pending {
                                tr class="border-t border-stone-200 align-top" {
                                    td class="p-2" {
                                        input type="checkbox" name="comment_ids" value=(comment.comment_id)
                                            aria-label="Select comment";
                                    }
                                    td class="p-2" title=(comment.body) { (comment.preview()) }
                                    td class="p-2" {
                                        a href=(format!("/recipes/{}", comment.recipe_id)) class="text-orange-700 hover:underline" {
                                            (comment.recipe_title)
                                        }
                                    }
                                    td class="p-2" { (comment.author_username) }
                                    td class="p-2 text-sm text-stone-500" { (time_ago(comment.created_at)) }
                                }
                            }
                        }
                    }

                    button type="submit" class=(ButtonType::Primary.classes()) { "Approve selected comments" }
                }
            }
        },
    ))
}

/// Reads every `comment_ids` value of the form body. Checkbox lists repeat
/// the key, which the typed `Form` extractor can't collect.
fn selected_ids(body: &str) -> Result<Vec<Uuid>, ServerError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(body).map_err(ServerError::bad_request)?;

    pairs
        .into_iter()
        .filter(|(key, _)| key == "comment_ids")
        .map(|(_, value)| value.parse::<Uuid>().map_err(ServerError::bad_request))
        .collect()
}

pub(crate) async fn approve_comments(
    State(app_state): State<AppState>,
    StaffUser(staff): StaffUser,
    flash: Flash,
    body: String,
) -> ResponseResult<Redirect> {
    let ids = selected_ids(&body)?;

    if ids.is_empty() {
        flash.info("No comments were selected.");

        return Ok(Redirect::to("/admin/comments"));
    }

    let approved = Comment::approve(app_state.db(), &ids).await?;
    tracing::info!(staff_user_id = %staff.user.user_id, approved, "Approved comments");

    flash.success(match approved {
        1 => "1 comment was approved.".to_string(),
        n => format!("{n} comments were approved."),
    });

    Ok(Redirect::to("/admin/comments"))
}

#[cfg(test)]
mod tests {
    use db::{cooking::Recipe, users::User};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use super::*;
    use crate::http_server::test_helpers::{
        create_test_app, form_request, get_request, location, login, recipe_fields, response_text,
    };

    #[test]
    fn repeated_checkbox_values_are_collected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let ids = selected_ids(&format!("comment_ids={a}&other=x&comment_ids={b}")).unwrap();
        assert_eq!(ids, vec![a, b]);

        assert!(selected_ids("").unwrap().is_empty());
        assert_eq!(selected_ids("comment_ids=nope").unwrap_err().1, 400);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn only_staff_can_moderate(pool: PgPool) {
        let app = create_test_app(pool.clone());
        let session = login(&app, "tom").await;

        let response = app
            .clone()
            .oneshot(get_request("/admin/comments", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), 403);

        User::set_staff(&pool, "tom", true).await.unwrap();
        let response = app
            .oneshot(get_request("/admin/comments", Some(&session)))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert!(response_text(response).await.contains("Nothing waiting for approval."));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn approving_publishes_selected_comments(pool: PgPool) {
        let maria = User::get_or_create_by_username(&pool, "maria").await.unwrap();
        let recipe = Recipe::create(&pool, maria.user_id, &recipe_fields("Ramen"))
            .await
            .unwrap();
        let first = Comment::create(
            &pool,
            recipe.recipe_id,
            maria.user_id,
            "Rich and savoury broth",
        )
        .await
        .unwrap();
        let second = Comment::create(
            &pool,
            recipe.recipe_id,
            maria.user_id,
            "Add a soft boiled egg",
        )
        .await
        .unwrap();
        User::get_or_create_by_username(&pool, "mod").await.unwrap();
        User::set_staff(&pool, "mod", true).await.unwrap();

        let app = create_test_app(pool.clone());
        let session = login(&app, "mod").await;

        let body = response_text(
            app.clone()
                .oneshot(get_request("/admin/comments", Some(&session)))
                .await
                .unwrap(),
        )
        .await;
        assert!(body.contains("Pending comments (2)"));

        let response = app
            .clone()
            .oneshot(form_request(
                "/admin/comments/approve",
                Some(&session),
                &format!("comment_ids={}", first.comment_id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/admin/comments");

        let approved = Comment::list_approved_for_recipe(&pool, recipe.recipe_id)
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].comment_id, first.comment_id);
        assert_eq!(Comment::count_pending(&pool).await.unwrap(), 1);

        let body = response_text(
            app.oneshot(get_request(&format!("/recipes/{}", recipe.recipe_id), None))
                .await
                .unwrap(),
        )
        .await;
        assert!(body.contains("Rich and savoury broth"));
        assert!(!body.contains(&second.body));
    }
}
