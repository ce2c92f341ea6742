use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use db::cooking::{Comment, Recipe};
use maud::{html, Markup};
use uuid::Uuid;

use super::recipes::{find_recipe, render_detail};
use crate::{
    http_server::{
        current_user::{CurrentUser, MaybeUser},
        errors::ServerError,
        flash::Flash,
        forms::{CommentForm, FormErrors},
        templates::{base, buttons::ButtonType, form_fields::textarea, Layout},
        ResponseResult,
    },
    AppState,
};

pub(crate) async fn create_comment(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(recipe_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> ResponseResult {
    let recipe = find_recipe(&app_state, &recipe_id).await?;

    let body = match form.validate() {
        Ok(body) => body,
        Err(errors) => {
            let user = MaybeUser(Some(current_user.user));
            let page = render_detail(&app_state, &user, vec![], &recipe, (&form, &errors)).await?;

            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    Comment::create(
        app_state.db(),
        recipe.recipe_id,
        current_user.user.user_id,
        &body,
    )
    .await?;

    flash.success("Your comment has been submitted for approval!");

    Ok(Redirect::to(&format!("/recipes/{}", recipe.recipe_id)).into_response())
}

/// The recipe and comment behind an author-only action, or the redirect to
/// send anyone else.
async fn owned_comment(
    app_state: &AppState,
    current_user: &CurrentUser,
    flash: &Flash,
    (recipe_id, comment_id): (String, String),
    action: &str,
) -> Result<Result<(Recipe, Comment), Response>, ServerError> {
    let recipe = find_recipe(app_state, &recipe_id).await?;

    let comment = match comment_id.parse::<Uuid>() {
        Ok(comment_id) => {
            Comment::get_for_recipe(app_state.db(), recipe.recipe_id, comment_id).await?
        }
        Err(_) => None,
    };
    let comment = comment.ok_or_else(|| ServerError::not_found("Comment"))?;

    if comment.author_user_id != current_user.user.user_id {
        flash.error(format!("You can only {action} your own comments!"));

        return Ok(Err(
            Redirect::to(&format!("/recipes/{}", recipe.recipe_id)).into_response()
        ));
    }

    Ok(Ok((recipe, comment)))
}

fn edit_page(
    current_user: &CurrentUser,
    recipe: &Recipe,
    comment: &Comment,
    form: &CommentForm,
    errors: &FormErrors,
) -> Markup {
    base(
        Layout::new("Edit Comment", Some(&current_user.user), vec![]),
        html! {
            div class="max-w-2xl bg-white rounded-lg shadow p-6" {
                h1 class="text-2xl font-semibold mb-1" { "Edit comment" }
                p class="text-stone-500 mb-4" { "On " (recipe.title) }

                form method="post" action=(format!("/recipes/{}/comments/{}/edit", recipe.recipe_id, comment.comment_id)) {
                    (textarea("body", "Your Comment", &form.body, 4, "", errors))
                    button type="submit" class=(ButtonType::Primary.classes()) { "Update Comment" }
                    " "
                    a href=(format!("/recipes/{}", recipe.recipe_id)) class="text-orange-700 hover:underline" { "Cancel" }
                }
            }
        },
    )
}

pub(crate) async fn edit_comment(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(ids): Path<(String, String)>,
) -> ResponseResult {
    let owned = owned_comment(&app_state, &current_user, &flash, ids, "edit").await?;
    let (recipe, comment) = match owned {
        Ok(found) => found,
        Err(redirect) => return Ok(redirect),
    };

    let form = CommentForm {
        body: comment.body.clone(),
    };

    Ok(edit_page(&current_user, &recipe, &comment, &form, &FormErrors::default()).into_response())
}

pub(crate) async fn update_comment(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(ids): Path<(String, String)>,
    Form(form): Form<CommentForm>,
) -> ResponseResult {
    let owned = owned_comment(&app_state, &current_user, &flash, ids, "edit").await?;
    let (recipe, comment) = match owned {
        Ok(found) => found,
        Err(redirect) => return Ok(redirect),
    };

    let body = match form.validate() {
        Ok(body) => body,
        Err(errors) => {
            let page = edit_page(&current_user, &recipe, &comment, &form, &errors);

            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    comment.update_body(app_state.db(), &body).await?;
    flash.success("Comment updated!");

    Ok(Redirect::to(&format!("/recipes/{}", recipe.recipe_id)).into_response())
}

pub(crate) async fn delete_comment(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(ids): Path<(String, String)>,
) -> ResponseResult {
    let owned = owned_comment(&app_state, &current_user, &flash, ids, "delete").await?;
    let (recipe, comment) = match owned {
        Ok(found) => found,
        Err(redirect) => return Ok(redirect),
    };

    Comment::delete(app_state.db(), comment.comment_id).await?;
    flash.success("Comment deleted!");

    Ok(Redirect::to(&format!("/recipes/{}", recipe.recipe_id)).into_response())
}

#[cfg(test)]
mod tests {
    use db::users::User;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use super::*;
    use crate::http_server::test_helpers::{
        create_test_app, form_request, get_request, location, login, recipe_fields, response_text,
    };

    async fn recipe_by(pool: &PgPool, username: &str) -> Recipe {
        let author = User::get_or_create_by_username(pool, username).await.unwrap();

        Recipe::create(pool, author.user_id, &recipe_fields("Shakshuka"))
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn new_comments_wait_for_approval(pool: PgPool) {
        let recipe = recipe_by(&pool, "maria").await;
        let app = create_test_app(pool.clone());
        let session = login(&app, "tom").await;
        let path = format!("/recipes/{}", recipe.recipe_id);

        let response = app
            .clone()
            .oneshot(form_request(
                &format!("{path}/comments"),
                Some(&session),
                "body=Lovely+with+extra+feta%21",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), path);

        assert_eq!(Comment::count_pending(&pool).await.unwrap(), 1);

        let body = response_text(app.oneshot(get_request(&path, None)).await.unwrap()).await;
        assert!(!body.contains("Lovely with extra feta"));
        assert!(body.contains("No comments yet."));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn short_comments_are_rejected(pool: PgPool) {
        let recipe = recipe_by(&pool, "maria").await;
        let app = create_test_app(pool.clone());
        let session = login(&app, "tom").await;

        let response = app
            .oneshot(form_request(
                &format!("/recipes/{}/comments", recipe.recipe_id),
                Some(&session),
                "body=yum",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), 422);
        assert!(response_text(response)
            .await
            .contains("Please write a more detailed comment"));
        assert_eq!(Comment::count_pending(&pool).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn editing_keeps_approval_and_checks_ownership(pool: PgPool) {
        let recipe = recipe_by(&pool, "maria").await;
        let tom = User::get_or_create_by_username(&pool, "tom").await.unwrap();
        let comment = Comment::create(
            &pool,
            recipe.recipe_id,
            tom.user_id,
            "Great weeknight dinner",
        )
        .await
        .unwrap();
        Comment::approve(&pool, &[comment.comment_id]).await.unwrap();

        let app = create_test_app(pool.clone());
        let edit = format!("/recipes/{}/comments/{}/edit", recipe.recipe_id, comment.comment_id);

        let maria = login(&app, "maria").await;
        let response = app
            .clone()
            .oneshot(form_request(&edit, Some(&maria), "body=Hijacked+comment+text"))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);

        let session = login(&app, "tom").await;
        let response = app
            .clone()
            .oneshot(form_request(
                &edit,
                Some(&session),
                "body=Great+weeknight+dinner%2C+twice+now",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 303);

        let stored = Comment::get_for_recipe(&pool, recipe.recipe_id, comment.comment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, "Great weeknight dinner, twice now");
        assert!(stored.approved);

        let other = recipe_by(&pool, "maria").await;
        let response = app
            .oneshot(get_request(
                &format!("/recipes/{}/comments/{}/edit", other.recipe_id, comment.comment_id),
                Some(&session),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn authors_can_delete_their_comments(pool: PgPool) {
        let recipe = recipe_by(&pool, "maria").await;
        let tom = User::get_or_create_by_username(&pool, "tom").await.unwrap();
        let comment = Comment::create(&pool, recipe.recipe_id, tom.user_id, "Needs more garlic")
            .await
            .unwrap();

        let app = create_test_app(pool.clone());
        let session = login(&app, "tom").await;
        let response = app
            .oneshot(form_request(
                &format!("/recipes/{}/comments/{}/delete", recipe.recipe_id, comment.comment_id),
                Some(&session),
                "",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), 303);
        assert_eq!(Comment::count_pending(&pool).await.unwrap(), 0);
    }
}
