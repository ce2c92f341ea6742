use axum::http::StatusCode;
use db::users::User;
use maud::{html, Markup, DOCTYPE};

use super::flash::{FlashLevel, FlashMessage};

pub(crate) mod buttons;
pub(crate) mod form_fields;
pub(crate) mod header;
pub(crate) mod pagination;
pub(crate) mod recipes;

/// What every full page needs besides its own content.
pub(crate) struct Layout<'a> {
    pub title: &'a str,
    pub user: Option<&'a User>,
    pub flashes: Vec<FlashMessage>,
}

impl<'a> Layout<'a> {
    pub fn new(title: &'a str, user: Option<&'a User>, flashes: Vec<FlashMessage>) -> Self {
        Self {
            title,
            user,
            flashes,
        }
    }
}

fn flash_classes(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Success => "bg-green-100 border-green-400 text-green-800",
        FlashLevel::Error => "bg-red-100 border-red-400 text-red-800",
        FlashLevel::Info => "bg-blue-100 border-blue-400 text-blue-800",
    }
}

pub fn base(layout: Layout<'_>, inner: Markup) -> Markup {
    html! {
      (DOCTYPE)
      html lang="en" {
        (header::head(layout.title))

        body class="bg-stone-50 text-stone-900 font-sans" {
          (header::header(layout.user))

          main class="px-4 max-w-5xl m-auto pb-16" {
            @for flash in &layout.flashes {
              div class=(format!("border rounded px-4 py-3 my-4 {}", flash_classes(flash.level))) role="alert" {
                (flash.message)
              }
            }

            (inner)
          }
        }
      }
    }
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");

    base(
        Layout::new(title, None, vec![]),
        html! {
          div class="text-center py-24" {
            h1 class="text-4xl font-bold mb-4" { (status.as_u16()) " " (title) }
            p class="text-stone-600 mb-8" { (message) }
            a href="/recipes" class="text-orange-700 hover:underline" { "Browse recipes" }
          }
        },
    )
}
