use db::users::User;
use maud::{html, Markup, Render};

pub fn head(title: &str) -> Markup {
    html! {
      head {
        meta charset="utf-8";
        title { (title) " | Recipe Box" }
        meta name="viewport" content="width=device-width, initial-scale=1";

        script src="https://cdn.tailwindcss.com" {}
      }
    }
}

struct HeaderLink {
    href: &'static str,
    text: &'static str,
}

impl Render for HeaderLink {
    fn render(&self) -> Markup {
        html! {
          li ."mx-4" {
            a href=(self.href) class="hover:text-orange-700" { (self.text) }
          }
        }
    }
}

pub fn header(user: Option<&User>) -> Markup {
    html! {
      header class="bg-white border-b border-stone-200 mb-8" {
        div class="max-w-5xl m-auto px-4 flex flex-col md:flex-row items-center justify-between py-4" {
          a href="/" class="text-2xl font-bold text-orange-700" { "Recipe Box" }

          nav {
            ul class="flex flex-row flex-wrap items-center" {
              (HeaderLink { href: "/", text: "Home" })
              (HeaderLink { href: "/recipes", text: "Recipes" })
              (HeaderLink { href: "/categories", text: "Categories" })

              @if let Some(user) = user {
                (HeaderLink { href: "/planner", text: "Meal Planner" })
                (HeaderLink { href: "/recipes/new", text: "Add Recipe" })

                @if user.is_staff {
                  (HeaderLink { href: "/admin/comments", text: "Moderation" })
                }

                li ."mx-4 text-stone-500" { (user.username) }
                li ."mx-4" {
                  form method="post" action="/logout" {
                    button type="submit" class="hover:text-orange-700" { "Log out" }
                  }
                }
              } @else {
                (HeaderLink { href: "/login", text: "Log in" })
              }
            }
          }
        }
      }
    }
}
