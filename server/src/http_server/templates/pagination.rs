use db::cooking::Page;
use maud::{html, Markup};

const LINK_CLASSES: &str = "px-3 py-1 rounded border border-stone-300 hover:bg-stone-100";

/// Previous/next links around "Page N of M". `href` builds the link for a
/// page number so callers can keep their own query parameters.
pub fn pagination(page: &Page, href: impl Fn(i64) -> String) -> Markup {
    html! {
      @if page.is_paginated() {
        nav class="flex items-center justify-center gap-2 my-8" aria-label="Pagination" {
          @if page.has_previous() {
            a href=(href(1)) class=(LINK_CLASSES) { "« First" }
            a href=(href(page.number - 1)) class=(LINK_CLASSES) { "Previous" }
          }

          span class="px-3 py-1 text-stone-600" {
            "Page " (page.number) " of " (page.num_pages)
          }

          @if page.has_next() {
            a href=(href(page.number + 1)) class=(LINK_CLASSES) { "Next" }
            a href=(href(page.num_pages)) class=(LINK_CLASSES) { "Last »" }
          }
        }
      }
    }
}
