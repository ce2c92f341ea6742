use maud::{html, Markup};

use crate::http_server::forms::FormErrors;

const INPUT_CLASSES: &str =
    "mt-1 block w-full rounded border border-stone-300 px-3 py-2 focus:border-orange-600 focus:outline-none";

fn field_errors(errors: &FormErrors, name: &str) -> Markup {
    html! {
      @for message in errors.for_field(name) {
        p class="mt-1 text-sm text-red-700" { (message) }
      }
    }
}

pub fn non_field_errors(errors: &FormErrors) -> Markup {
    html! {
      @if !errors.non_field().is_empty() {
        div class="border border-red-400 bg-red-50 text-red-800 rounded px-4 py-3 mb-4" {
          @for message in errors.non_field() {
            p { (message) }
          }
        }
      }
    }
}

pub fn text_input(name: &str, label: &str, value: &str, errors: &FormErrors) -> Markup {
    html! {
      div class="mb-4" {
        label for=(name) class="block font-medium" { (label) }
        input type="text" id=(name) name=(name) value=(value) class=(INPUT_CLASSES);
        (field_errors(errors, name))
      }
    }
}

pub fn number_input(
    name: &str,
    label: &str,
    value: &str,
    min: i32,
    max: Option<i32>,
    errors: &FormErrors,
) -> Markup {
    html! {
      div class="mb-4" {
        label for=(name) class="block font-medium" { (label) }
        input type="number" id=(name) name=(name) value=(value) min=(min) max=[max] class=(INPUT_CLASSES);
        (field_errors(errors, name))
      }
    }
}

pub fn textarea(
    name: &str,
    label: &str,
    value: &str,
    rows: u8,
    placeholder: &str,
    errors: &FormErrors,
) -> Markup {
    html! {
      div class="mb-4" {
        label for=(name) class="block font-medium" { (label) }
        textarea id=(name) name=(name) rows=(rows) placeholder=(placeholder) class=(INPUT_CLASSES) { (value) }
        (field_errors(errors, name))
      }
    }
}

/// A dropdown of `(value, label)` options.
pub fn select<'a>(
    name: &str,
    label: &str,
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
    selected: &str,
    errors: &FormErrors,
) -> Markup {
    html! {
      div class="mb-4" {
        label for=(name) class="block font-medium" { (label) }
        select id=(name) name=(name) class=(INPUT_CLASSES) {
          @for (value, text) in options {
            option value=(value) selected[value == selected] { (text) }
          }
        }
        (field_errors(errors, name))
      }
    }
}
