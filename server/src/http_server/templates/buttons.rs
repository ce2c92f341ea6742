use maud::{html, Markup, Render};

pub struct LinkButton {
    inner: Markup,
    href: String,
    button_type: ButtonType,
}

impl LinkButton {
    pub fn primary(inner: Markup, href: impl Into<String>) -> Self {
        Self {
            inner,
            href: href.into(),
            button_type: ButtonType::Primary,
        }
    }

    pub fn secondary(inner: Markup, href: impl Into<String>) -> Self {
        Self {
            inner,
            href: href.into(),
            button_type: ButtonType::Secondary,
        }
    }
}

/// A one-button form, for actions that must be POSTed such as deletes.
pub struct PostButton {
    inner: Markup,
    action: String,
    button_type: ButtonType,
    confirm: Option<&'static str>,
}

impl PostButton {
    pub fn danger(inner: Markup, action: impl Into<String>) -> Self {
        Self {
            inner,
            action: action.into(),
            button_type: ButtonType::Danger,
            confirm: None,
        }
    }

    pub fn with_confirm(mut self, message: &'static str) -> Self {
        self.confirm = Some(message);
        self
    }
}

#[derive(Clone, Copy)]
pub enum ButtonType {
    Primary,
    Secondary,
    Danger,
}

impl ButtonType {
    pub fn classes(self) -> &'static str {
        match self {
            ButtonType::Primary => {
                "px-6 py-3 rounded font-semibold my-2 inline-block bg-orange-700 text-white hover:bg-orange-800"
            }
            ButtonType::Secondary => {
                "px-6 py-3 rounded font-semibold my-2 inline-block bg-white border border-stone-300 hover:bg-stone-100"
            }
            ButtonType::Danger => {
                "px-6 py-3 rounded font-semibold my-2 inline-block bg-red-600 text-white hover:bg-red-700"
            }
        }
    }
}

impl Render for LinkButton {
    fn render(&self) -> Markup {
        html! {
          a href=(self.href) class=(self.button_type.classes()) {
            (self.inner)
          }
        }
    }
}

impl Render for PostButton {
    fn render(&self) -> Markup {
        let onsubmit = self
            .confirm
            .map(|message| format!("return confirm('{message}');"));

        html! {
          form method="post" action=(self.action) class="inline" onsubmit=[onsubmit] {
            button type="submit" class=(self.button_type.classes()) {
              (self.inner)
            }
          }
        }
    }
}
