use serde::Serialize;

#[derive(Serialize)]
pub struct Text<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
}

impl<'a> Text<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { kind: "Text", text }
    }
}

#[derive(Serialize)]
pub struct Button<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
}

impl<'a> Button<'a> {
    pub fn new(text: &'a str, action: &'a str) -> Self {
        Self {
            kind: "Button",
            text,
            action,
            id: None,
            enabled: None,
            icon: None,
        }
    }

    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn icon(mut self, icon: &'a str) -> Self {
        self.icon = Some(icon);
        self
    }
}

#[derive(Serialize)]
pub struct Column<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub children: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_description: Option<&'a str>,
}

impl<'a> Column<'a> {
    pub fn new(children: Vec<serde_json::Value>) -> Self {
        Self {
            kind: "Column",
            children,
            content_description: None,
        }
    }

    pub fn content_description(mut self, cd: &'a str) -> Self {
        self.content_description = Some(cd);
        self
    }
}

#[derive(Serialize)]
pub struct TextInput<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub bind_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_on_change: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_line: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_focus: Option<bool>,
}

impl<'a> TextInput<'a> {
    pub fn new(bind_key: &'a str) -> Self {
        Self {
            kind: "TextInput",
            bind_key,
            text: None,
            hint: None,
            error: None,
            action_on_change: None,
            single_line: None,
            request_focus: None,
        }
    }

    pub fn text(mut self, text: &'a str) -> Self {
        self.text = Some(text);
        self
    }

    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    pub fn action_on_change(mut self, action: &'a str) -> Self {
        self.action_on_change = Some(action);
        self
    }

    pub fn single_line(mut self, single: bool) -> Self {
        self.single_line = Some(single);
        self
    }

    pub fn request_focus(mut self, focus: bool) -> Self {
        self.request_focus = Some(focus);
        self
    }
}

/// Top bar with an up-navigation action and optional menu items.
#[derive(Serialize)]
pub struct Toolbar<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_action: Option<&'a str>,
    pub menu: Vec<serde_json::Value>,
}

impl<'a> Toolbar<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            kind: "Toolbar",
            title,
            nav_action: None,
            menu: Vec::new(),
        }
    }

    pub fn nav_action(mut self, action: &'a str) -> Self {
        self.nav_action = Some(action);
        self
    }

    pub fn menu(mut self, items: Vec<serde_json::Value>) -> Self {
        self.menu = items;
        self
    }
}

#[derive(Serialize)]
pub struct MenuItem<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
    pub title: &'a str,
    pub action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
}

impl<'a> MenuItem<'a> {
    pub fn new(id: &'a str, title: &'a str, action: &'a str) -> Self {
        Self {
            kind: "MenuItem",
            id,
            title,
            action,
            icon: None,
        }
    }

    pub fn icon(mut self, icon: &'a str) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// A list row with a leading icon; selecting it sends `action` with `index`.
#[derive(Serialize)]
pub struct OptionRow<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub action: &'a str,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
}

impl<'a> OptionRow<'a> {
    pub fn new(text: &'a str, action: &'a str, index: usize) -> Self {
        Self {
            kind: "OptionRow",
            text,
            action,
            index,
            icon: None,
        }
    }

    pub fn icon(mut self, icon: &'a str) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// Modal dialog. Cancelling (back press, outside tap) sends `cancel_action`.
#[derive(Serialize)]
pub struct Dialog<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    pub children: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_action: Option<&'a str>,
}

impl<'a> Dialog<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            kind: "Dialog",
            title,
            message: None,
            children: Vec::new(),
            positive: None,
            negative: None,
            cancel_action: None,
        }
    }

    pub fn message(mut self, message: &'a str) -> Self {
        self.message = Some(message);
        self
    }

    pub fn children(mut self, children: Vec<serde_json::Value>) -> Self {
        self.children = children;
        self
    }

    pub fn positive(mut self, button: Button<'_>) -> Self {
        self.positive = serde_json::to_value(button).ok();
        self
    }

    pub fn negative(mut self, button: Button<'_>) -> Self {
        self.negative = serde_json::to_value(button).ok();
        self
    }

    pub fn cancel_action(mut self, action: &'a str) -> Self {
        self.cancel_action = Some(action);
        self
    }
}

/// Covers the camera preview when capture is unavailable.
#[derive(Serialize)]
pub struct ErrorOverlay<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'a str>,
}

impl<'a> ErrorOverlay<'a> {
    pub fn hidden() -> Self {
        Self {
            kind: "ErrorOverlay",
            visible: false,
            title: None,
            icon: None,
            message: None,
            action: None,
        }
    }

    pub fn shown(message: Option<&'a str>) -> Self {
        Self {
            visible: true,
            message,
            ..Self::hidden()
        }
    }

    pub fn header(mut self, title: &'a str, icon: &'a str) -> Self {
        self.title = Some(title);
        self.icon = Some(icon);
        self
    }

    pub fn action(mut self, action: &'a str) -> Self {
        self.action = Some(action);
        self
    }
}
