#![forbid(unsafe_code)]

//! Modal configuration: recognized options, defaults, and button presets.
//!
//! The configuration is merged once at construction and never mutated
//! afterwards; the modal keeps an immutable snapshot. Options that the
//! original surface toolkits model through runtime type inspection are
//! tagged variants here: [`Backdrop`], [`Content`], [`Footer`].

use velum_surface::NodeId;
use web_time::Duration;

/// Default content transition length.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);
/// Default backdrop transition length.
pub const DEFAULT_BACKDROP_TRANSITION: Duration = Duration::from_millis(150);

/// Backdrop behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backdrop {
    /// No dismiss wiring beyond the container itself.
    None,
    /// Backdrop present and the dismiss key is wired.
    #[default]
    Dynamic,
    /// Backdrop present but inert: the dismiss key is not wired.
    Static,
}

/// Body content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Literal text content.
    Text(String),
    /// An existing node adopted into the body.
    Node(NodeId),
}

/// Footer content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Footer {
    /// Generate a row of buttons from the configured button set.
    #[default]
    Buttons,
    /// Literal text content.
    Text(String),
    /// An existing node adopted into the footer.
    Node(NodeId),
    /// No footer at all.
    None,
}

/// A button descriptor: label, dismiss payload value, and extra attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    /// Display label.
    pub text: String,
    /// Value carried by the dismiss event when this button is clicked.
    pub value: Option<bool>,
    /// Attributes applied to the generated node, in order.
    pub attrs: Vec<(String, String)>,
}

impl ButtonSpec {
    /// Create a button with a label and no value.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
            attrs: Vec::new(),
        }
    }

    /// Set the dismiss payload value.
    pub fn value(mut self, value: bool) -> Self {
        self.value = Some(value);
        self
    }

    /// Add an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Mark the button as a dismiss control.
    pub fn dismiss(self) -> Self {
        self.attr(crate::structure::ATTR_DISMISS, crate::structure::DISMISS_VALUE)
    }
}

/// Default two-button set: Cancel/OK, both dismissing.
pub fn dialog_buttons() -> Vec<ButtonSpec> {
    vec![
        ButtonSpec::new("Cancel")
            .value(false)
            .attr("class", "btn btn-flat btn-danger")
            .dismiss(),
        ButtonSpec::new("OK")
            .value(true)
            .attr("class", "btn btn-primary")
            .dismiss(),
    ]
}

/// Single-button set used by alert-style dialogs.
pub fn alert_buttons() -> Vec<ButtonSpec> {
    vec![
        ButtonSpec::new("OK")
            .attr("class", "btn btn-primary")
            .dismiss(),
    ]
}

/// Cancel/OK set used by confirm-style dialogs; values carry the answer.
pub fn confirm_buttons() -> Vec<ButtonSpec> {
    vec![
        ButtonSpec::new("Cancel")
            .value(false)
            .attr("class", "btn btn-danger")
            .dismiss(),
        ButtonSpec::new("OK")
            .value(true)
            .attr("class", "btn btn-primary")
            .dismiss(),
    ]
}

/// Modal configuration.
///
/// All options are optional; [`ModalConfig::default`] matches the documented
/// defaults. Unknown concerns (styling, theming) are carried by attributes
/// on the button specs and by the class names the assembler writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig {
    /// Selector of an existing root to adopt instead of constructing one.
    pub el: Option<String>,
    /// Animate transitions with the `fade`/`in` class protocol.
    pub animate: bool,
    /// Selector of the node a constructed modal is appended to
    /// (surface root when `None`).
    pub append_to: Option<String>,
    /// Backdrop behavior.
    pub backdrop: Backdrop,
    /// Reserved for future keyboard-dismiss gating.
    pub keyboard: bool,
    /// Title text shown in the header.
    pub title: Option<String>,
    /// Whether the header is attached at all.
    pub header: bool,
    /// Body content.
    pub content: Option<Content>,
    /// Footer content.
    pub footer: Footer,
    /// Button set for [`Footer::Buttons`]; `None` means the dialog preset.
    pub buttons: Option<Vec<ButtonSpec>>,
    /// Show a close control in the header.
    pub header_close: bool,
    /// Force-build new structure even when adopting an existing root.
    pub construct: bool,
    /// Content transition length.
    pub transition: Duration,
    /// Backdrop transition length.
    pub backdrop_transition: Duration,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            el: None,
            animate: true,
            append_to: None,
            backdrop: Backdrop::Dynamic,
            keyboard: true,
            title: None,
            header: true,
            content: None,
            footer: Footer::Buttons,
            buttons: None,
            header_close: true,
            construct: false,
            transition: DEFAULT_TRANSITION,
            backdrop_transition: DEFAULT_BACKDROP_TRANSITION,
        }
    }
}

impl ModalConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an existing root located by `selector`.
    pub fn el(mut self, selector: impl Into<String>) -> Self {
        self.el = Some(selector.into());
        self
    }

    /// Enable or disable animated transitions.
    pub fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Append a constructed modal under the node located by `selector`.
    pub fn append_to(mut self, selector: impl Into<String>) -> Self {
        self.append_to = Some(selector.into());
        self
    }

    /// Set the backdrop behavior.
    pub fn backdrop(mut self, backdrop: Backdrop) -> Self {
        self.backdrop = backdrop;
        self
    }

    /// Set the title text.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach or omit the header.
    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Set the body content.
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the footer content.
    pub fn footer(mut self, footer: Footer) -> Self {
        self.footer = footer;
        self
    }

    /// Set the button set used by [`Footer::Buttons`].
    pub fn buttons(mut self, buttons: Vec<ButtonSpec>) -> Self {
        self.buttons = Some(buttons);
        self
    }

    /// Show or hide the header close control.
    pub fn header_close(mut self, close: bool) -> Self {
        self.header_close = close;
        self
    }

    /// Force-build new structure even when `el` is set.
    pub fn construct(mut self, construct: bool) -> Self {
        self.construct = construct;
        self
    }

    /// Set the content transition length.
    pub fn transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    /// Set the backdrop transition length.
    pub fn backdrop_transition(mut self, transition: Duration) -> Self {
        self.backdrop_transition = transition;
        self
    }

    /// The effective button set: configured buttons or the dialog preset.
    pub(crate) fn effective_buttons(&self) -> Vec<ButtonSpec> {
        self.buttons.clone().unwrap_or_else(dialog_buttons)
    }
}
