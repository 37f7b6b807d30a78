#![forbid(unsafe_code)]

//! Structural assembly: building or adopting the modal's node tree.
//!
//! The assembler runs once at construction and produces a [`Structure`]:
//! the set of handles the lifecycle machine manipulates. It never touches
//! timing or event wiring. The backdrop is the one exception to the
//! build-once rule: it is created fresh on every show cycle and destroyed
//! on every completed hide.

use velum_surface::{NodeId, Surface};

use crate::config::{ButtonSpec, Content, Footer, ModalConfig};
use crate::error::ModalError;

// --- Class and attribute vocabulary ---

/// Container (outermost modal surface).
pub const CLASS_CONTAINER: &str = "modal";
/// Dialog frame.
pub const CLASS_DIALOG: &str = "modal-dialog";
/// Content box.
pub const CLASS_CONTENT: &str = "modal-content";
/// Header strip.
pub const CLASS_HEADER: &str = "modal-header";
/// Body area.
pub const CLASS_BODY: &str = "modal-body";
/// Footer strip.
pub const CLASS_FOOTER: &str = "modal-footer";
/// Backdrop surface.
pub const CLASS_BACKDROP: &str = "modal-backdrop";
/// Title node inside the header.
pub const CLASS_TITLE: &str = "modal-title";
/// Header close control.
pub const CLASS_CLOSE: &str = "close";
/// Animated-transition marker.
pub const CLASS_FADE: &str = "fade";
/// Settled-in transition marker.
pub const CLASS_IN: &str = "in";
/// Host marker while a modal is open.
pub const CLASS_OPEN: &str = "modal-open";

/// Attribute marking a node as a dismiss control.
pub const ATTR_DISMISS: &str = "data-dismiss";
/// Value of [`ATTR_DISMISS`] recognized by the dispatcher.
pub const DISMISS_VALUE: &str = "modal";
/// Back-reference from an adopted or constructed root to its modal.
pub const ATTR_MODAL_ID: &str = "data-modal-id";

/// Handles to the modal's structural surfaces.
///
/// # Invariants
/// - `backdrop` is `Some` exactly while the modal is not hidden; the node
///   is created fresh each show and removed on completed hide.
/// - `buttons` pairs every generated footer button with the descriptor it
///   was built from, so dismissal can carry the descriptor back out.
#[derive(Debug)]
pub struct Structure {
    /// Outermost surface; also the dismiss target for outside clicks.
    pub container: NodeId,
    /// Dialog frame inside the container.
    pub dialog: NodeId,
    /// Content box inside the dialog.
    pub content: NodeId,
    /// Header strip (may be left detached when header is off).
    pub header: NodeId,
    /// Body area (may be left detached when no content is set).
    pub body: NodeId,
    /// Footer strip (may be left detached).
    pub footer: NodeId,
    /// Current backdrop, present only during a show cycle.
    pub backdrop: Option<NodeId>,
    /// Generated footer buttons with their descriptors.
    pub buttons: Vec<(NodeId, ButtonSpec)>,
    /// Whether this modal owns a constructed (not adopted) root.
    pub constructed: bool,
    /// Node a constructed root is attached under while shown.
    pub append_to: NodeId,
    /// Effective animation flag; adoption of a `fade`-classed root turns
    /// animation on even when the configuration left it off.
    pub animate: bool,
}

/// Assemble or adopt the modal's structure.
///
/// Adoption resolves `config.el` and maps the structural children by
/// class, creating any that are missing. Construction builds the full
/// tree from scratch. Either way, header/body/footer population follows
/// the configuration rules and the root is tagged with a back-reference
/// to the modal id.
///
/// # Failure Modes
/// - [`ModalError::SelectorNotFound`] when `config.el` or
///   `config.append_to` resolves to no node. Nothing is mounted on
///   failure.
pub fn assemble(
    surface: &mut Surface,
    config: &ModalConfig,
    id: u64,
) -> Result<Structure, ModalError> {
    let append_to = match &config.append_to {
        Some(selector) => surface
            .select(selector)
            .ok_or_else(|| ModalError::SelectorNotFound {
                selector: selector.clone(),
            })?,
        None => surface.root(),
    };

    // A missing `el` always forces construction, mirroring the rule that
    // there is nothing to adopt.
    let constructed = config.construct || config.el.is_none();

    let mut animate = config.animate;
    let mut structure = if constructed {
        let container = surface.create_with_class(CLASS_CONTAINER);
        if animate {
            surface.add_class(container, CLASS_FADE);
        }
        surface.set_shown(container, false);

        let dialog = surface.create_with_class(CLASS_DIALOG);
        let content = surface.create_with_class(CLASS_CONTENT);
        let header = surface.create_with_class(CLASS_HEADER);
        let body = surface.create_with_class(CLASS_BODY);
        let footer = surface.create_with_class(CLASS_FOOTER);

        surface.append_child(dialog, content);
        surface.append_child(container, dialog);

        Structure {
            container,
            dialog,
            content,
            header,
            body,
            footer,
            backdrop: None,
            buttons: Vec::new(),
            constructed: true,
            append_to,
            animate,
        }
    } else {
        // Adopt path: config.el is present here.
        let selector = config.el.as_deref().unwrap_or_default();
        let container = surface
            .select(selector)
            .ok_or_else(|| ModalError::SelectorNotFound {
                selector: selector.to_owned(),
            })?;

        if surface.has_class(container, CLASS_FADE) {
            animate = true;
        }

        let dialog = map_or_create(surface, container, container, CLASS_DIALOG);
        let content = map_or_create(surface, container, dialog, CLASS_CONTENT);
        let header = map_or_create_detached(surface, container, CLASS_HEADER);
        let body = map_or_create_detached(surface, container, CLASS_BODY);
        let footer = map_or_create_detached(surface, container, CLASS_FOOTER);

        Structure {
            container,
            dialog,
            content,
            header,
            body,
            footer,
            backdrop: None,
            buttons: Vec::new(),
            constructed: false,
            append_to,
            animate,
        }
    };

    surface.set_attr(structure.container, ATTR_MODAL_ID, &id.to_string());

    set_header(surface, &mut structure, config);
    set_content(surface, &mut structure, config);
    set_footer(surface, &mut structure, config);

    Ok(structure)
}

/// Build a fresh backdrop under the append target.
///
/// Adds `fade` and forces a reflow before `in` so the transition is
/// observed from its starting state, matching the container protocol.
pub fn build_backdrop(surface: &mut Surface, append_to: NodeId, animate: bool) -> NodeId {
    let backdrop = surface.create_with_class(CLASS_BACKDROP);
    if animate {
        surface.add_class(backdrop, CLASS_FADE);
    }
    surface.append_child(append_to, backdrop);
    if animate {
        surface.force_reflow(backdrop);
    }
    surface.add_class(backdrop, CLASS_IN);
    backdrop
}

fn map_or_create(
    surface: &mut Surface,
    root: NodeId,
    parent: NodeId,
    class: &str,
) -> NodeId {
    if let Some(found) = surface.find_descendant_by_class(root, class) {
        found
    } else {
        let created = surface.create_with_class(class);
        surface.append_child(parent, created);
        created
    }
}

// Header, body and footer stay detached until population decides they
// belong in the tree.
fn map_or_create_detached(surface: &mut Surface, root: NodeId, class: &str) -> NodeId {
    surface
        .find_descendant_by_class(root, class)
        .unwrap_or_else(|| surface.create_with_class(class))
}

fn set_header(surface: &mut Surface, structure: &mut Structure, config: &ModalConfig) {
    if !config.header && config.title.is_none() {
        return;
    }
    if let Some(title) = &config.title {
        let node = surface.create_with_class(CLASS_TITLE);
        surface.set_text(node, title);
        surface.append_child(structure.header, node);
    }
    if config.header_close {
        let close = surface.create_with_class(CLASS_CLOSE);
        surface.set_text(close, "\u{d7}");
        surface.set_attr(close, ATTR_DISMISS, DISMISS_VALUE);
        surface.append_child(structure.header, close);
    }
    surface.append_child(structure.content, structure.header);
}

fn set_content(surface: &mut Surface, structure: &mut Structure, config: &ModalConfig) {
    let Some(content) = &config.content else {
        return;
    };
    match content {
        Content::Text(text) => surface.set_text(structure.body, text),
        Content::Node(node) => surface.append_child(structure.body, *node),
    }
    surface.append_child(structure.content, structure.body);
}

fn set_footer(surface: &mut Surface, structure: &mut Structure, config: &ModalConfig) {
    match &config.footer {
        Footer::None => return,
        Footer::Text(text) => surface.set_text(structure.footer, text),
        Footer::Node(node) => surface.append_child(structure.footer, *node),
        Footer::Buttons => {
            for spec in config.effective_buttons() {
                let button = surface.create_node();
                surface.set_text(button, &spec.text);
                for (name, value) in &spec.attrs {
                    if name == "class" {
                        for class in value.split_whitespace() {
                            surface.add_class(button, class);
                        }
                    } else {
                        surface.set_attr(button, name, value);
                    }
                }
                surface.append_child(structure.footer, button);
                structure.buttons.push((button, spec));
            }
        }
    }
    surface.append_child(structure.content, structure.footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{dialog_buttons, Backdrop};

    fn config() -> ModalConfig {
        ModalConfig::default()
    }

    #[test]
    fn construct_builds_full_tree() {
        let mut surface = Surface::new();
        let structure = assemble(&mut surface, &config().title("Hi"), 7).unwrap();
        assert!(structure.constructed);
        assert!(surface.has_class(structure.container, CLASS_CONTAINER));
        assert!(surface.has_class(structure.container, CLASS_FADE));
        assert!(!surface.is_shown(structure.container));
        assert_eq!(surface.parent(structure.dialog), Some(structure.container));
        assert_eq!(surface.parent(structure.content), Some(structure.dialog));
        assert_eq!(surface.attr(structure.container, ATTR_MODAL_ID), Some("7"));
        // Constructed roots stay detached until shown.
        assert_eq!(surface.parent(structure.container), None);
    }

    #[test]
    fn header_attaches_when_titled_even_if_header_off() {
        let mut surface = Surface::new();
        let structure =
            assemble(&mut surface, &config().header(false).title("Still here"), 1).unwrap();
        assert_eq!(surface.parent(structure.header), Some(structure.content));
        let title = surface
            .find_descendant_by_class(structure.header, CLASS_TITLE)
            .unwrap();
        assert_eq!(surface.text(title), Some("Still here"));
    }

    #[test]
    fn headerless_untitled_modal_leaves_header_detached() {
        let mut surface = Surface::new();
        let structure = assemble(&mut surface, &config().header(false), 1).unwrap();
        assert_eq!(surface.parent(structure.header), None);
    }

    #[test]
    fn body_attaches_only_with_content() {
        let mut surface = Surface::new();
        let bare = assemble(&mut surface, &config(), 1).unwrap();
        assert_eq!(surface.parent(bare.body), None);

        let filled = assemble(
            &mut surface,
            &config().content(Content::Text("payload".into())),
            2,
        )
        .unwrap();
        assert_eq!(surface.parent(filled.body), Some(filled.content));
        assert_eq!(surface.text(filled.body), Some("payload"));
    }

    #[test]
    fn footer_buttons_carry_descriptors() {
        let mut surface = Surface::new();
        let structure = assemble(&mut surface, &config(), 1).unwrap();
        assert_eq!(structure.buttons.len(), 2);
        let (node, spec) = &structure.buttons[1];
        assert_eq!(spec.text, "OK");
        assert_eq!(spec.value, Some(true));
        assert_eq!(surface.attr(*node, ATTR_DISMISS), Some(DISMISS_VALUE));
        assert!(surface.has_class(*node, "btn-primary"));
        assert_eq!(surface.parent(*node), Some(structure.footer));
    }

    #[test]
    fn body_adopts_an_existing_node() {
        let mut surface = Surface::new();
        let form = surface.create_with_class("rename-form");
        surface.set_text(form, "New name:");

        let structure =
            assemble(&mut surface, &config().content(Content::Node(form)), 1).unwrap();
        assert_eq!(surface.parent(form), Some(structure.body));
        assert_eq!(surface.parent(structure.body), Some(structure.content));
        assert!(surface.collect_text(structure.body).contains("New name:"));
    }

    #[test]
    fn footer_text_renders_literally() {
        let mut surface = Surface::new();
        let structure = assemble(
            &mut surface,
            &config().footer(Footer::Text("fine print".into())),
            1,
        )
        .unwrap();
        assert_eq!(surface.parent(structure.footer), Some(structure.content));
        assert_eq!(surface.text(structure.footer), Some("fine print"));
        assert!(structure.buttons.is_empty());
    }

    #[test]
    fn footer_adopts_an_existing_node() {
        let mut surface = Surface::new();
        let legal = surface.create_with_class("legal");
        surface.set_text(legal, "v1.2");

        let structure =
            assemble(&mut surface, &config().footer(Footer::Node(legal)), 1).unwrap();
        assert_eq!(surface.parent(legal), Some(structure.footer));
        assert_eq!(surface.parent(structure.footer), Some(structure.content));
        assert!(structure.buttons.is_empty());
    }

    #[test]
    fn missing_append_target_fails_without_mounting() {
        let mut surface = Surface::new();
        let before = surface.node_count();
        let err = assemble(&mut surface, &config().append_to("#nowhere"), 1).unwrap_err();
        assert_eq!(
            err,
            ModalError::SelectorNotFound {
                selector: "#nowhere".into()
            }
        );
        assert_eq!(surface.node_count(), before);
    }

    #[test]
    fn footer_none_stays_detached() {
        let mut surface = Surface::new();
        let structure = assemble(&mut surface, &config().footer(Footer::None), 1).unwrap();
        assert_eq!(surface.parent(structure.footer), None);
        assert!(structure.buttons.is_empty());
    }

    #[test]
    fn adopt_maps_existing_children_and_flips_animate() {
        let mut surface = Surface::new();
        let root = surface.create_with_class(CLASS_CONTAINER);
        surface.add_class(root, CLASS_FADE);
        surface.set_attr(root, "id", "existing");
        let dialog = surface.create_with_class(CLASS_DIALOG);
        surface.append_child(root, dialog);
        let parent = surface.root();
        surface.append_child(parent, root);

        let cfg = config().el("#existing").animate(false);
        let structure = assemble(&mut surface, &cfg, 3).unwrap();
        assert!(!structure.constructed);
        assert!(structure.animate);
        assert_eq!(structure.container, root);
        assert_eq!(structure.dialog, dialog);
        assert_eq!(surface.attr(root, ATTR_MODAL_ID), Some("3"));
    }

    #[test]
    fn missing_selector_fails_without_mounting() {
        let mut surface = Surface::new();
        let before = surface.node_count();
        let err = assemble(&mut surface, &config().el("#ghost"), 1).unwrap_err();
        assert_eq!(
            err,
            ModalError::SelectorNotFound {
                selector: "#ghost".into()
            }
        );
        assert_eq!(surface.node_count(), before);
    }

    #[test]
    fn construct_flag_overrides_adoption() {
        let mut surface = Surface::new();
        let root = surface.create_with_class(CLASS_CONTAINER);
        surface.set_attr(root, "id", "existing");
        let parent = surface.root();
        surface.append_child(parent, root);

        let cfg = config().el("#existing").construct(true);
        let structure = assemble(&mut surface, &cfg, 4).unwrap();
        assert!(structure.constructed);
        assert_ne!(structure.container, root);
    }

    #[test]
    fn backdrop_builds_fresh_under_target() {
        let mut surface = Surface::new();
        let target = surface.root();
        let reflows = surface.reflow_count();
        let backdrop = build_backdrop(&mut surface, target, true);
        assert!(surface.has_class(backdrop, CLASS_BACKDROP));
        assert!(surface.has_class(backdrop, CLASS_FADE));
        assert!(surface.has_class(backdrop, CLASS_IN));
        assert_eq!(surface.parent(backdrop), Some(target));
        assert_eq!(surface.reflow_count(), reflows + 1);

        let plain = build_backdrop(&mut surface, target, false);
        assert!(!surface.has_class(plain, CLASS_FADE));
        assert_eq!(surface.reflow_count(), reflows + 1);
    }

    #[test]
    fn default_buttons_match_dialog_preset() {
        let mut surface = Surface::new();
        let structure = assemble(&mut surface, &config().backdrop(Backdrop::None), 1).unwrap();
        let specs: Vec<_> = structure.buttons.iter().map(|(_, s)| s.clone()).collect();
        assert_eq!(specs, dialog_buttons());
    }
}
