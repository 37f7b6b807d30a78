#![forbid(unsafe_code)]

//! The modal lifecycle state machine.
//!
//! A [`Modal`] orchestrates backdrop insertion, timed transitions, event
//! wiring and layout compensation across five states:
//!
//! ```text
//! Hidden -> ShowingBackdrop -> TransitioningIn -> Visible
//!    ^                                               |
//!    +----------- TransitioningOut <-----------------+
//! ```
//!
//! The machine never sleeps. Deadlines are recorded against a [`Clock`]
//! and fired by [`Modal::tick`]; at most one deadline is pending at any
//! time, and accepting a hide cancels whatever was pending. Successor
//! deadlines are scheduled relative to the fired deadline rather than
//! the tick instant, so a single clock advance spanning several phases
//! settles in one tick.
//!
//! # Invariants
//!
//! - A backdrop node exists exactly while the state is not `Hidden`,
//!   and is created fresh each cycle.
//! - Input listeners exist only between the backdrop settling and the
//!   next accepted hide; a modal on its way out never reacts to input.
//! - Host padding recorded at show time is restored byte-for-byte at
//!   teardown, however many resizes happened in between.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};
use velum_surface::{InputEvent, Key, NodeId, Size, Surface};
use web_time::Instant;

use crate::clock::{Clock, WallClock};
use crate::config::{alert_buttons, confirm_buttons, Backdrop, ButtonSpec, ModalConfig};
use crate::error::ModalError;
use crate::hooks::{Hooks, LifecycleEvent, Subscription};
use crate::layout;
use crate::structure::{self, Structure, ATTR_DISMISS, CLASS_IN, CLASS_OPEN, DISMISS_VALUE};
use crate::wiring::HandlerSet;

static NEXT_MODAL_ID: AtomicU64 = AtomicU64::new(1);

/// Where the modal is in its show/hide cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not mounted; no backdrop, no listeners.
    Hidden,
    /// Backdrop inserted, waiting out the backdrop transition.
    ShowingBackdrop,
    /// Container transitioning in, listeners attached.
    TransitioningIn,
    /// Settled and interactive.
    Visible,
    /// Transitioning out, listeners already detached.
    TransitioningOut,
}

/// Which phase a pending deadline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseTimer {
    BackdropShown,
    ContentShown,
    TeardownDone,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    phase: PhaseTimer,
}

/// A modal dialog bound to a [`Surface`].
///
/// Construction assembles or adopts structure and can fail; `show`,
/// `hide`, `tick` and `dispatch` are infallible. The caller drives time
/// by calling [`tick`](Self::tick) and routes surface input through
/// [`dispatch`](Self::dispatch).
pub struct Modal {
    id: u64,
    state: LifecycleState,
    config: ModalConfig,
    structure: Structure,
    handlers: Option<HandlerSet>,
    pending: Option<Pending>,
    body_overflowing: bool,
    original_body_pad: u16,
    hooks: Hooks,
    clock: Rc<dyn Clock>,
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Modal {
    /// Construct a modal on `surface` with wall-clock timing.
    pub fn new(surface: &mut Surface, config: ModalConfig) -> Result<Self, ModalError> {
        Self::with_clock(surface, config, Rc::new(WallClock))
    }

    /// Construct a modal with an explicit time source.
    pub fn with_clock(
        surface: &mut Surface,
        config: ModalConfig,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, ModalError> {
        let id = NEXT_MODAL_ID.fetch_add(1, Ordering::Relaxed);
        let structure = structure::assemble(surface, &config, id)?;
        debug!(id, constructed = structure.constructed, "modal assembled");
        Ok(Self {
            id,
            state: LifecycleState::Hidden,
            config,
            structure,
            handlers: None,
            pending: None,
            body_overflowing: false,
            original_body_pad: 0,
            hooks: Hooks::new(),
            clock,
        })
    }

    /// Preset configuration for a single-button alert dialog.
    pub fn alert_config(message: impl Into<String>) -> ModalConfig {
        ModalConfig::new()
            .title(message)
            .construct(true)
            .buttons(alert_buttons())
    }

    /// Preset configuration for a Cancel/OK confirm dialog whose dismiss
    /// payload carries the answer.
    pub fn confirm_config(question: impl Into<String>) -> ModalConfig {
        ModalConfig::new()
            .title(question)
            .construct(true)
            .buttons(confirm_buttons())
    }

    /// Construct an alert-style modal.
    pub fn alert(surface: &mut Surface, message: impl Into<String>) -> Result<Self, ModalError> {
        Self::new(surface, Self::alert_config(message))
    }

    /// Construct a confirm-style modal.
    pub fn confirm(surface: &mut Surface, question: impl Into<String>) -> Result<Self, ModalError> {
        Self::new(surface, Self::confirm_config(question))
    }

    // --- Accessors ---

    /// Process-unique identifier, also written to the root's
    /// `data-modal-id` attribute.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the modal has settled visible.
    pub fn is_visible(&self) -> bool {
        self.state == LifecycleState::Visible
    }

    /// The container node.
    pub fn container(&self) -> NodeId {
        self.structure.container
    }

    /// Structural handles.
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Immutable configuration snapshot.
    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// Subscribe to lifecycle events. The subscription must be held;
    /// dropping it unregisters the observer.
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn on(&self, callback: impl Fn(&LifecycleEvent) + 'static) -> Subscription {
        self.hooks.subscribe(callback)
    }

    // --- Lifecycle ---

    /// Begin showing. Accepted only from `Hidden`; otherwise a no-op.
    pub fn show(&mut self, surface: &mut Surface) {
        if self.state != LifecycleState::Hidden {
            trace!(id = self.id, state = ?self.state, "show ignored");
            return;
        }
        debug!(id = self.id, "show accepted");
        self.hooks.emit(&LifecycleEvent::BeforeShow);

        self.body_overflowing = layout::check_scrollbar(surface);
        self.original_body_pad = layout::set_scrollbar(surface, self.body_overflowing);
        let root = surface.root();
        surface.add_class(root, CLASS_OPEN);

        if self.structure.constructed {
            surface.append_child(self.structure.append_to, self.structure.container);
        }
        surface.set_shown(self.structure.container, true);
        surface.set_scroll_top(self.structure.container, 0);

        let backdrop =
            structure::build_backdrop(surface, self.structure.append_to, self.structure.animate);
        self.structure.backdrop = Some(backdrop);

        self.schedule(
            self.clock.now() + self.config.backdrop_transition,
            PhaseTimer::BackdropShown,
        );
        self.state = LifecycleState::ShowingBackdrop;

        layout::resize(surface, self.structure.container, self.body_overflowing);
    }

    /// Begin hiding. Accepted from any state except `Hidden` and
    /// `TransitioningOut`; cancels a pending show-phase deadline.
    pub fn hide(&mut self, surface: &mut Surface) {
        if matches!(
            self.state,
            LifecycleState::Hidden | LifecycleState::TransitioningOut
        ) {
            trace!(id = self.id, state = ?self.state, "hide ignored");
            return;
        }
        debug!(id = self.id, state = ?self.state, "hide accepted");
        self.hooks.emit(&LifecycleEvent::BeforeHide);

        self.pending = None;
        if let Some(backdrop) = self.structure.backdrop {
            surface.remove_class(backdrop, CLASS_IN);
        }
        surface.remove_class(self.structure.container, CLASS_IN);
        if let Some(handlers) = self.handlers.take() {
            handlers.detach(surface);
        }

        self.schedule(
            self.clock.now() + self.config.transition,
            PhaseTimer::TeardownDone,
        );
        self.state = LifecycleState::TransitioningOut;
    }

    /// Fire every pending deadline the clock has passed.
    pub fn tick(&mut self, surface: &mut Surface) {
        while let Some(pending) = self.pending {
            if self.clock.now() < pending.due {
                break;
            }
            self.pending = None;
            trace!(id = self.id, phase = ?pending.phase, "deadline fired");
            match pending.phase {
                PhaseTimer::BackdropShown => {
                    let wire_keydown = self.config.backdrop == Backdrop::Dynamic;
                    self.handlers = Some(HandlerSet::attach(
                        surface,
                        self.structure.container,
                        wire_keydown,
                    ));
                    if self.structure.animate {
                        surface.force_reflow(self.structure.container);
                    }
                    surface.add_class(self.structure.container, CLASS_IN);
                    self.schedule(pending.due + self.config.transition, PhaseTimer::ContentShown);
                    self.state = LifecycleState::TransitioningIn;
                }
                PhaseTimer::ContentShown => {
                    self.state = LifecycleState::Visible;
                    debug!(id = self.id, "visible");
                    self.hooks.emit(&LifecycleEvent::Show);
                }
                PhaseTimer::TeardownDone => {
                    let root = surface.root();
                    surface.remove_class(root, CLASS_OPEN);
                    layout::restore_scrollbar(surface, self.original_body_pad);
                    if let Some(backdrop) = self.structure.backdrop.take() {
                        surface.remove(backdrop);
                    }
                    surface.set_shown(self.structure.container, false);
                    if self.structure.constructed {
                        surface.detach(self.structure.container);
                    }
                    self.state = LifecycleState::Hidden;
                    debug!(id = self.id, "hidden");
                    self.hooks.emit(&LifecycleEvent::Hide);
                }
            }
        }
    }

    // --- Input ---

    /// Route a surface input event. Returns whether the modal consumed
    /// it. Events arriving before the listeners are attached (or after
    /// they are detached) are never consumed.
    pub fn dispatch(&mut self, surface: &mut Surface, event: &InputEvent) -> bool {
        let Some(handlers) = &self.handlers else {
            return false;
        };
        match *event {
            InputEvent::Key(Key::Escape) if handlers.keydown_wired() => {
                debug!(id = self.id, "dismissed by key");
                self.hooks.emit(&LifecycleEvent::Dismiss(None));
                self.hide(surface);
                true
            }
            InputEvent::Key(_) => false,
            InputEvent::Pointer { target } => {
                if surface.attr(target, ATTR_DISMISS) == Some(DISMISS_VALUE)
                    && self.owns_node(surface, target)
                {
                    let payload = self.button_payload(target);
                    debug!(id = self.id, "dismissed by control");
                    self.hooks.emit(&LifecycleEvent::Dismiss(payload));
                    self.hide(surface);
                    true
                } else if target == self.structure.container {
                    self.hide(surface);
                    true
                } else {
                    false
                }
            }
            InputEvent::Resize { width, height } => {
                surface.set_viewport(Size::new(width, height));
                layout::resize(surface, self.structure.container, self.body_overflowing);
                true
            }
        }
    }

    // Dismiss controls count only inside this modal's container; a host
    // broadcasting pointer events to several modals must not let one
    // modal's button dismiss another.
    fn owns_node(&self, surface: &Surface, target: NodeId) -> bool {
        let mut node = Some(target);
        while let Some(id) = node {
            if id == self.structure.container {
                return true;
            }
            node = surface.parent(id);
        }
        false
    }

    fn button_payload(&self, target: NodeId) -> Option<ButtonSpec> {
        self.structure
            .buttons
            .iter()
            .find(|(node, _)| *node == target)
            .map(|(_, spec)| spec.clone())
    }

    fn schedule(&mut self, due: Instant, phase: PhaseTimer) {
        trace!(id = self.id, ?phase, "deadline scheduled");
        self.pending = Some(Pending { due, phase });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{Content, DEFAULT_BACKDROP_TRANSITION, DEFAULT_TRANSITION};
    use crate::structure::{CLASS_BACKDROP, CLASS_FADE};
    use std::cell::RefCell;

    fn setup(config: ModalConfig) -> (Surface, Modal, ManualClock) {
        let mut surface = Surface::new();
        let clock = ManualClock::new();
        let modal = Modal::with_clock(&mut surface, config, Rc::new(clock.clone()))
            .expect("assembly succeeds");
        (surface, modal, clock)
    }

    fn settle_shown(surface: &mut Surface, modal: &mut Modal, clock: &ManualClock) {
        modal.show(surface);
        clock.advance(DEFAULT_BACKDROP_TRANSITION + DEFAULT_TRANSITION);
        modal.tick(surface);
    }

    #[test]
    fn show_sequences_backdrop_then_content() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        modal.show(&mut surface);
        assert_eq!(modal.state(), LifecycleState::ShowingBackdrop);

        let backdrop = modal.structure().backdrop.expect("backdrop mounted");
        assert!(surface.has_class(backdrop, CLASS_IN));
        assert!(!surface.has_class(modal.container(), CLASS_IN));
        assert_eq!(surface.listener_count(), 0);

        clock.advance(DEFAULT_BACKDROP_TRANSITION);
        modal.tick(&mut surface);
        assert_eq!(modal.state(), LifecycleState::TransitioningIn);
        assert!(surface.has_class(modal.container(), CLASS_IN));
        assert_eq!(surface.listener_count(), 3);

        clock.advance(DEFAULT_TRANSITION);
        modal.tick(&mut surface);
        assert_eq!(modal.state(), LifecycleState::Visible);
    }

    #[test]
    fn one_tick_settles_a_spanned_advance() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        modal.show(&mut surface);
        clock.advance(DEFAULT_BACKDROP_TRANSITION + DEFAULT_TRANSITION);
        modal.tick(&mut surface);
        assert!(modal.is_visible());
    }

    #[test]
    fn show_is_accepted_only_from_hidden() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);
        let backdrop = modal.structure().backdrop;

        modal.show(&mut surface);
        assert_eq!(modal.state(), LifecycleState::Visible);
        assert_eq!(modal.structure().backdrop, backdrop);
    }

    #[test]
    fn hide_cancels_a_pending_show_deadline() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        modal.show(&mut surface);
        modal.hide(&mut surface);
        assert_eq!(modal.state(), LifecycleState::TransitioningOut);

        // The cancelled backdrop deadline must not fire and re-attach
        // listeners.
        clock.advance(DEFAULT_BACKDROP_TRANSITION + DEFAULT_TRANSITION);
        modal.tick(&mut surface);
        assert_eq!(modal.state(), LifecycleState::Hidden);
        assert_eq!(surface.listener_count(), 0);
        assert!(modal.structure().backdrop.is_none());
    }

    #[test]
    fn teardown_restores_host_state() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        let root = surface.root();
        surface.set_padding_right(root, 6);
        surface.set_content_width(1000); // host shows a scrollbar

        settle_shown(&mut surface, &mut modal, &clock);
        assert!(surface.has_class(root, CLASS_OPEN));
        assert_eq!(surface.padding_right(root), 6 + surface.scrollbar_width());

        modal.hide(&mut surface);
        clock.advance(DEFAULT_TRANSITION);
        modal.tick(&mut surface);

        assert_eq!(modal.state(), LifecycleState::Hidden);
        assert!(!surface.has_class(root, CLASS_OPEN));
        assert_eq!(surface.padding_right(root), 6);
        assert!(!surface.is_shown(modal.container()));
        // Constructed roots leave the tree entirely.
        assert_eq!(surface.parent(modal.container()), None);
    }

    #[test]
    fn backdrop_is_fresh_each_cycle() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);
        let first = modal.structure().backdrop.expect("first backdrop");

        modal.hide(&mut surface);
        clock.advance(DEFAULT_TRANSITION);
        modal.tick(&mut surface);
        assert!(!surface.contains(first));

        settle_shown(&mut surface, &mut modal, &clock);
        let second = modal.structure().backdrop.expect("second backdrop");
        assert_ne!(first, second);
        assert!(surface.has_class(second, CLASS_BACKDROP));
    }

    #[test]
    fn escape_dismisses_a_dynamic_backdrop_modal() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);

        let events = Rc::new(RefCell::new(Vec::new()));
        let events_in = Rc::clone(&events);
        let _sub = modal.on(move |event| events_in.borrow_mut().push(event.clone()));

        assert!(modal.dispatch(&mut surface, &InputEvent::Key(Key::Escape)));
        assert_eq!(modal.state(), LifecycleState::TransitioningOut);
        assert_eq!(
            events.borrow().as_slice(),
            &[
                LifecycleEvent::Dismiss(None),
                LifecycleEvent::BeforeHide
            ]
        );
    }

    #[test]
    fn static_backdrop_leaves_escape_unwired() {
        let (mut surface, mut modal, clock) =
            setup(ModalConfig::default().backdrop(Backdrop::Static));
        settle_shown(&mut surface, &mut modal, &clock);
        assert_eq!(surface.listener_count(), 2);

        assert!(!modal.dispatch(&mut surface, &InputEvent::Key(Key::Escape)));
        assert!(modal.is_visible());
    }

    #[test]
    fn dismiss_control_click_carries_its_descriptor() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);
        let (ok_node, ok_spec) = modal.structure().buttons[1].clone();

        let payload = Rc::new(RefCell::new(None));
        let payload_in = Rc::clone(&payload);
        let _sub = modal.on(move |event| {
            if let LifecycleEvent::Dismiss(spec) = event {
                *payload_in.borrow_mut() = Some(spec.clone());
            }
        });

        assert!(modal.dispatch(&mut surface, &InputEvent::Pointer { target: ok_node }));
        assert_eq!(payload.borrow().clone(), Some(Some(ok_spec)));
        assert_eq!(modal.state(), LifecycleState::TransitioningOut);
    }

    #[test]
    fn container_click_hides_without_dismiss() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);

        let dismissed = Rc::new(RefCell::new(false));
        let dismissed_in = Rc::clone(&dismissed);
        let _sub = modal.on(move |event| {
            if matches!(event, LifecycleEvent::Dismiss(_)) {
                *dismissed_in.borrow_mut() = true;
            }
        });

        let container = modal.container();
        assert!(modal.dispatch(&mut surface, &InputEvent::Pointer { target: container }));
        assert!(!*dismissed.borrow());
        assert_eq!(modal.state(), LifecycleState::TransitioningOut);
    }

    #[test]
    fn foreign_dismiss_controls_are_ignored() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);

        // A dismiss-marked node outside this modal's container.
        let stray = surface.create_node();
        surface.set_attr(stray, ATTR_DISMISS, DISMISS_VALUE);
        let root = surface.root();
        surface.append_child(root, stray);
        assert!(!modal.dispatch(&mut surface, &InputEvent::Pointer { target: stray }));
        assert!(modal.is_visible());

        // Another modal's button must not dismiss this one either.
        let other = Modal::new(&mut surface, ModalConfig::default()).expect("second modal");
        let (other_ok, _) = other.structure().buttons[1].clone();
        assert!(!modal.dispatch(&mut surface, &InputEvent::Pointer { target: other_ok }));
        assert!(modal.is_visible());
    }

    #[test]
    fn inner_clicks_pass_through() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);
        let dialog = modal.structure().dialog;
        assert!(!modal.dispatch(&mut surface, &InputEvent::Pointer { target: dialog }));
        assert!(modal.is_visible());
    }

    #[test]
    fn input_before_wiring_is_ignored() {
        let (mut surface, mut modal, _clock) = setup(ModalConfig::default());
        modal.show(&mut surface);
        assert!(!modal.dispatch(&mut surface, &InputEvent::Key(Key::Escape)));
        assert_eq!(modal.state(), LifecycleState::ShowingBackdrop);
    }

    #[test]
    fn resize_rebalances_container_padding() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        settle_shown(&mut surface, &mut modal, &clock);
        let container = modal.container();
        surface.set_scroll_height(container, 2000);

        assert!(modal.dispatch(
            &mut surface,
            &InputEvent::Resize {
                width: 800,
                height: 600
            }
        ));
        assert_eq!(surface.viewport(), Size::new(800, 600));
        assert_eq!(surface.padding_left(container), surface.scrollbar_width());
    }

    #[test]
    fn lifecycle_events_arrive_in_order() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_in = Rc::clone(&events);
        let _sub = modal.on(move |event| events_in.borrow_mut().push(event.clone()));

        settle_shown(&mut surface, &mut modal, &clock);
        modal.hide(&mut surface);
        clock.advance(DEFAULT_TRANSITION);
        modal.tick(&mut surface);

        assert_eq!(
            events.borrow().as_slice(),
            &[
                LifecycleEvent::BeforeShow,
                LifecycleEvent::Show,
                LifecycleEvent::BeforeHide,
                LifecycleEvent::Hide
            ]
        );
    }

    #[test]
    fn hide_from_hidden_is_a_noop() {
        let (mut surface, mut modal, _clock) = setup(ModalConfig::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_in = Rc::clone(&events);
        let _sub = modal.on(move |event| events_in.borrow_mut().push(event.clone()));
        modal.hide(&mut surface);
        assert_eq!(modal.state(), LifecycleState::Hidden);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn unanimated_modal_skips_reflows() {
        let (mut surface, mut modal, clock) = setup(ModalConfig::default().animate(false));
        let before = surface.reflow_count();
        settle_shown(&mut surface, &mut modal, &clock);
        assert_eq!(surface.reflow_count(), before);
        assert!(!surface.has_class(modal.container(), CLASS_FADE));
    }

    #[test]
    fn header_close_control_dismisses_without_payload() {
        let (mut surface, mut modal, clock) = setup(
            ModalConfig::default()
                .title("Close me")
                .content(Content::Text("body".into())),
        );
        settle_shown(&mut surface, &mut modal, &clock);
        let close = surface
            .find_descendant_by_class(modal.structure().header, crate::structure::CLASS_CLOSE)
            .expect("close control");

        let payload = Rc::new(RefCell::new(None));
        let payload_in = Rc::clone(&payload);
        let _sub = modal.on(move |event| {
            if let LifecycleEvent::Dismiss(spec) = event {
                *payload_in.borrow_mut() = Some(spec.clone());
            }
        });

        assert!(modal.dispatch(&mut surface, &InputEvent::Pointer { target: close }));
        assert_eq!(payload.borrow().clone(), Some(None));
    }
}
