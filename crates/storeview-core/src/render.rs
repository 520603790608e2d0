//! View model and the render pass
//!
//! `render` projects the state holder into a `ViewModel`: a fixed set of
//! controls the front-end paints each frame. The pass is idempotent and safe
//! to call redundantly. Every control bumps a revision counter only on an
//! actual write, so a render that has nothing to change is observably a
//! no-op.
//!
//! `render` has no access to the command sender; outbound commands are
//! produced only by explicit interaction handlers in the front-end.

use crate::state::{ClientState, ConnectionState};

/// The display region mirroring the serialized store
#[derive(Debug, Clone, Default)]
pub struct MirrorText {
    text: String,
    revision: u64,
}

impl MirrorText {
    /// Current display text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of writes so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the text, skipping the write when already equal
    pub fn set_text(&mut self, text: String) {
        if self.text != text {
            self.text = text;
            self.revision += 1;
        }
    }
}

/// The recording toggle control
#[derive(Debug, Clone, Default)]
pub struct ToggleControl {
    checked: bool,
    revision: u64,
}

impl ToggleControl {
    /// Whether the toggle is on
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Number of writes so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set the checked state, skipping the write when already in sync
    pub fn set_checked(&mut self, checked: bool) {
        if self.checked != checked {
            self.checked = checked;
            self.revision += 1;
        }
    }
}

/// The name text field
///
/// Tracks keyboard focus so the render pass can avoid clobbering an edit in
/// progress.
#[derive(Debug, Clone, Default)]
pub struct NameField {
    value: String,
    focused: bool,
    revision: u64,
}

impl NameField {
    /// Current field contents
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the field has keyboard focus
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Number of writes so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the contents, skipping the write when already equal
    pub fn set_value(&mut self, value: String) {
        if self.value != value {
            self.value = value;
            self.revision += 1;
        }
    }

    /// Give or remove keyboard focus (a local interaction, not a write)
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Append a typed character (interaction handler use only)
    pub fn insert(&mut self, c: char) {
        self.value.push(c);
        self.revision += 1;
    }

    /// Delete the last character (interaction handler use only)
    pub fn backspace(&mut self) {
        if self.value.pop().is_some() {
            self.revision += 1;
        }
    }
}

/// The fixed set of controls the front-end paints
///
/// One instance per session; replaces the fixed DOM element IDs of a browser
/// page.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub mirror: MirrorText,
    pub toggle: ToggleControl,
    pub name_field: NameField,
}

impl ViewModel {
    /// Create an empty view model
    pub fn new() -> Self {
        Self::default()
    }
}

/// Project the state holder into the view model
///
/// - While the connection is not open, the mirror shows a placeholder naming
///   the state instead of store contents.
/// - The toggle is written only when out of sync with the model, to avoid
///   fighting user interaction.
/// - The name field is written only when its value differs from the model
///   AND it does not have focus. A focused field is left alone; the
///   overwrite is retried on the next render, i.e. the next server push.
pub fn render(state: &ClientState, view: &mut ViewModel) {
    if state.connection_state() != ConnectionState::Open {
        view.mirror
            .set_text(format!("connection state: {}", state.connection_state()));
    } else {
        // Before the first push the store reads as an empty object
        let text = state
            .store()
            .map(|store| store.to_json())
            .unwrap_or_else(|| "{}".to_string());
        view.mirror.set_text(text);
    }

    if let Some(store) = state.store() {
        view.toggle.set_checked(store.is_recording().unwrap_or(false));

        let name = store.name().unwrap_or("");
        if view.name_field.value() != name && !view.name_field.is_focused() {
            view.name_field.set_value(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportEvent;

    fn open_state_with(json: &str) -> ClientState {
        let mut state = ClientState::new();
        state.apply(&TransportEvent::Opened);
        state.apply(&TransportEvent::Message(json.to_string()));
        state
    }

    #[test]
    fn test_placeholder_for_every_non_open_state() {
        let mut view = ViewModel::new();

        let mut state = ClientState::new();
        render(&state, &mut view);
        assert_eq!(view.mirror.text(), "connection state: connecting");

        // Store contents never leak into the mirror while not open
        state.apply(&TransportEvent::Message(r#"{"name":"Alice"}"#.to_string()));
        state.apply(&TransportEvent::Closed);
        render(&state, &mut view);
        assert_eq!(view.mirror.text(), "connection state: closed");
    }

    #[test]
    fn test_mirror_shows_exact_json_when_open() {
        let state = open_state_with(r#"{"name":"Alice","is_recording":true}"#);
        let mut view = ViewModel::new();

        render(&state, &mut view);
        assert_eq!(view.mirror.text(), r#"{"name":"Alice","is_recording":true}"#);
    }

    #[test]
    fn test_mirror_shows_empty_object_before_first_store() {
        let mut state = ClientState::new();
        state.apply(&TransportEvent::Opened);
        let mut view = ViewModel::new();

        render(&state, &mut view);
        assert_eq!(view.mirror.text(), "{}");
    }

    #[test]
    fn test_toggle_reflects_model() {
        let state = open_state_with(r#"{"is_recording":true}"#);
        let mut view = ViewModel::new();

        render(&state, &mut view);
        assert!(view.toggle.checked());

        // Absent field reads as false
        let state = open_state_with("{}");
        render(&state, &mut view);
        assert!(!view.toggle.checked());
    }

    #[test]
    fn test_focused_field_left_untouched() {
        let state = open_state_with(r#"{"name":"Alice"}"#);
        let mut view = ViewModel::new();
        view.name_field.set_value("Bo".to_string());
        view.name_field.set_focused(true);
        let revision = view.name_field.revision();

        render(&state, &mut view);
        assert_eq!(view.name_field.value(), "Bo");
        assert_eq!(view.name_field.revision(), revision);
    }

    #[test]
    fn test_unfocused_field_overwritten_when_differing() {
        let state = open_state_with(r#"{"name":"Alice"}"#);
        let mut view = ViewModel::new();
        view.name_field.set_value("Bob".to_string());

        render(&state, &mut view);
        assert_eq!(view.name_field.value(), "Alice");
    }

    #[test]
    fn test_overwrite_retried_after_focus_lost() {
        let state = open_state_with(r#"{"name":"Alice"}"#);
        let mut view = ViewModel::new();
        view.name_field.set_focused(true);
        view.name_field.set_value("Bob".to_string());

        render(&state, &mut view);
        assert_eq!(view.name_field.value(), "Bob");

        // The deferred overwrite lands on the next render once focus is gone
        view.name_field.set_focused(false);
        render(&state, &mut view);
        assert_eq!(view.name_field.value(), "Alice");
    }

    #[test]
    fn test_render_is_a_noop_when_in_sync() {
        let state = open_state_with(r#"{"name":"Alice","is_recording":true}"#);
        let mut view = ViewModel::new();

        render(&state, &mut view);
        let mirror_rev = view.mirror.revision();
        let toggle_rev = view.toggle.revision();
        let name_rev = view.name_field.revision();

        // Redundant calls write nothing
        render(&state, &mut view);
        render(&state, &mut view);
        assert_eq!(view.mirror.revision(), mirror_rev);
        assert_eq!(view.toggle.revision(), toggle_rev);
        assert_eq!(view.name_field.revision(), name_rev);
    }
}
