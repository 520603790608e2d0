//! Application state and interaction handling
//!
//! Interaction handlers are the only producers of outbound commands; the
//! render pass never sends. Commands are queued here and drained by the main
//! loop, so keypress handling never blocks on the network.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use storeview_core::{render, ClientState, Command, TransportEvent, ViewModel};

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Last known connection state and store snapshot
    pub state: ClientState,
    /// Controls painted each frame
    pub view: ViewModel,
    /// Commands queued by interaction handlers, drained by the main loop
    outbox: Vec<Command>,
    /// Static fallback when the configured transport is unsupported
    pub fallback: Option<String>,
}

impl App {
    /// Create an app in the initial connecting state
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: ClientState::new(),
            view: ViewModel::new(),
            outbox: Vec::new(),
            fallback: None,
        }
    }

    /// Create an app that only shows a fallback message
    ///
    /// Used when the configured transport is unsupported: terminal condition,
    /// no connection, no retry.
    pub fn with_fallback(message: String) -> Self {
        let mut app = Self::new();
        app.fallback = Some(message);
        app
    }

    /// Fold one transport event into the state holder
    pub fn apply(&mut self, event: &TransportEvent) {
        self.state.apply(event);
    }

    /// Run the render pass over the view model
    pub fn sync_view(&mut self) {
        render(&self.state, &mut self.view);
    }

    /// Take the queued outbound commands
    pub fn take_outbox(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.fallback.is_some() {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                || is_ctrl_c(&key)
            {
                self.should_quit = true;
            }
            return;
        }

        if self.view.name_field.is_focused() {
            self.handle_edit_key(key);
        } else {
            self.handle_normal_key(key);
        }
    }

    /// Keys while the name field has focus
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            // Enter commits the edit. It removes focus and the unfocus path
            // performs the single send, so Enter cannot double-send.
            KeyCode::Enter | KeyCode::Esc => self.end_edit(),
            KeyCode::Backspace => self.view.name_field.backspace(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(c) => self.view.name_field.insert(c),
            _ => {}
        }
    }

    /// Keys while no control has focus
    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }

            // Toggle recording: send the inverted model value. Local state is
            // not mutated; the server echo flips the control.
            KeyCode::Char('r') => {
                let current = self
                    .state
                    .store()
                    .and_then(|store| store.is_recording())
                    .unwrap_or(false);
                self.outbox.push(Command::SetIsRecording(!current));
            }

            // Focus the name field for editing
            KeyCode::Char('i') | KeyCode::Enter => {
                self.view.name_field.set_focused(true);
            }

            _ => {}
        }
    }

    /// Remove focus from the name field, sending the edited name exactly once
    fn end_edit(&mut self) {
        if !self.view.name_field.is_focused() {
            return;
        }
        self.view.name_field.set_focused(false);
        self.outbox
            .push(Command::SetName(self.view.name_field.value().to_string()));
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
