//! PIN gate in front of the daily note.

use std::fmt;

use crate::models::DailyNote;

/// Result of submitting a PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Unlocked,
    Rejected,
    /// No PIN is configured, so there is nothing to unlock
    NotRequired,
}

/// Session-local unlock state. Never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LockGate {
    unlocked: bool,
    /// Lock flag of the last note snapshot, `None` before the first one
    last_locked: Option<bool>,
    pin_input: String,
    prompt_open: bool,
}

impl fmt::Debug for LockGate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LockGate")
            .field("unlocked", &self.unlocked)
            .field("last_locked", &self.last_locked)
            .field("pin_input", &"[REDACTED]")
            .field("prompt_open", &self.prompt_open)
            .finish()
    }
}

impl LockGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the unlock state from a fresh note snapshot.
    ///
    /// An unlocked note unlocks the session. A locked note keeps an existing
    /// unlock only while it stays locked; a flip from unlocked to locked (or a
    /// first snapshot that is already locked) requires the PIN again.
    pub fn observe_note(&mut self, note: &DailyNote) {
        if !note.is_locked {
            self.unlocked = true;
        } else if self.last_locked != Some(true) {
            self.unlocked = false;
        }
        self.last_locked = Some(note.is_locked);
    }

    /// The configured PIN changed; only an unlocked note stays readable.
    pub fn pin_changed(&mut self, note: &DailyNote) {
        tracing::debug!("Note PIN changed; re-evaluating lock");
        self.unlocked = !note.is_locked;
        self.pin_input.clear();
    }

    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether the note content may be shown.
    #[must_use]
    pub fn is_content_visible(&self, note: &DailyNote, pin: Option<&str>) -> bool {
        pin.is_none() || !note.is_locked || self.unlocked
    }

    /// Compare the pending input against `pin`. Clears the input either way.
    pub fn submit_pin(&mut self, pin: Option<&str>) -> PinOutcome {
        let input = std::mem::take(&mut self.pin_input);
        let Some(pin) = pin else {
            self.prompt_open = false;
            return PinOutcome::NotRequired;
        };

        if input == pin {
            self.unlocked = true;
            self.prompt_open = false;
            PinOutcome::Unlocked
        } else {
            tracing::debug!("Rejected note PIN");
            PinOutcome::Rejected
        }
    }

    pub fn set_pin_input(&mut self, input: impl Into<String>) {
        self.pin_input = input.into();
    }

    #[must_use]
    pub fn pin_input(&self) -> &str {
        &self.pin_input
    }

    pub fn open_prompt(&mut self) {
        self.prompt_open = true;
    }

    pub fn close_prompt(&mut self) {
        self.prompt_open = false;
        self.pin_input.clear();
    }

    #[must_use]
    pub const fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }

    /// Forget everything, e.g. when the identity changes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(is_locked: bool) -> DailyNote {
        DailyNote {
            content: "secret plans".to_string(),
            is_locked,
        }
    }

    #[test]
    fn locked_note_needs_matching_pin() {
        let mut gate = LockGate::new();
        gate.observe_note(&note(true));
        assert!(!gate.is_content_visible(&note(true), Some("1234")));

        gate.open_prompt();
        gate.set_pin_input("9999");
        assert_eq!(gate.submit_pin(Some("1234")), PinOutcome::Rejected);
        assert!(!gate.is_content_visible(&note(true), Some("1234")));
        assert!(gate.is_prompt_open());
        assert_eq!(gate.pin_input(), "");

        gate.set_pin_input("1234");
        assert_eq!(gate.submit_pin(Some("1234")), PinOutcome::Unlocked);
        assert!(gate.is_content_visible(&note(true), Some("1234")));
        assert!(!gate.is_prompt_open());
    }

    #[test]
    fn unlock_survives_locked_snapshots_but_not_a_relock() {
        let mut gate = LockGate::new();
        gate.observe_note(&note(true));
        gate.set_pin_input("1234");
        gate.submit_pin(Some("1234"));

        gate.observe_note(&note(true));
        assert!(gate.is_unlocked());

        gate.observe_note(&note(false));
        assert!(gate.is_unlocked());
        gate.observe_note(&note(true));
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn pin_change_relocks_locked_note() {
        let mut gate = LockGate::new();
        gate.observe_note(&note(true));
        gate.set_pin_input("1234");
        gate.submit_pin(Some("1234"));

        gate.pin_changed(&note(true));
        assert!(!gate.is_content_visible(&note(true), Some("4321")));
    }

    #[test]
    fn no_pin_means_always_visible() {
        let mut gate = LockGate::new();
        gate.observe_note(&note(true));
        assert!(gate.is_content_visible(&note(true), None));
        assert_eq!(gate.submit_pin(None), PinOutcome::NotRequired);
    }

    #[test]
    fn pin_comparison_is_exact() {
        let mut gate = LockGate::new();
        gate.observe_note(&note(true));
        gate.set_pin_input(" 1234");
        assert_eq!(gate.submit_pin(Some("1234")), PinOutcome::Rejected);
    }

    #[test]
    fn debug_hides_pin_input() {
        let mut gate = LockGate::new();
        gate.set_pin_input("1234");
        assert!(!format!("{gate:?}").contains("1234"));
    }
}
