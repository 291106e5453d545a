use serde::Serialize;

pub const BUILDING_LABEL_TOAST_TICKS: u32 = 180;
pub const ENTER_TOAST_TICKS: u32 = 150;
pub const EXIT_TOAST_TICKS: u32 = 120;
pub const POINT_OF_INTEREST_TOAST_TICKS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueBox {
    pub title: String,
    pub body: String,
}

/// Short-lived notice that counts down once per frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub remaining_ticks: u32,
}

impl Toast {
    pub fn new(message: impl Into<String>, ticks: u32) -> Self {
        Self {
            message: message.into(),
            remaining_ticks: ticks,
        }
    }

    /// Returns false once the toast has expired.
    pub fn tick(&mut self) -> bool {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        self.remaining_ticks > 0
    }
}

/// Dialogue box plus toast slot; both are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notices {
    dialogue: Option<DialogueBox>,
    toast: Option<Toast>,
}

impl Notices {
    pub fn dialogue(&self) -> Option<&DialogueBox> {
        self.dialogue.as_ref()
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn is_dialogue_open(&self) -> bool {
        self.dialogue.is_some()
    }

    pub fn open_dialogue(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.dialogue = Some(DialogueBox {
            title: title.into(),
            body: body.into(),
        });
    }

    pub fn close_dialogue(&mut self) -> bool {
        self.dialogue.take().is_some()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, ticks: u32) {
        self.toast = Some(Toast::new(message, ticks));
    }

    pub fn tick(&mut self) {
        if let Some(toast) = &mut self.toast {
            if !toast.tick() {
                self.toast = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_expires_after_its_duration() {
        let mut notices = Notices::default();
        notices.show_toast("hola", 3);

        notices.tick();
        notices.tick();
        assert_eq!(notices.toast().map(|t| t.remaining_ticks), Some(1));
        notices.tick();
        assert!(notices.toast().is_none());
    }

    #[test]
    fn new_toast_replaces_old_one() {
        let mut notices = Notices::default();
        notices.show_toast("first", EXIT_TOAST_TICKS);
        notices.show_toast("second", ENTER_TOAST_TICKS);
        let toast = notices.toast().expect("toast");
        assert_eq!(toast.message, "second");
        assert_eq!(toast.remaining_ticks, ENTER_TOAST_TICKS);
    }

    #[test]
    fn close_reports_whether_a_box_was_open() {
        let mut notices = Notices::default();
        assert!(!notices.close_dialogue());
        notices.open_dialogue("DON ROBERTO", "...");
        assert!(notices.is_dialogue_open());
        assert!(notices.close_dialogue());
        assert!(!notices.is_dialogue_open());
    }
}
