//! Single-slot dialog. Showing a new dialog silently replaces the current
//! one; every exit clears the confirm binding.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalBody {
    /// Text input, optionally pre-filled.
    Prompt { label: String, input: String },
    /// Yes/no question.
    Question(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalRequest<A> {
    pub title: String,
    pub body: ModalBody,
    pub on_confirm: A,
}

/// The binding handed back by [`ModalController::confirm`]; the caller runs
/// it. `input` is the trimmed prompt text for prompt dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed<A> {
    pub action: A,
    pub input: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModalController<A> {
    active: Option<ModalRequest<A>>,
}

impl<A> Default for ModalController<A> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<A> ModalController<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, body: ModalBody, on_confirm: A) {
        self.active = Some(ModalRequest {
            title: title.into(),
            body,
            on_confirm,
        });
    }

    pub fn is_visible(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&ModalRequest<A>> {
        self.active.as_ref()
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self.active.as_mut().map(|request| &mut request.body) {
            Some(ModalBody::Prompt { input, .. }) => Some(input),
            _ => None,
        }
    }

    pub fn confirm(&mut self) -> Option<Confirmed<A>> {
        let request = self.active.take()?;
        let input = match request.body {
            ModalBody::Prompt { input, .. } => Some(input.trim().to_string()),
            ModalBody::Question(_) => None,
        };
        Some(Confirmed {
            action: request.on_confirm,
            input,
        })
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// The explicit close control; same effect as cancel.
    pub fn close(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(input: &str) -> ModalBody {
        ModalBody::Prompt {
            label: "Name".to_string(),
            input: input.to_string(),
        }
    }

    #[test]
    fn second_show_replaces_first_binding() {
        let mut modal = ModalController::new();
        modal.show("first", prompt(""), 1);
        modal.show("second", prompt("x"), 2);

        assert_eq!(modal.current().map(|m| m.title.as_str()), Some("second"));
        let confirmed = modal.confirm().expect("confirmed");
        assert_eq!(confirmed.action, 2);
        assert!(!modal.is_visible());
        assert_eq!(modal.confirm(), None);
    }

    #[test]
    fn confirm_fires_exactly_once() {
        let mut fired = 0;
        let mut modal: ModalController<Box<dyn FnOnce(&mut i32)>> = ModalController::new();
        modal.show("a", prompt(""), Box::new(|count: &mut i32| *count += 10));
        modal.show("b", prompt(""), Box::new(|count: &mut i32| *count += 1));

        if let Some(confirmed) = modal.confirm() {
            (confirmed.action)(&mut fired);
        }
        if let Some(confirmed) = modal.confirm() {
            (confirmed.action)(&mut fired);
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn cancel_and_close_drop_the_binding() {
        let mut modal = ModalController::new();
        modal.show("a", ModalBody::Question("sure?".to_string()), "delete");
        modal.cancel();
        assert!(!modal.is_visible());
        assert_eq!(modal.confirm(), None);

        modal.show("b", ModalBody::Question("sure?".to_string()), "delete");
        modal.close();
        assert_eq!(modal.confirm(), None);
    }

    #[test]
    fn prompt_input_is_editable_and_trimmed_on_confirm() {
        let mut modal = ModalController::new();
        modal.show("rename", prompt("old.txt"), ());
        if let Some(input) = modal.input_mut() {
            input.clear();
            input.push_str("  new.txt ");
        }
        let confirmed = modal.confirm().expect("confirmed");
        assert_eq!(confirmed.input.as_deref(), Some("new.txt"));
    }

    #[test]
    fn question_has_no_input() {
        let mut modal = ModalController::new();
        modal.show("delete", ModalBody::Question("sure?".to_string()), ());
        assert!(modal.input_mut().is_none());
        assert_eq!(modal.confirm().map(|c| c.input), Some(None));
    }
}
