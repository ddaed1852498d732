use chrono::NaiveDate;
use shared_types::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

/// Everything shown on the event card and hero section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub time: String,
    pub location: Option<String>,
    pub announcement: Option<String>,
    pub activities: Vec<String>,
}

impl EventCard {
    /// e.g. "Saturday, October 24, 2026"
    pub fn date_label(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }
}

/// What the controller needs from a page. Every method has a no-op default so
/// a view only implements the parts it actually has; a view that cannot ask
/// for confirmation declines every destructive action.
pub trait View {
    fn render_participants(&mut self, _participants: &[Participant], _admin: bool) {}

    fn render_count(&mut self, _count: usize) {}

    fn render_event(&mut self, _card: &EventCard) {}

    fn show_admin_controls(&mut self) {}

    /// Blocking message that interrupts the user.
    fn alert(&mut self, _message: &str) {}

    fn confirm(&mut self, _message: &str) -> bool {
        false
    }

    /// Transient, non-blocking message.
    fn notify(&mut self, _message: &str, _kind: NotificationKind) {}

    fn show_success(&mut self) {}
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every call; confirmations return `confirm_answer`.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingView {
        pub confirm_answer: bool,
        pub rendered: Vec<String>,
        pub count: Option<usize>,
        pub card: Option<EventCard>,
        pub admin_controls: bool,
        pub alerts: Vec<String>,
        pub confirms: Vec<String>,
        pub notifications: Vec<(String, NotificationKind)>,
        pub successes: usize,
    }

    impl RecordingView {
        pub(crate) fn confirming() -> Self {
            Self {
                confirm_answer: true,
                ..Default::default()
            }
        }
    }

    impl View for RecordingView {
        fn render_participants(&mut self, participants: &[Participant], _admin: bool) {
            self.rendered = participants.iter().map(|p| p.name.clone()).collect();
        }

        fn render_count(&mut self, count: usize) {
            self.count = Some(count);
        }

        fn render_event(&mut self, card: &EventCard) {
            self.card = Some(card.clone());
        }

        fn show_admin_controls(&mut self) {
            self.admin_controls = true;
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.confirm_answer
        }

        fn notify(&mut self, message: &str, kind: NotificationKind) {
            self.notifications.push((message.to_string(), kind));
        }

        fn show_success(&mut self) {
            self.successes += 1;
        }
    }

    #[test]
    fn test_date_label() {
        let card = EventCard {
            date: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            title: String::new(),
            description: String::new(),
            time: String::new(),
            location: None,
            announcement: None,
            activities: Vec::new(),
        };
        assert_eq!(card.date_label(), "Saturday, October 24, 2026");
    }

    #[test]
    fn test_default_view_declines_confirmation() {
        struct Bare;
        impl View for Bare {}

        assert!(!Bare.confirm("Delete everything?"));
    }
}
