use chrono::NaiveDate;
use shared_types::Participant;

/// A downloadable plain-text list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    /// One name per line, in list order. `None` when there is nothing to export.
    pub fn from_participants(participants: &[Participant], today: NaiveDate) -> Option<Self> {
        if participants.is_empty() {
            return None;
        }

        let contents = participants
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Some(Self {
            file_name: format!("saturday-run-participants-{}.txt", today.format("%Y-%m-%d")),
            contents,
        })
    }
}
