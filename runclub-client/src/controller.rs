use chrono::{NaiveDate, NaiveDateTime};
use shared_types::{normalize_name, EventConfig, EventConfigPatch, Participant, MAX_ACTIVITIES};
use std::sync::Arc;

use crate::admin::AdminMode;
use crate::export::ExportFile;
use crate::schedule::next_saturday;
use crate::storage::{FallbackChain, LocalBackend, StorageBackend};
use crate::view::{EventCard, NotificationKind, View};

const SUBMIT_FAILED: &str = "Sorry, there was an error submitting your registration. Please try again or contact the organizer directly.";

/// The admin edit form, one text field per config value and a fixed number
/// of activity slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventConfigForm {
    pub title: String,
    pub description: String,
    pub time: String,
    pub location: String,
    pub announcement: String,
    pub activities: [String; MAX_ACTIVITIES],
}

impl EventConfigForm {
    pub fn from_config(config: &EventConfig) -> Self {
        let mut activities: [String; MAX_ACTIVITIES] = Default::default();
        for (slot, activity) in activities.iter_mut().zip(&config.activities) {
            *slot = activity.clone();
        }

        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            time: config.time.clone(),
            location: config.location.clone().unwrap_or_default(),
            announcement: config.announcement.clone().unwrap_or_default(),
            activities,
        }
    }

    /// Blank title, description, time and activities fall back to defaults;
    /// blank location and announcement are cleared.
    pub fn into_config(self) -> EventConfig {
        EventConfig::resolve(EventConfigPatch {
            title: Some(self.title),
            description: Some(self.description),
            time: Some(self.time),
            location: Some(self.location),
            announcement: Some(self.announcement),
            activities: Some(self.activities.into()),
        })
    }
}

/// Application context for one page: owns the view, the storage tiers and
/// the state currently on screen.
pub struct Controller<V: View> {
    view: V,
    chain: FallbackChain,
    local: LocalBackend,
    admin: AdminMode,
    participants: Vec<Participant>,
    event_config: EventConfig,
}

impl<V: View> Controller<V> {
    pub fn new(view: V, chain: FallbackChain, local: LocalBackend, admin: AdminMode) -> Self {
        Self {
            view,
            chain,
            local,
            admin,
            participants: Vec::new(),
            event_config: EventConfig::default(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn event_config(&self) -> &EventConfig {
        &self.event_config
    }

    pub fn is_admin(&self) -> bool {
        self.admin.is_admin()
    }

    fn admin_key(&self) -> Option<String> {
        self.admin.key().map(str::to_string)
    }

    /// Page load: admin controls, event card, then the participant list.
    pub async fn init(&mut self, now: NaiveDateTime) {
        if self.admin.is_admin() {
            self.view.show_admin_controls();
        }
        self.load_event_config().await;
        self.render_event(now);
        self.load_participants().await;
    }

    /// Re-renders list and count. A non-empty list is also copied into local
    /// storage so it survives the API going away.
    async fn render_participants(&mut self) {
        if !self.participants.is_empty() {
            match self.local.store_participants(&self.participants).await {
                Ok(()) => tracing::debug!(
                    "Backed up {} participants locally",
                    self.participants.len()
                ),
                Err(e) => tracing::warn!("Local backup failed: {:#}", e),
            }
        }

        self.view
            .render_participants(&self.participants, self.admin.is_admin());
        self.view.render_count(self.participants.len());
    }

    pub async fn load_participants(&mut self) {
        match self
            .chain
            .run("load participants", |b| b.load_participants())
            .await
        {
            Ok(served) => {
                tracing::info!(
                    "Loaded {} participants from {}",
                    served.value.len(),
                    served.backend
                );
                self.participants = served.value;
            }
            Err(e) => tracing::error!("{}", e),
        }
        self.render_participants().await;
    }

    /// Registration form submit. Returns whether the name was recorded.
    pub async fn submit(&mut self, name: &str) -> bool {
        let Some(name) = normalize_name(name) else {
            self.view.alert("Please enter your name.");
            return false;
        };

        let name = name.to_string();
        let result = self
            .chain
            .run("register", |b| {
                let name = name.clone();
                Box::pin(async move { b.register(&name).await })
            })
            .await;

        match result {
            Ok(served) => {
                tracing::info!("Registered {} via {}", name, served.backend);
                self.participants = served.value;
                self.render_participants().await;
                self.view.show_success();
                true
            }
            Err(e) => {
                tracing::error!("Failed to submit participation: {}", e);
                self.view.alert(SUBMIT_FAILED);
                false
            }
        }
    }

    /// Admin quick-add. Unlike [`Controller::submit`], a name already on the
    /// list is rejected instead of refreshed.
    pub async fn quick_add(&mut self, name: &str) -> bool {
        if !self.admin.is_admin() {
            return false;
        }

        let Some(name) = normalize_name(name) else {
            self.view.notify("Please enter a name.", NotificationKind::Warning);
            return false;
        };

        if self.participants.iter().any(|p| p.matches_name(name)) {
            self.view
                .notify(&format!("{} is already registered.", name), NotificationKind::Warning);
            return false;
        }

        let name = name.to_string();
        let result = self
            .chain
            .run("quick add", |b| {
                let name = name.clone();
                Box::pin(async move { b.register(&name).await })
            })
            .await;

        match result {
            Ok(served) => {
                self.participants = served.value;
                self.render_participants().await;
                self.view
                    .notify(&format!("{} was added.", name), NotificationKind::Success);
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.view
                    .notify(&format!("Could not add {}.", name), NotificationKind::Error);
                false
            }
        }
    }

    pub async fn remove_participant(&mut self, index: usize) -> bool {
        let Some(admin_key) = self.admin_key() else {
            return false;
        };
        let Some(participant) = self.participants.get(index).cloned() else {
            return false;
        };

        if !self
            .view
            .confirm(&format!("Remove {} from the list?", participant.name))
        {
            return false;
        }

        let result = self
            .chain
            .run("remove participant", |b| {
                let participant = participant.clone();
                let admin_key = admin_key.clone();
                Box::pin(async move { b.remove(&participant, &admin_key).await })
            })
            .await;

        match result {
            Ok(served) => {
                self.participants = served.value;
                self.render_participants().await;
                self.view.notify(
                    &format!("{} was removed.", participant.name),
                    NotificationKind::Success,
                );
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.view.notify(
                    &format!("Could not remove {}.", participant.name),
                    NotificationKind::Error,
                );
                false
            }
        }
    }

    pub async fn clear_all(&mut self) -> bool {
        let Some(admin_key) = self.admin_key() else {
            return false;
        };
        if !self.view.confirm("Remove all participants?") {
            return false;
        }

        let result = self
            .chain
            .run("clear participants", |b| {
                let admin_key = admin_key.clone();
                Box::pin(async move { b.clear(&admin_key).await })
            })
            .await;

        match result {
            Ok(served) => {
                self.participants.clear();
                self.render_participants().await;
                if served.backend == LocalBackend::NAME {
                    self.view.notify(
                        "Local participants were removed.",
                        NotificationKind::Warning,
                    );
                } else {
                    self.view
                        .notify("All participants were removed.", NotificationKind::Success);
                }
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                false
            }
        }
    }

    /// Admin recovery: pushes every name held in local storage back to the
    /// primary tier. Returns how many were restored.
    pub async fn restore_from_local(&mut self) -> usize {
        if !self.admin.is_admin() {
            return 0;
        }

        let stored = match self.local.stored_participants().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Failed to read local backup: {:#}", e);
                self.view
                    .notify("Could not read the local backup.", NotificationKind::Error);
                return 0;
            }
        };
        let Some(stored) = stored else {
            self.view
                .notify("No backup data in local storage.", NotificationKind::Warning);
            return 0;
        };
        if stored.is_empty() {
            self.view
                .notify("The local storage backup is empty.", NotificationKind::Warning);
            return 0;
        }

        if !self.view.confirm(&format!(
            "Restore {} participants from local storage?",
            stored.len()
        )) {
            return 0;
        }

        let Some(primary) = self.chain.primary().map(Arc::clone) else {
            return 0;
        };

        let mut restored = 0;
        for participant in &stored {
            match primary.register(&participant.name).await {
                Ok(list) => {
                    self.participants = list;
                    restored += 1;
                }
                Err(e) => tracing::warn!("Failed to restore {}: {:#}", participant.name, e),
            }
        }

        self.render_participants().await;
        self.view.notify(
            &format!("{} participants were restored.", restored),
            NotificationKind::Success,
        );
        tracing::info!("Restored {} of {} participants from local storage", restored, stored.len());
        restored
    }

    /// The current list as a text file, or `None` (with a warning) when empty.
    pub fn export_participants(&mut self, today: NaiveDate) -> Option<ExportFile> {
        match ExportFile::from_participants(&self.participants, today) {
            Some(file) => {
                self.view
                    .notify("Participant list downloaded.", NotificationKind::Success);
                Some(file)
            }
            None => {
                self.view
                    .notify("There are no participants to export.", NotificationKind::Warning);
                None
            }
        }
    }

    pub async fn load_event_config(&mut self) {
        match self
            .chain
            .run("load event config", |b| b.load_event_config())
            .await
        {
            Ok(served) => {
                if let Some(config) = served.value {
                    self.event_config = config;
                    if served.backend != LocalBackend::NAME {
                        if let Err(e) = self.local.store_event_config(&self.event_config).await {
                            tracing::warn!("Failed to cache event config locally: {:#}", e);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to load event config, using defaults: {}", e);
                self.event_config = EventConfig::default();
            }
        }
    }

    pub fn render_event(&mut self, now: NaiveDateTime) {
        let config = &self.event_config;
        let card = EventCard {
            date: next_saturday(now),
            title: config.title.clone(),
            description: config.description.clone(),
            time: config.time.clone(),
            location: config.location.clone(),
            announcement: config.announcement.clone(),
            activities: config
                .activities
                .iter()
                .filter(|a| !a.trim().is_empty())
                .cloned()
                .collect(),
        };
        self.view.render_event(&card);
    }

    /// The edit form pre-filled from the current configuration.
    pub fn edit_form(&self) -> EventConfigForm {
        EventConfigForm::from_config(&self.event_config)
    }

    async fn persist_event_config(&mut self, config: EventConfig, admin_key: String) -> EventConfig {
        let result = self
            .chain
            .run("save event config", |b| {
                let config = config.clone();
                let admin_key = admin_key.clone();
                Box::pin(async move { b.save_event_config(&config, &admin_key).await })
            })
            .await;

        let saved = match result {
            Ok(served) => served.value,
            Err(e) => {
                tracing::error!("{}", e);
                config
            }
        };

        if let Err(e) = self.local.store_event_config(&saved).await {
            tracing::warn!("Failed to cache event config locally: {:#}", e);
        }
        saved
    }

    pub async fn save_event_config(&mut self, form: EventConfigForm, now: NaiveDateTime) -> bool {
        let Some(admin_key) = self.admin_key() else {
            return false;
        };

        self.event_config = self.persist_event_config(form.into_config(), admin_key).await;
        self.render_event(now);
        self.view
            .notify("Event details updated!", NotificationKind::Success);
        true
    }

    pub async fn reset_event_config(&mut self, now: NaiveDateTime) -> bool {
        let Some(admin_key) = self.admin_key() else {
            return false;
        };
        if !self.view.confirm("Reset the event details to the defaults?") {
            return false;
        }

        self.event_config = self
            .persist_event_config(EventConfig::default(), admin_key)
            .await;
        self.render_event(now);
        self.view
            .notify("Event details were reset.", NotificationKind::Success);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::UnreachableBackend;
    use crate::storage::LocalStorage;
    use crate::view::tests::RecordingView;
    use chrono::{NaiveDate, Utc};

    const SECRET: &str = "runclub2024";

    fn saturday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 24)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn local_in(dir: &tempfile::TempDir) -> LocalBackend {
        LocalBackend::new(Arc::new(LocalStorage::new(
            dir.path().join("local-storage.json"),
        )))
    }

    /// API unreachable, local storage as the only working tier.
    fn offline(dir: &tempfile::TempDir, view: RecordingView, admin: AdminMode) -> Controller<RecordingView> {
        let local = local_in(dir);
        let chain = FallbackChain::new(vec![
            Arc::new(UnreachableBackend::default()),
            Arc::new(local.clone()),
        ]);
        Controller::new(view, chain, local, admin)
    }

    fn admin() -> AdminMode {
        AdminMode::from_key(Some(SECRET), SECRET)
    }

    #[tokio::test]
    async fn test_offline_registration_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), AdminMode::disabled());
        page.init(saturday_morning()).await;

        assert!(page.submit("Mina").await);
        assert_eq!(page.view().rendered, vec!["Mina"]);
        assert_eq!(page.view().count, Some(1));
        assert_eq!(page.view().successes, 1);
        assert!(page.view().alerts.is_empty());

        let mut reloaded = offline(&dir, RecordingView::default(), AdminMode::disabled());
        reloaded.init(saturday_morning()).await;
        assert_eq!(reloaded.view().rendered, vec!["Mina"]);
    }

    #[tokio::test]
    async fn test_blank_submit_alerts_and_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), AdminMode::disabled());

        assert!(!page.submit("   ").await);

        assert_eq!(page.view().alerts, vec!["Please enter your name."]);
        assert!(page.participants().is_empty());
        assert_eq!(local_in(&dir).stored_participants().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_submit_refreshes_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), AdminMode::disabled());

        page.submit("Mina").await;
        let first = page.participants()[0].timestamp;
        page.submit("mina").await;

        assert_eq!(page.participants().len(), 1);
        assert!(page.participants()[0].timestamp >= first);
    }

    #[tokio::test]
    async fn test_submit_with_no_working_tier_shows_generic_alert() {
        let dir = tempfile::tempdir().unwrap();
        let chain = FallbackChain::new(vec![Arc::new(UnreachableBackend::default())]);
        let mut page = Controller::new(RecordingView::default(), chain, local_in(&dir), AdminMode::disabled());

        assert!(!page.submit("Mina").await);
        assert_eq!(page.view().alerts, vec![SUBMIT_FAILED]);
    }

    #[tokio::test]
    async fn test_admin_actions_require_admin_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::confirming(), AdminMode::disabled());
        page.submit("Mina").await;

        assert!(!page.clear_all().await);
        assert!(!page.remove_participant(0).await);
        assert!(!page.quick_add("Hana").await);
        assert!(page.view().confirms.is_empty());
        assert_eq!(page.participants().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), admin());
        page.submit("Mina").await;

        assert!(!page.clear_all().await);
        assert_eq!(page.participants().len(), 1);

        page.view_mut().confirm_answer = true;
        assert!(page.clear_all().await);
        assert!(page.participants().is_empty());
        assert_eq!(page.view().count, Some(0));
        assert_eq!(
            page.view().notifications.last().unwrap(),
            &("Local participants were removed.".to_string(), NotificationKind::Warning)
        );
        assert_eq!(local_in(&dir).stored_participants().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_participant_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::confirming(), admin());
        page.submit("Mina").await;
        page.submit("Jisoo").await;

        assert!(!page.remove_participant(5).await);
        assert!(page.remove_participant(0).await);

        assert_eq!(page.view().rendered, vec!["Jisoo"]);
        assert_eq!(page.view().confirms, vec!["Remove Mina from the list?"]);
    }

    #[tokio::test]
    async fn test_quick_add_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), admin());
        page.submit("Mina").await;

        assert!(!page.quick_add(" MINA ").await);
        assert!(page.quick_add("Hana").await);
        assert!(!page.quick_add("").await);

        assert_eq!(page.view().rendered, vec!["Mina", "Hana"]);
        let kinds: Vec<_> = page.view().notifications.iter().map(|(_, k)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Warning,
                NotificationKind::Success,
                NotificationKind::Warning
            ]
        );
    }

    #[tokio::test]
    async fn test_export_in_registration_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), admin());
        let today = Utc::now().date_naive();

        assert!(page.export_participants(today).is_none());

        for name in ["Mina", "Jisoo", "Hana"] {
            page.submit(name).await;
        }
        let file = page.export_participants(today).unwrap();

        assert_eq!(file.contents, "Mina\nJisoo\nHana");
        assert!(file.file_name.starts_with("saturday-run-participants-"));
    }

    #[tokio::test]
    async fn test_restore_pushes_local_names_to_primary() {
        let dir = tempfile::tempdir().unwrap();
        let local = local_in(&dir);
        local
            .store_participants(&[
                Participant::new("Mina", Utc::now()),
                Participant::new("Jisoo", Utc::now()),
            ])
            .await
            .unwrap();

        let remote_dir = tempfile::tempdir().unwrap();
        let remote = local_in(&remote_dir);
        let chain = FallbackChain::new(vec![Arc::new(remote.clone()), Arc::new(local.clone())]);
        let mut page = Controller::new(RecordingView::confirming(), chain, local, admin());

        assert_eq!(page.restore_from_local().await, 2);
        assert_eq!(remote.stored_participants().await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_without_backup_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::confirming(), admin());

        assert_eq!(page.restore_from_local().await, 0);
        assert_eq!(
            page.view().notifications,
            vec![("No backup data in local storage.".to_string(), NotificationKind::Warning)]
        );
    }

    #[tokio::test]
    async fn test_event_card_and_admin_controls_on_init() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), admin());
        page.init(saturday_morning()).await;

        let card = page.view().card.clone().unwrap();
        assert!(page.view().admin_controls);
        assert_eq!(card.date, NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());
        assert_eq!(card.title, EventConfig::default().title);
        assert_eq!(card.activities.len(), 4);
    }

    #[tokio::test]
    async fn test_save_event_config_merges_form_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::default(), admin());

        let mut form = page.edit_form();
        assert_eq!(form.activities[3], EventConfig::default().activities[3]);
        form.title = "  ".to_string();
        form.location = String::new();
        form.announcement = "New route this week".to_string();
        form.activities = [
            "Run".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ];

        assert!(page.save_event_config(form, saturday_morning()).await);

        let config = page.event_config().clone();
        assert_eq!(config.title, EventConfig::default().title);
        assert_eq!(config.location, None);
        assert_eq!(config.announcement.as_deref(), Some("New route this week"));
        assert_eq!(config.activities, vec!["Run"]);

        let mut reloaded = offline(&dir, RecordingView::default(), AdminMode::disabled());
        reloaded.init(saturday_morning()).await;
        assert_eq!(reloaded.event_config(), &config);
        assert_eq!(
            reloaded.view().card.as_ref().unwrap().announcement.as_deref(),
            Some("New route this week")
        );
    }

    #[tokio::test]
    async fn test_reset_event_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = offline(&dir, RecordingView::confirming(), admin());
        let mut form = page.edit_form();
        form.title = "Night Run".to_string();
        page.save_event_config(form, saturday_morning()).await;

        assert!(page.reset_event_config(saturday_morning()).await);
        assert_eq!(page.event_config(), &EventConfig::default());
    }
}
