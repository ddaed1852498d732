use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use shared_types::{Participant, MAX_ACTIVITIES};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use runclub_client::{
    default_chain, AdminMode, ClientConfig, Controller, EventCard, NotificationKind, View,
};

#[derive(Parser, Debug)]
#[command(name = "runclub", about = "Sign up for the Saturday run from the terminal")]
struct Cli {
    /// Client config file (defaults to <config dir>/runclub/client.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Page URL; `?admin=<secret>` unlocks admin commands
    #[arg(long)]
    page_url: Option<String>,

    /// Admin secret, same as the `admin` query parameter
    #[arg(long, value_name = "SECRET")]
    admin: Option<String>,

    /// Answer yes to every confirmation
    #[arg(long, short)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the event card and who is coming
    Show,
    /// Register for this Saturday
    Join { name: String },
    /// Admin: add someone else
    Add { name: String },
    /// Admin: remove the participant at a 1-based list position
    Remove { position: usize },
    /// Admin: remove everyone
    Clear,
    /// Admin: write the list to a text file
    Export {
        #[arg(long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },
    /// Admin: push the locally saved list back to the server
    Restore,
    /// Event details
    Event {
        #[command(subcommand)]
        action: EventAction,
    },
}

#[derive(Subcommand, Debug)]
enum EventAction {
    Show,
    /// Admin: change event details; omitted fields keep their current value
    Edit {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        announcement: Option<String>,
        /// Repeat up to four times; replaces the whole activity list
        #[arg(long = "activity")]
        activities: Vec<String>,
    },
    /// Admin: restore the default event details
    Reset,
}

struct TerminalView {
    assume_yes: bool,
}

impl View for TerminalView {
    fn render_participants(&mut self, participants: &[Participant], admin: bool) {
        if participants.is_empty() {
            println!("No one has signed up yet. Be the first!");
            return;
        }
        for (i, p) in participants.iter().enumerate() {
            if admin {
                println!("{:>3}. {}  ({})", i + 1, p.name, p.timestamp.format("%Y-%m-%d %H:%M"));
            } else {
                println!("  - {}", p.name);
            }
        }
    }

    fn render_count(&mut self, count: usize) {
        println!("{} going", count);
    }

    fn render_event(&mut self, card: &EventCard) {
        println!("{}", card.title);
        println!("{}", card.description);
        println!("{} | {}", card.date_label(), card.time);
        if let Some(location) = &card.location {
            println!("{}", location);
        }
        if let Some(announcement) = &card.announcement {
            println!("[!] {}", announcement);
        }
        for activity in &card.activities {
            println!("  * {}", activity);
        }
        println!();
    }

    fn show_admin_controls(&mut self) {
        println!("(admin mode)");
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", message);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&mut self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Error | NotificationKind::Warning => eprintln!("{}", message),
            NotificationKind::Success => println!("{}", message),
        }
    }

    fn show_success(&mut self) {
        println!("You're on the list. See you Saturday!");
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load client config")?;
    let admin = match (&cli.admin, &cli.page_url) {
        (Some(key), _) => AdminMode::from_key(Some(key), &config.admin_secret),
        (None, Some(url)) => AdminMode::from_page_url(url, &config.admin_secret),
        (None, None) => AdminMode::disabled(),
    };

    let (chain, local) = default_chain(&config)?;
    let view = TerminalView {
        assume_yes: cli.yes,
    };
    let mut page = Controller::new(view, chain, local, admin);
    let now = Local::now().naive_local();

    let needs_admin = matches!(
        cli.command,
        Command::Add { .. }
            | Command::Remove { .. }
            | Command::Clear
            | Command::Export { .. }
            | Command::Restore
            | Command::Event {
                action: EventAction::Edit { .. } | EventAction::Reset
            }
    );
    if needs_admin && !page.is_admin() {
        anyhow::bail!("This command needs admin mode (--admin <secret> or --page-url ...?admin=<secret>)");
    }

    match cli.command {
        Command::Show => page.init(now).await,
        Command::Join { name } => {
            page.load_participants().await;
            page.submit(&name).await;
        }
        Command::Add { name } => {
            page.load_participants().await;
            page.quick_add(&name).await;
        }
        Command::Remove { position } => {
            page.load_participants().await;
            match position.checked_sub(1) {
                Some(index) if index < page.participants().len() => {
                    page.remove_participant(index).await;
                }
                _ => anyhow::bail!("No participant at position {}", position),
            }
        }
        Command::Clear => {
            page.load_participants().await;
            page.clear_all().await;
        }
        Command::Export { output } => {
            page.load_participants().await;
            if let Some(file) = page.export_participants(now.date()) {
                let path = output.join(&file.file_name);
                std::fs::write(&path, file.contents)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{}", path.display());
            }
        }
        Command::Restore => {
            page.restore_from_local().await;
        }
        Command::Event { action } => {
            page.load_event_config().await;
            match action {
                EventAction::Show => page.render_event(now),
                EventAction::Edit {
                    title,
                    description,
                    time,
                    location,
                    announcement,
                    activities,
                } => {
                    if activities.len() > MAX_ACTIVITIES {
                        anyhow::bail!("At most {} activities are shown", MAX_ACTIVITIES);
                    }

                    let mut form = page.edit_form();
                    if let Some(title) = title {
                        form.title = title;
                    }
                    if let Some(description) = description {
                        form.description = description;
                    }
                    if let Some(time) = time {
                        form.time = time;
                    }
                    if let Some(location) = location {
                        form.location = location;
                    }
                    if let Some(announcement) = announcement {
                        form.announcement = announcement;
                    }
                    if !activities.is_empty() {
                        form.activities = Default::default();
                        for (slot, activity) in form.activities.iter_mut().zip(activities) {
                            *slot = activity;
                        }
                    }
                    page.save_event_config(form, now).await;
                }
                EventAction::Reset => {
                    page.reset_event_config(now).await;
                }
            }
        }
    }

    Ok(())
}
