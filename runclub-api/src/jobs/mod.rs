pub mod backup_mirror;

pub use backup_mirror::{seed_from_backup, BackupFailure, BackupMirror, BackupSink};
