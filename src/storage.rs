// Manages local file storage for events.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the Event serialization format require incrementing
// EVENTS_FILE_VERSION below.
use crate::model::Event;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

// Version history:
// - v1: {version, events: [{name, date, start_time, end_time}]}
const EVENTS_FILE_VERSION: u32 = 1;

/// Wrapper struct for the versioned events file
#[derive(Serialize, Deserialize)]
struct EventsFile {
    #[serde(default)]
    version: u32,
    events: Vec<Event>,
}

/// How the initial snapshot was obtained at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    File,
    Sample,
    Empty,
    /// The file could not be read; it was moved aside and the store starts empty.
    Recovered,
}

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on a sidecar `.lock` file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads the events file. `Ok(None)` when it does not exist.
    ///
    /// A file holding identity duplicates is rejected like any other corrupt file.
    pub fn load(path: &Path) -> Result<Option<Vec<Event>>> {
        if !path.exists() {
            return Ok(None);
        }

        let events = Self::with_lock(path, || {
            let json = fs::read_to_string(path)?;

            // Versioned format first, then a bare array from hand-written files.
            if let Ok(data) = serde_json::from_str::<EventsFile>(&json) {
                if data.version > EVENTS_FILE_VERSION {
                    anyhow::bail!(
                        "Events file '{}' has version {}, newer than supported {}",
                        path.display(),
                        data.version,
                        EVENTS_FILE_VERSION
                    );
                }
                return Ok(data.events);
            }
            let events: Vec<Event> = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse events file '{}'", path.display()))?;
            Ok(events)
        })?;

        let mut seen = HashSet::with_capacity(events.len());
        if let Some(dup) = events.iter().find(|e| !seen.insert(*e)) {
            anyhow::bail!(
                "Events file '{}' contains a duplicate event: {}",
                path.display(),
                dup
            );
        }

        Ok(Some(events))
    }

    pub fn save(path: &Path, events: &[Event]) -> Result<()> {
        Self::with_lock(path, || {
            let data = EventsFile {
                version: EVENTS_FILE_VERSION,
                events: events.to_vec(),
            };
            let json = serde_json::to_string_pretty(&data)?;
            Self::atomic_write(path, json)?;
            Ok(())
        })
    }

    /// Startup policy: the file if readable, sample data if missing (when
    /// `seed_sample` is set), otherwise empty.
    ///
    /// An unreadable file is renamed to `*.corrupt` before starting empty so
    /// the next save cannot overwrite whatever it still contains.
    pub fn load_initial(path: &Path, seed_sample: bool) -> (Vec<Event>, LoadSource) {
        match Self::load(path) {
            Ok(Some(events)) => {
                log::info!("Loaded {} event(s) from {}", events.len(), path.display());
                (events, LoadSource::File)
            }
            Ok(None) if seed_sample => {
                log::info!("Data file not found. Starting with sample events");
                (sample_events(), LoadSource::Sample)
            }
            Ok(None) => {
                log::info!("Data file not found. Starting with an empty scheduler");
                (Vec::new(), LoadSource::Empty)
            }
            Err(e) => {
                log::warn!(
                    "Data file not in the correct format ({}). Starting with an empty scheduler",
                    e
                );
                let backup = path.with_extension("json.corrupt");
                if let Err(mv) = fs::rename(path, &backup) {
                    log::error!("Could not move {} aside: {}", path.display(), mv);
                }
                (Vec::new(), LoadSource::Recovered)
            }
        }
    }
}

/// Seed used on first start. Valid, distinct and non-overlapping.
pub fn sample_events() -> Vec<Event> {
    let ev = |name: &str, (y, m, d): (i32, u32, u32), start: (u32, u32), end: (u32, u32)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .zip(NaiveTime::from_hms_opt(start.0, start.1, 0))
            .zip(NaiveTime::from_hms_opt(end.0, end.1, 0))
            .map(|((date, s), e)| Event::new(name, date, s, e))
    };

    [
        ev("Tennis", (2023, 12, 20), (18, 0), (20, 0)),
        ev("Project Meeting", (2023, 12, 21), (9, 0), (10, 30)),
        ev("Dentist", (2023, 12, 21), (14, 0), (14, 45)),
        ev("Dinner with family", (2023, 12, 24), (19, 0), (22, 0)),
        ev("Gym", (2024, 1, 2), (7, 0), (8, 0)),
    ]
    .into_iter()
    .flatten()
    .collect()
}
