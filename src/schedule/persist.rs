//! Program persistence document.
//!
//! The three programs are stored as a single JSON document:
//!
//! ```json
//! {"version":1,"programs":[
//!   {"start":"06:00","enabled":true,"durations":[10,0,5,0,0,0,0,0],
//!    "days":[true,false,true,false,true,false,false]},
//!   ...
//! ]}
//! ```
//!
//! Loading never fails.  A missing or malformed document yields three
//! disabled, empty programs; a missing field inside an otherwise valid
//! document takes `false` / `0` / `""`; a start string that is not
//! `HH:MM` loads as "no start time".  Saving always writes the whole
//! document.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::program::{DayMask, PROGRAM_COUNT, Program, ProgramSet, ProgramSlot};
use super::time::TimeOfDay;
use super::weekday::DAYS_PER_WEEK;
use crate::app::ports::{StorageError, StoragePort};
use crate::error::{Error, Result};
use crate::zone::MAX_ZONES;

/// Storage namespace holding the program document.
pub const PROGRAM_NAMESPACE: &str = "sprinkler_prog";
/// Storage key holding the program document.
pub const PROGRAM_KEY: &str = "programs";
/// Current document schema version.
pub const DOCUMENT_VERSION: u32 = 1;
/// Upper bound on the serialised document size.
pub const MAX_DOCUMENT_BYTES: usize = 2048;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgramDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    programs: Vec<ProgramRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgramRecord {
    #[serde(default)]
    start: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    durations: Vec<u16>,
    #[serde(default)]
    days: Vec<bool>,
}

impl From<&Program> for ProgramRecord {
    fn from(p: &Program) -> Self {
        Self {
            start: p.start_time.map(|t| t.to_string()).unwrap_or_default(),
            enabled: p.enabled,
            durations: p.durations.to_vec(),
            days: p.days.to_bools().to_vec(),
        }
    }
}

impl From<&ProgramRecord> for Program {
    fn from(r: &ProgramRecord) -> Self {
        let mut durations = [0u16; MAX_ZONES];
        for (slot, &d) in durations.iter_mut().zip(&r.durations) {
            *slot = d;
        }
        let days = &r.days[..r.days.len().min(DAYS_PER_WEEK)];
        Self {
            start_time: TimeOfDay::parse(&r.start),
            enabled: r.enabled,
            days: DayMask::from_bools(days),
            durations,
        }
    }
}

/// Serialise all three programs.
pub fn save(programs: &ProgramSet) -> Result<String> {
    let doc = ProgramDocument {
        version: DOCUMENT_VERSION,
        programs: programs.iter().map(|(_, p)| ProgramRecord::from(p)).collect(),
    };
    serde_json::to_string(&doc).map_err(|_| Error::Document("program encode failed"))
}

/// Deserialise a program document, falling back to defaults.
pub fn load(json: &str) -> ProgramSet {
    if json.trim().is_empty() {
        info!("Programs: no stored document, starting empty");
        return ProgramSet::default();
    }
    let doc: ProgramDocument = match serde_json::from_str(json) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Programs: stored document unreadable ({}), starting empty", e);
            return ProgramSet::default();
        }
    };
    if doc.version != DOCUMENT_VERSION {
        warn!(
            "Programs: document version {} (expected {}), loading best-effort",
            doc.version, DOCUMENT_VERSION
        );
    }

    let mut set = ProgramSet::default();
    for (slot, record) in ProgramSlot::ALL.into_iter().zip(&doc.programs) {
        *set.get_mut(slot) = Program::from(record);
    }
    if doc.programs.len() != PROGRAM_COUNT {
        warn!(
            "Programs: document holds {} programs, expected {}",
            doc.programs.len(),
            PROGRAM_COUNT
        );
    }
    set
}

/// Read the program document from `store`.  Never fails.
pub fn load_from(store: &impl StoragePort) -> ProgramSet {
    let mut buf = vec![0u8; MAX_DOCUMENT_BYTES];
    match store.read(PROGRAM_NAMESPACE, PROGRAM_KEY, &mut buf) {
        Ok(n) => match core::str::from_utf8(&buf[..n]) {
            Ok(json) => load(json),
            Err(_) => {
                warn!("Programs: stored document is not UTF-8, starting empty");
                ProgramSet::default()
            }
        },
        Err(StorageError::NotFound) => load(""),
        Err(e) => {
            warn!("Programs: read failed ({}), starting empty", e);
            ProgramSet::default()
        }
    }
}

/// Write the whole program document to `store`.
pub fn save_to(store: &mut impl StoragePort, programs: &ProgramSet) -> Result<()> {
    let json = save(programs)?;
    if json.len() > MAX_DOCUMENT_BYTES {
        return Err(Error::Document("program document too large"));
    }
    store.write(PROGRAM_NAMESPACE, PROGRAM_KEY, json.as_bytes())?;
    info!("Programs: saved ({} bytes)", json.len());
    Ok(())
}
