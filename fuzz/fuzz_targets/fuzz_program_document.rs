//! Fuzz target: stored program document
//!
//! Feeds arbitrary bytes to the program loader and checks:
//! - No panics on malformed or truncated JSON
//! - Whatever loads re-serialises and loads back to the same set
//! - Calculated windows for any day stay inside the zone table
//!
//! cargo fuzz run fuzz_program_document

#![no_main]

use libfuzzer_sys::fuzz_target;
use sprinkler::schedule::{Weekday, persist, recompute};
use sprinkler::zone::{MAX_ZONES, ZoneTable};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = core::str::from_utf8(data) else {
        return;
    };

    let programs = persist::load(json);

    let saved = persist::save(&programs).expect("a loaded set always serialises");
    assert_eq!(persist::load(&saved), programs);

    let mut zones = ZoneTable::new(MAX_ZONES);
    for day in Weekday::ALL {
        let windows = recompute(&mut zones, &programs, day);
        assert!(windows <= MAX_ZONES * 3);
    }
});
