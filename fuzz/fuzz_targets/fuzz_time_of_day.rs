//! Fuzz target: `HH:MM` parsing and minute arithmetic
//!
//! cargo fuzz run fuzz_time_of_day

#![no_main]

use libfuzzer_sys::fuzz_target;
use sprinkler::schedule::TimeOfDay;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let minutes = u16::from_le_bytes([data[0], data[1]]);
    let Ok(text) = core::str::from_utf8(&data[2..]) else {
        return;
    };

    if let Some(t) = TimeOfDay::parse(text) {
        assert_eq!(t.to_string(), text);
        let later = t.add_minutes(minutes);
        assert!(later.hour() < 24 && later.minute() < 60);
        let expected = (u32::from(t.total_minutes()) + u32::from(minutes)) % 1440;
        assert_eq!(u32::from(later.total_minutes()), expected);
    }
});
