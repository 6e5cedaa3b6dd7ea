#![no_main]
use libfuzzer_sys::fuzz_target;
use netpol_matrix::client::{PushUpdate, SseDecoder};

/// Feed arbitrary text through the event-stream decoder line by line.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut decoder = SseDecoder::new();
    for line in text.split('\n') {
        if let Some(event) = decoder.push_line(line) {
            let _ = PushUpdate::from_event(&event);
        }
    }
    if let Some(event) = decoder.push_line("") {
        let _ = PushUpdate::from_event(&event);
    }
});
