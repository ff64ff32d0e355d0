#![no_main]

use fishing_game::input::DebugCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        for ch in text.chars() {
            if let Ok(DebugCommand::Catch(target)) = DebugCommand::parse(ch, 5) {
                assert!((1..=5).contains(&target.number()));
            }
        }
    }
});
