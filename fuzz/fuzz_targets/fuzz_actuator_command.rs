#![no_main]

use fishing_game::actuator::ActuatorCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Every decoded command must re-encode to a payload that decodes to itself.
    if let Ok(command) = ActuatorCommand::parse(data, 9) {
        let payload = command.to_payload();
        assert_eq!(ActuatorCommand::parse(&payload, 9), Ok(command));
    }
});
