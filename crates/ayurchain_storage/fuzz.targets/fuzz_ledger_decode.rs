#![no_main]
use libfuzzer_sys::fuzz_target;
use ayurchain_storage::{decode, encode};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail, never panic
    if let Ok(chain) = decode(data) {
        let encoded = encode(&chain).unwrap();
        let again = decode(&encoded).unwrap();
        assert_eq!(chain.export(), again.export());
        assert_eq!(chain.validate(), again.validate());
    }
});
