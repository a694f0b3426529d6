#![no_main]
use libfuzzer_sys::fuzz_target;
use ayurchain_ledger::{Block, Chain, Payload};

fuzz_target!(|data: &[u8]| {
    let Ok(blocks) = serde_json::from_slice::<Vec<Block>>(data) else {
        return;
    };
    let Ok(mut chain) = Chain::from_blocks(blocks) else {
        return;
    };

    // The boolean, the first index and the full audit must agree
    let violations = chain.audit();
    assert_eq!(chain.validate(), violations.is_empty());
    assert_eq!(chain.first_invalid(), violations.first().map(|v| v.position()));

    // Appending never repairs or hides an earlier violation
    let before = chain.first_invalid();
    chain.append(Payload::new().with("fuzz", data.len()));
    if before.is_some() {
        assert_eq!(chain.first_invalid(), before);
    }
});
