#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Header probe and full first-frame decode — must never panic
    let _ = hgxcodec::HgxInfo::from_bytes(data);
    let _ = hgxcodec::decode(data, enough::Unstoppable);
});
