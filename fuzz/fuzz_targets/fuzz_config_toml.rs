#![no_main]

use libfuzzer_sys::fuzz_target;
use pullsheet_core::config::SheetConfig;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must parse or fail cleanly; a config that validates
    // must build every component.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SheetConfig::from_toml_str(text) else {
        return;
    };
    if config.validate().is_empty() {
        assert!(config.resolver().is_ok());
        assert!(config.coupling().is_ok());
        assert!(config.arbitration().is_ok());
    }
});
