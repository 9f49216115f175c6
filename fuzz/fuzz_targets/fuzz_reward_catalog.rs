//! Fuzz target for reward catalog parsing.
//!
//! Catalogs that parse must also build their rewards without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rd_core::gridworld::{make_reward, RewardCatalog};

fuzz_target!(|data: &str| {
    if let Ok(catalog) = RewardCatalog::from_json(data) {
        for (_, cfg) in catalog.iter() {
            let _ = make_reward(cfg, 0.9);
        }
    }
});
