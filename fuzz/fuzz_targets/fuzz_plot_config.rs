//! Fuzz target for plot configuration parsing.
//!
//! Parsing and validating arbitrary JSON must return errors, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rd_config::{validate_plot_config, PlotConfig};

fuzz_target!(|data: &str| {
    if let Ok(config) = PlotConfig::parse_json(data) {
        let _ = validate_plot_config(&config);
    }
});
