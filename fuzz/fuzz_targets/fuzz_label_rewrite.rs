//! Fuzz target for label and path rewriting.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rd_core::transformations::{path_rewrite, pretty_rewrite, split_type_seed};

fuzz_target!(|data: &str| {
    let _ = pretty_rewrite(data);
    let paths: Vec<String> = data.lines().map(str::to_string).collect();
    for path in path_rewrite(&paths) {
        let _ = split_type_seed(&path);
    }
});
