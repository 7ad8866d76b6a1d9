#![no_main]

use flow_guard::{fill_requirements, ModelSpec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(spec) = ModelSpec::from_yaml(s) {
            if let Ok(mut graph) = spec.build() {
                graph.expand_requirements();
                let _ = fill_requirements(&graph);
            }
        }
    }
});
