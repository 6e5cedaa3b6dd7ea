#![no_main]
use libfuzzer_sys::fuzz_target;
use netpol_matrix::matrix::detail;
use netpol_matrix::model::{AnalysisResult, PairKey, ResourceCatalog, ResourceType};

/// Decode a `/check-communication` response and render its detail pane.
fuzz_target!(|data: &[u8]| {
    let Ok(result) = serde_json::from_slice::<AnalysisResult>(data) else {
        return;
    };
    let _ = result.verdict();
    let _ = result.port_summary();
    let key = PairKey::new("default/a", "default/b", ResourceType::Pod);
    let catalog = ResourceCatalog::empty(ResourceType::Pod);
    let view = detail::render(&catalog, &key, Ok(&result));
    let _ = view.to_plain_text();
});
