#![no_main]
use libfuzzer_sys::fuzz_target;
use netpol_matrix::matrix::{compute_visible, CatalogBuild, FilterState, SystemPrefixes};
use netpol_matrix::model::wire::GraphPayload;
use netpol_matrix::model::ResourceType;

/// Decode a `/data` response and build a catalog from it in small chunks.
///
/// Any payload that decodes must build and filter without panicking.
fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<GraphPayload>(data) else {
        return;
    };
    let catalog = CatalogBuild::new(ResourceType::Deployment, payload, 3).finish();
    let filters = FilterState {
        search_text: "a".into(),
        ..FilterState::default()
    };
    let visible = compute_visible(&catalog, &filters, &SystemPrefixes::default());
    assert!(visible.len() <= catalog.len());
    for resource in catalog.iter() {
        let _ = catalog.display_name(&resource.id);
        let _ = resource.namespace();
    }
});
