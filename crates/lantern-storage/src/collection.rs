//! Collection naming rule.
//!
//! The adapter owns how resource names map onto collections: lower-cased and
//! pluralized with a plain `s` (`Goal` -> `goals`, `ProcessRequest` ->
//! `processrequests`). Names already ending in `s` are left as-is.

pub fn collection_name(resource_name: &str) -> String {
    let lowered = resource_name.to_ascii_lowercase();
    if lowered.ends_with('s') {
        lowered
    } else {
        format!("{lowered}s")
    }
}
