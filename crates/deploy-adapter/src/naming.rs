//! Resource naming.

use regex::Regex;
use std::sync::LazyLock;

static ILLEGAL_NAME_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid name pattern"));

/// Normalize a free-form service name into a Kubernetes resource name.
///
/// Every maximal run of characters outside `[A-Za-z0-9]` becomes a single
/// `-` and the result is lower-cased. The mapping is deterministic, so the
/// same name always resolves to the same workload on lookup and delete.
pub fn sanitize_service_name(name: &str) -> String {
    ILLEGAL_NAME_CHARACTERS
        .replace_all(name, "-")
        .to_lowercase()
}
