//! Manifest text builders.

/// Registry dependencies that never match the package filter
pub const UNRELATED: &[(&str, &str)] = &[
    ("com.unity.ugui", "1.0.0"),
    ("com.unity.test-framework", "1.1.33"),
];

/// Build a manifest in the host's JSON layout, one dependency per line.
///
/// `linked` entries become `"<name>": "file:<path>"` lines and are listed
/// after the registry dependencies.
pub fn manifest_json(registry: &[(&str, &str)], linked: &[(&str, &str)]) -> String {
    let mut lines: Vec<String> = registry
        .iter()
        .map(|(name, version)| format!("    \"{name}\": \"{version}\""))
        .collect();
    lines.extend(
        linked
            .iter()
            .map(|(name, path)| format!("    \"{name}\": \"file:{path}\"")),
    );

    let body = lines.join(",\n");
    format!("{{\n  \"dependencies\": {{\n{body}\n  }}\n}}\n")
}
