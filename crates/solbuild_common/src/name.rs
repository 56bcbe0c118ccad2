//! Naming helpers for compilation units and reference paths.

/// Returns the unit name for a reference path: its file name without the
/// extension.
///
/// The compiled symbol exported by a unit must carry this name, and the
/// unit's artifact is stored under it.
pub fn unit_name(reference: &str) -> &str {
    let file = reference.rsplit('/').next().unwrap_or(reference);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    }
}

/// Normalizes a dependency reference found in `importer`.
///
/// References starting with `./` or `../` are resolved against the
/// directory of the importing unit and collapsed; any other reference
/// (package paths, URLs, bare names) is returned unchanged.
pub fn normalize_reference(importer: &str, reference: &str) -> String {
    if !(reference.starts_with("./") || reference.starts_with("../")) {
        return reference.to_string();
    }

    let mut segments: Vec<&str> = importer.split('/').collect();
    // Drop the importer's own file name.
    segments.pop();

    for part in reference.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
