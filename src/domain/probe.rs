//! Validation probe: the throwaway test program generated by `validate`
//!
//! The probe is a single integration-test file that calls the configured
//! validator with one URL and prints what it returns. It never panics on a
//! validation error, so a non-zero exit from the build tool means the probe
//! failed to compile or run, not that the deliverable was rejected.

use regex::Regex;

use crate::domain::DomainError;

/// Rendered source of a probe file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSource(String);

impl ProbeSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Render the probe source for `url`.
///
/// The validator is expected to return `Result<(FolderId, Vec<File>), E>`
/// with `FolderId: Display`, `File: Debug` and `E: Display`.
///
/// # Errors
/// * `MissingUrl` if `url` is blank
/// * `InvalidValidatorPath` if `validator_path` is not a plain Rust path
pub fn render_probe(
    validator_path: &str,
    is_async: bool,
    url: &str,
) -> Result<ProbeSource, DomainError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DomainError::MissingUrl);
    }
    if !is_rust_path(validator_path) {
        return Err(DomainError::InvalidValidatorPath(validator_path.to_string()));
    }

    // Debug formatting of a str yields a valid, escaped Rust string literal.
    let url_literal = format!("{url:?}");
    let (attr, fn_kw, await_suffix) = if is_async {
        ("#[tokio::test]", "async fn", ".await")
    } else {
        ("#[test]", "fn", "")
    };

    let mut src = String::new();
    src.push_str("// Generated by report-harness for a single validation run; deleted afterwards.\n\n");
    src.push_str(attr);
    src.push('\n');
    src.push_str(&format!("{fn_kw} validate_deliverable_probe() {{\n"));
    src.push_str(&format!("    let url = {url_literal};\n"));
    src.push_str("    println!(\"validating: {}\", url);\n");
    src.push_str(&format!("    match {validator_path}(url){await_suffix} {{\n"));
    src.push_str("        Ok((folder_id, files)) => {\n");
    src.push_str("            println!(\"folder id: {}\", folder_id);\n");
    src.push_str("            println!(\"files to download: {}\", files.len());\n");
    src.push_str("            for file in &files {\n");
    src.push_str("                println!(\"  {:?}\", file);\n");
    src.push_str("            }\n");
    src.push_str("        }\n");
    src.push_str("        Err(e) => println!(\"validation error: {}\", e),\n");
    src.push_str("    }\n");
    src.push_str("}\n");

    Ok(ProbeSource(src))
}

/// Name of the scratch test target for this process.
///
/// The process id keeps concurrent runs in the same project apart.
pub fn scratch_target_name(prefix: &str, pid: u32) -> Result<String, DomainError> {
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(DomainError::InvalidScratchPrefix(prefix.to_string()));
    }
    Ok(format!("{prefix}_{pid}"))
}

/// Extract a Google Drive folder id from `.../folders/<id>` or `?id=<id>` URLs.
///
/// Returns `Ok(None)` for URLs that carry no folder id.
pub fn drive_folder_id(url: &str) -> Result<Option<&str>, DomainError> {
    let re = Regex::new(r"(?:/folders/|[?&]id=)([A-Za-z0-9_-]+)")
        .map_err(|e| DomainError::InvalidPattern(e.to_string()))?;
    Ok(re
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str()))
}

fn is_rust_path(path: &str) -> bool {
    !path.is_empty()
        && path.split("::").all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                _ => false,
            }
        })
}
