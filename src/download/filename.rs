//! Filename sanitization and destination path derivation.
//!
//! Destinations are a pure function of the target and the document URL, so the
//! existence of a file is enough to know the document was already fetched.
//!
//! - dynamic mode: `root/{year}/{model}/{NN}_{name}.pdf`
//! - static mode: `root/KGIS_Static/{name}`

use std::path::{Path, PathBuf};

use crate::catalog::ModelTarget;
use crate::config::STATIC_SUBDIR;

const PDF_EXTENSION: &str = ".pdf";
const FALLBACK_PDF_STEM: &str = "document";
const FALLBACK_MODEL_DIR: &str = "unnamed";

/// Redundant suffixes left behind when a dotted name is flattened.
const NOISE_SUFFIXES: [&str; 3] = ["_pdf", "_zip", "_txt"];

/// Maps a document URL or path to a lowercase `[a-z0-9_]` stem plus `.pdf`.
///
/// Total and idempotent: feeding the output back in returns it unchanged.
#[must_use]
pub fn sanitize_pdf_name(raw: &str) -> String {
    let segment = raw.rsplit('/').next().unwrap_or(raw);
    let decoded =
        urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |d| d.into_owned());
    let lower = decoded.to_lowercase();
    let stem = lower.strip_suffix(PDF_EXTENSION).unwrap_or(&lower);

    let mut safe = collapse_to_underscores(stem, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .trim_matches('_')
        .to_string();
    if safe.is_empty() {
        safe.push_str(FALLBACK_PDF_STEM);
    }
    safe.push_str(PDF_EXTENSION);
    safe
}

/// Maps a static-page document URL to a file name, keeping its extension.
///
/// Dots survive sanitization, and the `_pdf`, `_zip`, `_txt` fragments that
/// appear when a name like `guide.pdf.pdf` was flattened elsewhere are removed.
#[must_use]
pub fn sanitize_static_name(raw_url: &str) -> String {
    let lower = raw_url.to_lowercase();
    let without_query = lower.split('?').next().unwrap_or(&lower);
    let basename = without_query.rsplit('/').next().unwrap_or(without_query);
    let extension = file_extension(basename).unwrap_or("");

    let replaced: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut safe = collapse_to_underscores(&replaced, |c| c != '_')
        .trim_matches('_')
        .to_string();
    for suffix in NOISE_SUFFIXES {
        safe = safe.replace(suffix, "");
    }

    let stem = safe.strip_suffix(extension).unwrap_or(&safe);
    if stem.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return format!("{FALLBACK_PDF_STEM}{extension}");
    }
    if file_extension(&safe).is_none() {
        safe.push_str(extension);
    }
    safe
}

/// Maps a model display name to a directory name.
#[must_use]
pub fn sanitize_model_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let safe = kept.trim().replace(' ', "_");
    if safe.is_empty() {
        FALLBACK_MODEL_DIR.to_string()
    } else {
        safe
    }
}

/// Destination of the `ordinal`-th (1-based) document of a model.
#[must_use]
pub fn model_document_path(
    root: &Path,
    target: &ModelTarget,
    ordinal: usize,
    url: &str,
) -> PathBuf {
    root.join(target.year.to_string())
        .join(sanitize_model_name(&target.name))
        .join(format!("{ordinal:02}_{}", sanitize_pdf_name(url)))
}

/// Destination of a static-page document.
#[must_use]
pub fn static_document_path(root: &Path, raw_url: &str) -> PathBuf {
    root.join(STATIC_SUBDIR).join(sanitize_static_name(raw_url))
}

/// Python-style `splitext`: the last dot-suffix, ignoring leading dots.
fn file_extension(name: &str) -> Option<&str> {
    let body_start = name.len() - name.trim_start_matches('.').len();
    let dot = name[body_start..].rfind('.')? + body_start;
    Some(&name[dot..])
}

/// Replaces every maximal run of characters rejected by `keep` with one `_`.
fn collapse_to_underscores(value: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if keep(ch) {
            out.push(ch);
            prev_sep = false;
        } else if !prev_sep {
            out.push('_');
            prev_sep = true;
        }
    }
    out
}
