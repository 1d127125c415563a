//! Identity and output filename conventions.
//!
//! Every file the pipeline writes is named from two inputs: the source's
//! identity string and the rule that produced it.
//!
//! | Rule | Filename |
//! |------|----------|
//! | `suffix = "meta"` | `<base>-meta.png` |
//! | `no_size_suffix` | `<base>.webp` |
//! | otherwise | `<base>-<width>x<height>.webp` |
//!
//! `<base>` is the rule's fixed name if it has one, else the identity.
//! Width and height are the encoded dimensions, so two rules that differ
//! only in size never collide. Names depend on nothing but rule, identity and
//! output size, which is what makes wipe-and-regenerate idempotent.

use crate::catalog::ProcessingRule;

/// Author placeholder used when an image has no author attached.
pub const UNKNOWN_AUTHOR: &str = "UNKNOWN_AUTHOR";

/// Compose the lowercase identity of an image.
///
/// ```
/// # use gallery_variants::naming::compose_identity;
/// assert_eq!(compose_identity("Dawn", Some("Ansel"), false), "ansel-dawn");
/// assert_eq!(compose_identity("Dawn", None, false), "unknown_author-dawn");
/// assert_eq!(compose_identity("Dawn", Some("Ansel"), true), "dawn");
/// ```
pub fn compose_identity(name: &str, author: Option<&str>, ignore_author: bool) -> String {
    if ignore_author {
        return name.to_lowercase();
    }
    let author = author.unwrap_or(UNKNOWN_AUTHOR);
    format!("{author}-{name}").to_lowercase()
}

/// Filename base for a rule: its fixed name, else the source identity.
pub fn base_name<'a>(rule: &'a ProcessingRule, identity: &'a str) -> &'a str {
    rule.name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(identity)
}

/// Build the output filename for a rendered variant.
pub fn variant_file_name(rule: &ProcessingRule, identity: &str, width: u32, height: u32) -> String {
    let base = base_name(rule, identity);
    let ext = rule.format.name();

    match rule.suffix.as_deref() {
        Some(suffix) if !suffix.is_empty() => format!("{base}-{suffix}.{ext}"),
        _ if rule.no_size_suffix => format!("{base}.{ext}"),
        _ => format!("{base}-{width}x{height}.{ext}"),
    }
}

/// Whether a file in an output directory belongs to `identity`.
///
/// Matches by prefix, so `"ansel-dawn"` also claims `"ansel-dawn-meta.png"`
/// and, as a side effect, `"ansel-dawnlight.webp"`.
pub fn belongs_to(file_name: &str, identity: &str) -> bool {
    !identity.is_empty() && file_name.starts_with(identity)
}
