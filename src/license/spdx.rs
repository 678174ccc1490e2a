//! Built-in SPDX knowledge: the default catalog entries and the alias table
//! used to normalize detector output.

pub const PERMISSIVE: &str = "permissive";
pub const WEAK_COPYLEFT: &str = "weak-copyleft";
pub const COPYLEFT: &str = "copyleft";

/// `(id, name, category)` for every license the built-in catalog knows.
pub fn builtin_entries() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        // Permissive
        ("MIT", "MIT License", PERMISSIVE),
        ("MIT-0", "MIT No Attribution", PERMISSIVE),
        ("Apache-2.0", "Apache License 2.0", PERMISSIVE),
        ("BSD-2-Clause", "BSD 2-Clause \"Simplified\" License", PERMISSIVE),
        ("BSD-3-Clause", "BSD 3-Clause \"New\" or \"Revised\" License", PERMISSIVE),
        ("BSD-4-Clause", "BSD 4-Clause \"Original\" License", PERMISSIVE),
        ("ISC", "ISC License", PERMISSIVE),
        ("0BSD", "BSD Zero Clause License", PERMISSIVE),
        ("Unlicense", "The Unlicense", PERMISSIVE),
        ("Zlib", "zlib License", PERMISSIVE),
        ("CC0-1.0", "Creative Commons Zero v1.0 Universal", PERMISSIVE),
        ("CC-BY-3.0", "Creative Commons Attribution 3.0", PERMISSIVE),
        ("CC-BY-4.0", "Creative Commons Attribution 4.0", PERMISSIVE),
        ("WTFPL", "Do What The F*ck You Want To Public License", PERMISSIVE),
        ("PSF-2.0", "Python Software Foundation License 2.0", PERMISSIVE),
        ("Python-2.0", "Python License 2.0", PERMISSIVE),
        ("BlueOak-1.0.0", "Blue Oak Model License 1.0.0", PERMISSIVE),
        ("Artistic-2.0", "Artistic License 2.0", PERMISSIVE),
        ("Unicode-DFS-2016", "Unicode License Agreement - Data Files and Software (2016)", PERMISSIVE),
        ("Unicode-3.0", "Unicode License v3", PERMISSIVE),
        // Weak copyleft
        ("LGPL-2.0", "GNU Library General Public License v2", WEAK_COPYLEFT),
        ("LGPL-2.0-only", "GNU Library General Public License v2 only", WEAK_COPYLEFT),
        ("LGPL-2.0-or-later", "GNU Library General Public License v2 or later", WEAK_COPYLEFT),
        ("LGPL-2.1", "GNU Lesser General Public License v2.1", WEAK_COPYLEFT),
        ("LGPL-2.1-only", "GNU Lesser General Public License v2.1 only", WEAK_COPYLEFT),
        ("LGPL-2.1-or-later", "GNU Lesser General Public License v2.1 or later", WEAK_COPYLEFT),
        ("LGPL-3.0", "GNU Lesser General Public License v3.0", WEAK_COPYLEFT),
        ("LGPL-3.0-only", "GNU Lesser General Public License v3.0 only", WEAK_COPYLEFT),
        ("LGPL-3.0-or-later", "GNU Lesser General Public License v3.0 or later", WEAK_COPYLEFT),
        ("MPL-2.0", "Mozilla Public License 2.0", WEAK_COPYLEFT),
        ("EUPL-1.2", "European Union Public License 1.2", WEAK_COPYLEFT),
        ("CDDL-1.0", "Common Development and Distribution License 1.0", WEAK_COPYLEFT),
        ("EPL-1.0", "Eclipse Public License 1.0", WEAK_COPYLEFT),
        ("EPL-2.0", "Eclipse Public License 2.0", WEAK_COPYLEFT),
        ("APSL-2.0", "Apple Public Source License 2.0", WEAK_COPYLEFT),
        ("OSL-3.0", "Open Software License 3.0", WEAK_COPYLEFT),
        // Strong copyleft
        ("GPL-2.0", "GNU General Public License v2.0", COPYLEFT),
        ("GPL-2.0-only", "GNU General Public License v2.0 only", COPYLEFT),
        ("GPL-2.0-or-later", "GNU General Public License v2.0 or later", COPYLEFT),
        ("GPL-3.0", "GNU General Public License v3.0", COPYLEFT),
        ("GPL-3.0-only", "GNU General Public License v3.0 only", COPYLEFT),
        ("GPL-3.0-or-later", "GNU General Public License v3.0 or later", COPYLEFT),
        ("AGPL-3.0", "GNU Affero General Public License v3.0", COPYLEFT),
        ("AGPL-3.0-only", "GNU Affero General Public License v3.0 only", COPYLEFT),
        ("AGPL-3.0-or-later", "GNU Affero General Public License v3.0 or later", COPYLEFT),
        ("EUPL-1.1", "European Union Public License 1.1", COPYLEFT),
    ]
}

/// Shorthands that neither an SPDX id nor a catalog name covers.
const ALIASES: &[(&str, &str)] = &[
    ("Apache 2.0", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("Apache-2", "Apache-2.0"),
    ("BSD", "BSD-3-Clause"),
    ("BSD License", "BSD-3-Clause"),
    ("BSD 2-Clause", "BSD-2-Clause"),
    ("Simplified BSD", "BSD-2-Clause"),
    ("BSD 3-Clause", "BSD-3-Clause"),
    ("New BSD", "BSD-3-Clause"),
    ("Modified BSD", "BSD-3-Clause"),
    ("GNU GPL v2", "GPL-2.0"),
    ("GNU General Public License v2", "GPL-2.0"),
    ("GPL v2", "GPL-2.0"),
    ("GPLv2", "GPL-2.0"),
    ("GNU GPL v3", "GPL-3.0"),
    ("GNU General Public License v3", "GPL-3.0"),
    ("GPL v3", "GPL-3.0"),
    ("GPLv3", "GPL-3.0"),
    ("GNU LGPL v2.1", "LGPL-2.1"),
    ("LGPL v2.1", "LGPL-2.1"),
    ("LGPLv2.1", "LGPL-2.1"),
    ("GNU LGPL v3", "LGPL-3.0"),
    ("LGPL v3", "LGPL-3.0"),
    ("LGPLv3", "LGPL-3.0"),
    ("MPL 2.0", "MPL-2.0"),
    ("MPLv2", "MPL-2.0"),
    ("CC0", "CC0-1.0"),
    ("Public Domain", "CC0-1.0"),
    ("AGPL v3", "AGPL-3.0"),
    ("AGPLv3", "AGPL-3.0"),
    ("GNU AGPL v3", "AGPL-3.0"),
];

/// Normalize a detected license string to an SPDX identifier.
///
/// Matching is case-insensitive, against the built-in ids, then their full
/// names (`MIT License`, `The Unlicense`, with or without a leading `The`),
/// then [`ALIASES`]. Anything else, compound expressions included, passes
/// through trimmed.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let entries = builtin_entries();

    if let Some((id, _, _)) = entries.iter().find(|(id, _, _)| id.eq_ignore_ascii_case(trimmed)) {
        return id.to_string();
    }

    let unprefixed = strip_article(trimmed);
    let by_name = entries.iter().find(|(_, name, _)| {
        name.eq_ignore_ascii_case(trimmed) || strip_article(name).eq_ignore_ascii_case(unprefixed)
    });
    if let Some((id, _, _)) = by_name {
        return id.to_string();
    }

    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn strip_article(s: &str) -> &str {
    match s.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => &s[4..],
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("MIT License"), "MIT");
        assert_eq!(normalize("Apache License 2.0"), "Apache-2.0");
        assert_eq!(normalize("  GPLv3 "), "GPL-3.0");
    }

    #[test]
    fn test_normalize_from_catalog_names() {
        assert_eq!(normalize("The MIT License"), "MIT");
        assert_eq!(normalize("mit license"), "MIT");
        assert_eq!(normalize("Unlicense"), "Unlicense");
        assert_eq!(normalize("The Unlicense"), "Unlicense");
        assert_eq!(normalize("zlib License"), "Zlib");
        assert_eq!(normalize("GNU General Public License v3.0 or later"), "GPL-3.0-or-later");
        assert_eq!(normalize("Mozilla Public License 2.0"), "MPL-2.0");
    }

    #[test]
    fn test_normalize_canonicalizes_id_case() {
        assert_eq!(normalize("apache-2.0"), "Apache-2.0");
        assert_eq!(normalize("Custom-1"), "Custom-1");
    }

    #[test]
    fn test_aliases_point_at_builtin_ids() {
        let entries = builtin_entries();
        for (alias, id) in ALIASES {
            assert!(
                entries.iter().any(|(known, _, _)| known == id),
                "alias '{}' maps to unknown id '{}'",
                alias,
                id
            );
        }
    }

    #[test]
    fn test_normalize_leaves_expressions_alone() {
        assert_eq!(normalize("MIT OR Apache-2.0"), "MIT OR Apache-2.0");
    }

    #[test]
    fn test_builtin_ids_unique() {
        let entries = builtin_entries();
        let mut ids: Vec<_> = entries.iter().map(|(id, _, _)| *id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), entries.len());
    }
}
