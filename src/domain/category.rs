//! Category table and the vocabulary of valid category names.
//!
//! The table maps a category folder name to the lowercase extensions
//! (leading dot included) that belong to it. It is built once at startup and
//! never mutated afterwards.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Catch-all category used whenever classification cannot do better.
pub const CATCH_ALL: &str = "Other";

/// Extra names the external classifier may answer with. They have no
/// extensions of their own.
pub const AUXILIARY_CATEGORIES: &[&str] = &[
    "Design",
    "3D Models",
    "Ebooks",
    "Notes",
    "Scripts",
    "Configuration",
    "Logs",
    "Backups",
    "Temporary",
    CATCH_ALL,
];

const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico"],
    ),
    (
        "Videos",
        &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v"],
    ),
    (
        "Audio",
        &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a"],
    ),
    (
        "Documents",
        &[".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".tex"],
    ),
    ("Spreadsheets", &[".xls", ".xlsx", ".csv", ".ods"]),
    ("Presentations", &[".ppt", ".pptx", ".odp", ".key"]),
    (
        "Code",
        &[
            ".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".h", ".php", ".rb", ".go",
            ".rs", ".ts", ".jsx", ".tsx", ".vue", ".swift", ".kt", ".sql", ".sh", ".bash",
            ".json", ".xml", ".yaml", ".yml",
        ],
    ),
    (
        "Archives",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
    ),
    (
        "Executables",
        &[".exe", ".msi", ".app", ".dmg", ".deb", ".rpm"],
    ),
    ("Databases", &[".db", ".sqlite", ".sql", ".mdb"]),
    ("Fonts", &[".ttf", ".otf", ".woff", ".woff2"]),
    ("CAD", &[".dwg", ".dxf", ".stl", ".obj"]),
];

/// A single category and the extensions it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Ordered category table.
///
/// Lookups walk the table in declaration order, so when two categories claim
/// the same extension the first-declared one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    entries: Vec<CategoryEntry>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_CATEGORIES.iter().map(|(name, exts)| {
            (
                name.to_string(),
                exts.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    /// Build a table from `(name, extensions)` pairs, normalizing every
    /// extension to lowercase with a leading dot.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, extensions)| CategoryEntry {
                name,
                extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
            })
            .collect();

        Self { entries }
    }

    /// Append user-defined categories after the existing ones.
    ///
    /// Extensions declared by an existing category of the same name are merged
    /// into it; new names are appended at the end of the table.
    pub fn extend_with(&mut self, extra: BTreeMap<String, Vec<String>>) {
        for (name, extensions) in extra {
            let extensions: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();

            match self.entries.iter_mut().find(|entry| entry.name == name) {
                Some(entry) => {
                    for ext in extensions {
                        if !entry.extensions.contains(&ext) {
                            entry.extensions.push(ext);
                        }
                    }
                }
                None => self.entries.push(CategoryEntry { name, extensions }),
            }
        }
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Look up the category for an extension (case-insensitive, leading dot
    /// expected). Returns `None` when no category claims it.
    pub fn category_for_extension(&self, ext: &str) -> Option<&str> {
        let ext = ext.to_lowercase();
        if ext.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|entry| entry.extensions.iter().any(|e| *e == ext))
            .map(|entry| entry.name.as_str())
    }

    /// Table names in declaration order followed by the auxiliary names.
    pub fn valid_categories(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let table_names = self.entries.iter().map(|e| e.name.as_str());

        for name in table_names.chain(AUXILIARY_CATEGORIES.iter().copied()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        names
    }

    /// Exact, case-sensitive membership in the valid category set.
    pub fn is_valid(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name) || AUXILIARY_CATEGORIES.contains(&name)
    }

    /// Extensions claimed by more than one category, with every claimant in
    /// declaration order.
    pub fn duplicate_extensions(&self) -> Vec<(String, Vec<String>)> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();

        for entry in &self.entries {
            for ext in &entry.extensions {
                if !seen.insert(ext.as_str()) {
                    continue;
                }

                let owners: Vec<String> = self
                    .entries
                    .iter()
                    .filter(|other| other.extensions.contains(ext))
                    .map(|other| other.name.clone())
                    .collect();

                if owners.len() > 1 {
                    duplicates.push((ext.clone(), owners));
                }
            }
        }

        duplicates
    }
}

/// Lowercase extension of a path's file name, including the leading dot.
///
/// Returns an empty string when the name has no extension. A name that only
/// starts with a dot (`.bashrc`) has no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
