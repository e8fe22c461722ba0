//! Target application matching.

use crate::error::Error;

/// The set of application name substrings the user wants tracked.
///
/// Entries are stored lower-cased in configuration order with duplicates
/// removed. A process matches when its lower-cased name contains any
/// entry; the process's own lower-cased name (not the entry) becomes the
/// tracking key, so two entries matching the same process collapse into
/// one tracked app.
#[derive(Debug, Clone)]
pub struct TargetSet {
    entries: Vec<String>,
}

impl TargetSet {
    /// Builds a target set from configured names.
    ///
    /// Fails with [`Error::Config`] when no usable entry remains after
    /// trimming. Logs a warning for entries that are substrings of each
    /// other, since substring matching makes those prone to false
    /// positives (a "code" entry matches both "code" and "vscode").
    pub fn new(targets: &[String]) -> Result<Self, Error> {
        let mut entries: Vec<String> = Vec::new();
        for target in targets {
            let entry = target.trim().to_lowercase();
            if !entry.is_empty() && !entries.contains(&entry) {
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            return Err(Error::Config(
                "target_apps must contain at least one non-empty name".to_string(),
            ));
        }

        for a in &entries {
            for b in &entries {
                if a != b && b.contains(a.as_str()) {
                    tracing::warn!(
                        target_a = %a,
                        target_b = %b,
                        "target {a:?} also matches every process matched by {b:?}"
                    );
                }
            }
        }

        Ok(Self { entries })
    }

    /// Whether a lower-cased process name matches any target entry.
    pub fn matches(&self, process_name_lower: &str) -> bool {
        self.entries
            .iter()
            .any(|target| process_name_lower.contains(target.as_str()))
    }

    /// The normalized entries, in configuration order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
