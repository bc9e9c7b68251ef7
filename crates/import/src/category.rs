use std::collections::{HashMap, HashSet};

use moneta_core::{Category, CategoryId};

/// Outcome of resolving a free-text category hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Hint matched a known category.
    Matched(CategoryId),
    /// Hint accepted without assigning an id (preview mode).
    Accepted,
    /// Hint did not match anything; the row is still imported, uncategorized.
    Unmatched,
}

/// Pluggable category-validation strategy. Preview swaps in [`AlwaysValid`]
/// to avoid database lookups; commit uses a [`CategoryIndex`] loaded once per
/// request.
pub trait CategoryResolver: Send + Sync {
    fn resolve(&self, hint: &str) -> Resolution;
}

/// Accepts any hint without resolving it. Used at preview time, where a
/// category mismatch should never block the report.
pub struct AlwaysValid;

impl CategoryResolver for AlwaysValid {
    fn resolve(&self, _hint: &str) -> Resolution {
        Resolution::Accepted
    }
}

/// In-memory index over the user's categories. Matching is exact and
/// case-insensitive on the name; a hint that is the numeric id of a known
/// category also resolves. No fuzzy matching, to avoid silent misassignment.
pub struct CategoryIndex {
    by_name: HashMap<String, CategoryId>,
    ids: HashSet<CategoryId>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let mut by_name = HashMap::new();
        let mut ids = HashSet::new();
        for cat in categories {
            if let Some(id) = cat.id {
                by_name.insert(cat.name.trim().to_lowercase(), id);
                ids.insert(id);
            }
        }
        Self { by_name, ids }
    }
}

impl CategoryResolver for CategoryIndex {
    fn resolve(&self, hint: &str) -> Resolution {
        let hint = hint.trim();
        if let Ok(n) = hint.parse::<i64>() {
            let id = CategoryId(n);
            if self.ids.contains(&id) {
                return Resolution::Matched(id);
            }
        }
        match self.by_name.get(&hint.to_lowercase()) {
            Some(id) => Resolution::Matched(*id),
            None => Resolution::Unmatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneta_core::CategoryKind;

    fn cat(id: i64, name: &str) -> Category {
        Category {
            id: Some(CategoryId(id)),
            name: name.to_string(),
            kind: CategoryKind::Expense,
        }
    }

    #[test]
    fn always_valid_accepts_anything() {
        assert_eq!(AlwaysValid.resolve("whatever"), Resolution::Accepted);
        assert_eq!(AlwaysValid.resolve(""), Resolution::Accepted);
    }

    #[test]
    fn exact_name_match_case_insensitive() {
        let index = CategoryIndex::new(&[cat(3, "Groceries")]);
        assert_eq!(index.resolve("groceries"), Resolution::Matched(CategoryId(3)));
        assert_eq!(index.resolve("  GROCERIES "), Resolution::Matched(CategoryId(3)));
    }

    #[test]
    fn numeric_id_passthrough() {
        let index = CategoryIndex::new(&[cat(3, "Groceries")]);
        assert_eq!(index.resolve("3"), Resolution::Matched(CategoryId(3)));
        // Unknown id does not resolve.
        assert_eq!(index.resolve("99"), Resolution::Unmatched);
    }

    #[test]
    fn no_fuzzy_matching() {
        let index = CategoryIndex::new(&[cat(3, "Groceries")]);
        assert_eq!(index.resolve("Grocery"), Resolution::Unmatched);
    }

    #[test]
    fn categories_without_id_are_skipped() {
        let index = CategoryIndex::new(&[Category::new("Pending", CategoryKind::Expense)]);
        assert_eq!(index.resolve("Pending"), Resolution::Unmatched);
    }
}
