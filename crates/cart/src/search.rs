//! Catalog search.
//!
//! Case-insensitive substring match over a product's name and category, the
//! same filter the server applies to `GET /products?search=`.

/// Anything searchable by name and category.
pub trait Searchable {
    fn name(&self) -> &str;
    fn category(&self) -> &str;
}

impl Searchable for crate::cart::CartItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }
}

/// Whether `query` matches the given name or category. A blank query
/// matches everything.
#[must_use]
pub fn matches(query: &str, name: &str, category: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&query) || category.to_lowercase().contains(&query)
}

/// Filters a slice down to the entries matching `query`.
pub fn filter<'a, T: Searchable>(entries: &'a [T], query: &str) -> Vec<&'a T> {
    entries
        .iter()
        .filter(|e| matches(query, e.name(), e.category()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry {
        name: &'static str,
        category: &'static str,
    }

    impl Searchable for Entry {
        fn name(&self) -> &str {
            self.name
        }

        fn category(&self) -> &str {
            self.category
        }
    }

    const CATALOG: &[Entry] = &[
        Entry {
            name: "Paracetamol 500mg",
            category: "Pain Relief",
        },
        Entry {
            name: "Cough Syrup",
            category: "Cold & Flu",
        },
        Entry {
            name: "Vitamin C",
            category: "Supplements",
        },
    ];

    #[test]
    fn test_matches_name_and_category_case_insensitively() {
        assert!(matches("PARACETAMOL", "Paracetamol 500mg", "Pain Relief"));
        assert!(matches("pain", "Paracetamol 500mg", "Pain Relief"));
        assert!(!matches("syrup", "Paracetamol 500mg", "Pain Relief"));
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert_eq!(filter(CATALOG, "").len(), 3);
        assert_eq!(filter(CATALOG, "   ").len(), 3);
    }

    #[test]
    fn test_filter_narrows_by_substring() {
        let hits = filter(CATALOG, "flu");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Cough Syrup");

        assert!(filter(CATALOG, "antibiotic").is_empty());
    }
}
