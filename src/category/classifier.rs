//! Predicts an expense category from its description using keyword matching.

use crate::category::{CategoryName, OTHER_CATEGORY};

/// Maps a lower-case keyword to the category it implies.
///
/// A rule with an empty keyword never matches. Otherwise it would match every
/// description and shadow all of the rules after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    keyword: String,
    category: CategoryName,
}

impl KeywordRule {
    /// Create a rule. The keyword is matched case-insensitively.
    pub fn new(keyword: &str, category: CategoryName) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            category,
        }
    }
}

/// The keyword table used when no other rules are configured.
///
/// Order matters: the first keyword found in a description wins.
const DEFAULT_RULES: [(&str, &str); 14] = [
    ("uber", "Travel"),
    ("ola", "Travel"),
    ("cab", "Travel"),
    ("bus", "Travel"),
    ("train", "Travel"),
    ("pizza", "Food"),
    ("restaurant", "Food"),
    ("grocery", "Food"),
    ("grocer", "Food"),
    ("amazon", "Shopping"),
    ("flipkart", "Shopping"),
    ("netflix", "Entertainment"),
    ("electricity", "Bills"),
    ("rent", "Bills"),
];

/// An immutable, ordered list of keyword rules.
///
/// Shared between request handlers through the app state, so that tests and
/// deployments can swap in their own rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryClassifier {
    rules: Vec<KeywordRule>,
}

impl CategoryClassifier {
    /// Create a classifier that checks `rules` in the given order.
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Return the category of the first rule whose keyword appears in
    /// `description`, or "Other" if none do.
    pub fn classify(&self, description: &str) -> CategoryName {
        let description = description.to_lowercase();

        self.rules
            .iter()
            .find(|rule| !rule.keyword.is_empty() && description.contains(&rule.keyword))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| CategoryName::new_unchecked(OTHER_CATEGORY))
    }

    /// Resolve the category to store for an expense.
    ///
    /// Blank or "Other" categories are replaced with the prediction for
    /// `description`, anything else is kept as is.
    pub fn resolve(&self, category: &str, description: &str) -> CategoryName {
        match CategoryName::new(category) {
            Ok(name) if name.as_ref() != OTHER_CATEGORY => name,
            _ => self.classify(description),
        }
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(keyword, category)| {
                KeywordRule::new(keyword, CategoryName::new_unchecked(category))
            })
            .collect();

        Self::new(rules)
    }
}

#[cfg(test)]
mod classifier_tests {
    use crate::category::{CategoryName, classifier::KeywordRule};

    use super::CategoryClassifier;

    #[track_caller]
    fn assert_classified(description: &str, want: &str) {
        let classifier = CategoryClassifier::default();

        let got = classifier.classify(description);

        assert_eq!(
            got.as_ref(),
            want,
            "want {description:?} to be classified as {want}, got {got}"
        );
    }

    #[test]
    fn known_keywords_map_to_their_category() {
        assert_classified("Uber to airport", "Travel");
        assert_classified("Bus pass", "Travel");
        assert_classified("Pizza night", "Food");
        assert_classified("Weekly GROCERY run", "Food");
        assert_classified("Amazon order", "Shopping");
        assert_classified("Netflix subscription", "Entertainment");
        assert_classified("Electricity bill", "Bills");
        assert_classified("March rent", "Bills");
    }

    #[test]
    fn unknown_description_is_other() {
        assert_classified("Haircut", "Other");
    }

    #[test]
    fn empty_description_is_other() {
        assert_classified("", "Other");
    }

    #[test]
    fn keywords_match_as_substrings() {
        // "ola" is a substring of "chocolate".
        assert_classified("Chocolate", "Travel");
    }

    #[test]
    fn first_rule_in_declaration_order_wins() {
        // Contains both "restaurant" (Food) and "rent" (Bills).
        assert_classified("Restaurant rent", "Food");
        // Contains both "train" (Travel) and "pizza" (Food).
        assert_classified("Pizza on the train", "Travel");
    }

    #[test]
    fn custom_rules_replace_the_defaults() {
        let classifier = CategoryClassifier::new(vec![
            KeywordRule::new("Coffee", CategoryName::new_unchecked("Cafe")),
            KeywordRule::new("uber", CategoryName::new_unchecked("Rideshare")),
        ]);

        assert_eq!(classifier.classify("coffee with friends").as_ref(), "Cafe");
        assert_eq!(classifier.classify("Uber home").as_ref(), "Rideshare");
        assert_eq!(classifier.classify("Pizza").as_ref(), "Other");
    }

    #[test]
    fn empty_keyword_never_matches() {
        let classifier = CategoryClassifier::new(vec![
            KeywordRule::new("", CategoryName::new_unchecked("Everything")),
            KeywordRule::new("pizza", CategoryName::new_unchecked("Food")),
        ]);

        assert_eq!(classifier.classify("Pizza").as_ref(), "Food");
        assert_eq!(classifier.classify("Haircut").as_ref(), "Other");
        assert_eq!(classifier.classify("").as_ref(), "Other");
    }

    #[test]
    fn resolve_keeps_explicit_category() {
        let classifier = CategoryClassifier::default();

        assert_eq!(classifier.resolve("Bills", "Pizza").as_ref(), "Bills");
    }

    #[test]
    fn resolve_predicts_blank_or_other_category() {
        let classifier = CategoryClassifier::default();

        assert_eq!(classifier.resolve("", "Pizza").as_ref(), "Food");
        assert_eq!(classifier.resolve("  ", "Uber").as_ref(), "Travel");
        assert_eq!(classifier.resolve("Other", "Netflix").as_ref(), "Entertainment");
        assert_eq!(classifier.resolve("Other", "Haircut").as_ref(), "Other");
    }
}
