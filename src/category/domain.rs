//! Core category domain types.

use std::{collections::HashSet, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// The fallback category for expenses that match nothing else.
pub const OTHER_CATEGORY: &str = "Other";

/// The categories every user can choose from.
pub const BASE_CATEGORIES: [&str; 6] = [
    "Food",
    "Travel",
    "Shopping",
    "Bills",
    "Entertainment",
    OTHER_CATEGORY,
];

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category a user added on top of [BASE_CATEGORIES].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCategory {
    pub id: DatabaseId,
    pub name: CategoryName,
}

/// Form data for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
}

/// The categories to offer in the expense form.
///
/// The base categories come first, followed by `user_categories` in the
/// order given. Names that appear more than once are only kept the first time.
pub fn merge_category_choices(user_categories: &[UserCategory]) -> Vec<CategoryName> {
    let mut seen = HashSet::new();

    BASE_CATEGORIES
        .iter()
        .map(|name| CategoryName::new_unchecked(name))
        .chain(user_categories.iter().map(|category| category.name.clone()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}


#[cfg(test)]
mod merge_category_choices_tests {
    use crate::category::{BASE_CATEGORIES, CategoryName, UserCategory, merge_category_choices};

    fn user_category(id: i64, name: &str) -> UserCategory {
        UserCategory {
            id,
            name: CategoryName::new_unchecked(name),
        }
    }

    #[test]
    fn no_user_categories_gives_base_set() {
        let got = merge_category_choices(&[]);

        let got = got.iter().map(|name| name.as_ref()).collect::<Vec<_>>();
        assert_eq!(got, BASE_CATEGORIES);
    }

    #[test]
    fn user_categories_follow_base_set() {
        let got = merge_category_choices(&[user_category(1, "Gifts"), user_category(2, "Pets")]);

        let got = got.iter().map(|name| name.as_ref()).collect::<Vec<_>>();
        assert_eq!(
            got,
            [
                "Food",
                "Travel",
                "Shopping",
                "Bills",
                "Entertainment",
                "Other",
                "Gifts",
                "Pets"
            ]
        );
    }

    #[test]
    fn duplicates_are_removed() {
        let got = merge_category_choices(&[user_category(1, "Food"), user_category(2, "Pets")]);

        let food_count = got.iter().filter(|name| name.as_ref() == "Food").count();
        assert_eq!(food_count, 1, "want Food once, got {got:?}");
        assert_eq!(got.len(), BASE_CATEGORIES.len() + 1);
    }
}
