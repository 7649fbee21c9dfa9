//! Expense categories: the built-in set, user additions and the keyword classifier.

mod classifier;
mod db;
mod domain;
mod page;

pub use classifier::{CategoryClassifier, KeywordRule};
pub use db::{create_user_category, create_user_category_table, get_user_categories};
pub use domain::{
    BASE_CATEGORIES, CategoryFormData, CategoryName, OTHER_CATEGORY, UserCategory,
    merge_category_choices,
};
pub use page::{create_category_endpoint, get_categories_page};
