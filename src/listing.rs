// SPDX-License-Identifier: MPL-2.0

//! Client-side search and filtering over the cached company list.

use crate::model::{Alert, Company};

/// Pseudo-category that matches every company
pub const ALL_CATEGORIES: &str = "Todas";

/// `Todas` followed by each distinct category in first-seen order
pub fn categories(companies: &[Company]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for company in companies {
        if !out.iter().skip(1).any(|c| *c == company.category) {
            out.push(company.category.clone());
        }
    }
    out
}

/// Search text and category chip as picked on the home screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    pub search: String,
    pub category: String,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl ListingFilter {
    pub fn new(search: &str, category: Option<&str>) -> Self {
        Self {
            search: search.to_string(),
            category: category.unwrap_or(ALL_CATEGORIES).to_string(),
        }
    }

    /// Banners and alerts are hidden while the user is narrowing the list
    pub fn is_searching(&self) -> bool {
        !self.search.is_empty() || self.category != ALL_CATEGORIES
    }

    pub fn matches(&self, company: &Company) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = company.name.to_lowercase().contains(&needle)
            || company.category.to_lowercase().contains(&needle);
        let matches_category =
            self.category == ALL_CATEGORIES || company.category == self.category;
        matches_search && matches_category
    }

    pub fn apply<'a>(&self, companies: &'a [Company]) -> Vec<&'a Company> {
        companies.iter().filter(|c| self.matches(c)).collect()
    }
}

pub fn featured(companies: &[Company]) -> Vec<&Company> {
    companies.iter().filter(|c| c.is_featured).collect()
}

pub fn find_company<'a>(companies: &'a [Company], id: &str) -> Option<&'a Company> {
    companies.iter().find(|c| c.id == id)
}

/// Companies on the favorites page, in listing order
pub fn favorite_companies<'a>(companies: &'a [Company], favorites: &[String]) -> Vec<&'a Company> {
    companies
        .iter()
        .filter(|c| favorites.iter().any(|f| *f == c.id))
        .collect()
}

pub fn active_alerts(alerts: &[Alert]) -> Vec<&Alert> {
    alerts.iter().filter(|a| a.active).collect()
}
