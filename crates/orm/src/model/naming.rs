//! Table and property naming rules
//!
//! Maps a table name to the model it hydrates into (`users` → `User`) and to
//! the property a related row is attached under (`roles` → `role`).

use std::fmt::Debug;

use inflector::Inflector;

/// Known irregular plurals that inflector doesn't handle well for table names
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("analysis", "analyses"),
    ("basis", "bases"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Naming rule shared by model resolution and relation attachment
pub trait TableNaming: Send + Sync + Debug {
    /// Model name a table hydrates into
    fn model_name(&self, table: &str) -> String;

    /// Property name a row of `table` is attached under on its parent
    fn property_name(&self, table: &str) -> String;
}

/// Default rule: singular class case for models, singular snake case for
/// properties. Schema prefixes (`public.users`) are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct InflectorNaming;

impl TableNaming for InflectorNaming {
    fn model_name(&self, table: &str) -> String {
        singularize(unqualified(table)).to_class_case()
    }

    fn property_name(&self, table: &str) -> String {
        singularize(unqualified(table)).to_snake_case()
    }
}

fn unqualified(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}

/// Singularize a word, handling irregulars first then falling back to inflector.
///
/// Only the last `_`-separated segment is inflected (`user_roles` → `user_role`).
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    let (prefix, last) = match lower.rfind('_') {
        Some(pos) => lower.split_at(pos + 1),
        None => ("", lower.as_str()),
    };

    for (singular, plural) in IRREGULAR_PLURALS {
        if last == *plural || last == *singular {
            return format!("{}{}", prefix, singular);
        }
    }

    format!("{}{}", prefix, last.to_singular())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name() {
        let naming = InflectorNaming;

        assert_eq!(naming.model_name("users"), "User");
        assert_eq!(naming.model_name("Users"), "User");
        assert_eq!(naming.model_name("categories"), "Category");
        assert_eq!(naming.model_name("user_roles"), "UserRole");
        assert_eq!(naming.model_name("public.people"), "Person");
    }

    #[test]
    fn test_property_name() {
        let naming = InflectorNaming;

        assert_eq!(naming.property_name("roles"), "role");
        assert_eq!(naming.property_name("user_roles"), "user_role");
        assert_eq!(naming.property_name("people"), "person");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("orders"), "order");
        assert_eq!(singularize("order"), "order");
        assert_eq!(singularize("indices"), "index");
        assert_eq!(singularize("order_items"), "order_item");
        assert_eq!(singularize(""), "");
    }
}
