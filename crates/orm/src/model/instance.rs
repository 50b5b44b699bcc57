//! Hydrated model instances

use serde::{de::DeserializeOwned, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::backends::DatabaseValue;
use crate::error::{ModelError, ModelResult};

/// Outcome of resolving a foreign key
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// The referenced row, hydrated
    Loaded(Box<ModelInstance>),
    /// The lookup returned no row
    Missing,
    /// Not looked up: the edge repeated on the current path or the depth
    /// limit was reached
    Unresolved,
}

impl Relation {
    pub fn as_loaded(&self) -> Option<&ModelInstance> {
        match self {
            Relation::Loaded(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Relation::Loaded(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Relation::Missing)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Relation::Unresolved)
    }

    /// `Missing` renders as `false`, `Unresolved` as `null`
    pub fn to_json(&self) -> JsonValue {
        match self {
            Relation::Loaded(instance) => instance.to_json(),
            Relation::Missing => JsonValue::Bool(false),
            Relation::Unresolved => JsonValue::Null,
        }
    }
}

/// One hydrated row: ordered column values plus attached relations
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    model: String,
    table: String,
    fields: Vec<(String, DatabaseValue)>,
    relations: Vec<(String, Relation)>,
}

impl ModelInstance {
    pub fn new(model: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            table: table.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Set a field, keeping its original position when it already exists
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<DatabaseValue>) {
        let field = field.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&DatabaseValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Attach a relation, returning the one it replaced
    pub fn set_relation(&mut self, name: impl Into<String>, relation: Relation) -> Option<Relation> {
        let name = name.into();

        match self.relations.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, relation)),
            None => {
                self.relations.push((name, relation));
                None
            }
        }
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, relation)| relation)
    }

    /// The loaded instance behind a relation, if any
    pub fn related(&self, name: &str) -> Option<&ModelInstance> {
        self.relation(name).and_then(Relation::as_loaded)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.relations.iter().map(|(name, relation)| (name.as_str(), relation))
    }

    /// Render fields then relations as a JSON object
    ///
    /// A relation sharing its name with a column wins.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();

        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }

        for (name, relation) in &self.relations {
            map.insert(name.clone(), relation.to_json());
        }

        JsonValue::Object(map)
    }

    /// Deserialize into a typed model
    pub fn to_model<T: DeserializeOwned>(&self) -> ModelResult<T> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            ModelError::Serialization(format!(
                "Failed to convert '{}' instance: {}",
                self.model, e
            ))
        })
    }
}

impl Serialize for ModelInstance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_set_keeps_position() {
        let mut instance = ModelInstance::new("User", "users");
        instance.set("id", 1);
        instance.set("name", "Ann");
        instance.set("id", 2);

        assert_eq!(instance.field_names(), vec!["id", "name"]);
        assert_eq!(instance.get("id"), Some(&DatabaseValue::Int32(2)));
        assert_eq!(instance.get("missing"), None);
    }

    #[test]
    fn test_set_relation_replaces() {
        let mut instance = ModelInstance::new("Post", "posts");

        assert_eq!(instance.set_relation("user", Relation::Missing), None);
        let previous = instance.set_relation("user", Relation::Unresolved);

        assert_eq!(previous, Some(Relation::Missing));
        assert!(instance.relation("user").is_some_and(Relation::is_unresolved));
        assert_eq!(instance.relations().count(), 1);
    }

    #[test]
    fn test_to_json_renders_relations() {
        let mut role = ModelInstance::new("Role", "roles");
        role.set("id", 5);
        role.set("title", "Admin");

        let mut user = ModelInstance::new("User", "users");
        user.set("id", 1);
        user.set("role_id", 5);
        user.set("team_id", DatabaseValue::Null);
        user.set_relation("role", Relation::Loaded(Box::new(role)));
        user.set_relation("team", Relation::Missing);
        user.set_relation("manager", Relation::Unresolved);

        assert_eq!(
            user.to_json(),
            json!({
                "id": 1,
                "role_id": 5,
                "team_id": null,
                "role": {"id": 5, "title": "Admin"},
                "team": false,
                "manager": null,
            })
        );
    }

    #[test]
    fn test_to_model() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
        }

        let mut instance = ModelInstance::new("User", "users");
        instance.set("id", 1);
        instance.set("name", "Ann");

        let user: User = instance.to_model().unwrap();
        assert_eq!(user, User { id: 1, name: "Ann".to_string() });

        let mut broken = ModelInstance::new("User", "users");
        broken.set("id", "not a number");
        assert!(matches!(
            broken.to_model::<User>(),
            Err(ModelError::Serialization(_))
        ));
    }
}
