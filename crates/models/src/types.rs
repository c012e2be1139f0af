//! jsonb-backed list columns shared by several entities.
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Appends `value` unless present. Returns whether the list changed.
    pub fn insert(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != value);
        before != self.0.len()
    }
}

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self { Self(v) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct IdList(pub Vec<Uuid>);

impl IdList {
    pub fn contains(&self, id: Uuid) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: Uuid) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|v| *v != id);
        before != self.0.len()
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<Vec<Uuid>> for IdList {
    fn from(v: Vec<Uuid>) -> Self { Self(v) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_insert_is_idempotent() {
        let mut l = StringList::default();
        assert!(l.insert("robo-wars"));
        assert!(!l.insert("robo-wars"));
        assert_eq!(l.0.len(), 1);
        assert!(l.remove("robo-wars"));
        assert!(!l.remove("robo-wars"));
    }

    #[test]
    fn id_list_serializes_as_plain_array() {
        let id = Uuid::nil();
        let l = IdList(vec![id]);
        let json = serde_json::to_string(&l).unwrap();
        assert_eq!(json, format!("[\"{}\"]", id));
    }
}
