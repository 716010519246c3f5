//! Decoded response data.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// One decoded value, typed by the selection it was decoded against.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Null,
    Boolean(bool),
    Int(i32),
    Float(f64),
    String(String),
    Enum(String),
    /// A custom scalar, as its adapter produced it.
    Custom(Value),
    List(Vec<ResponseValue>),
    Object(ResponseObject),
}

impl ResponseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ResponseValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResponseValue::String(s) | ResponseValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ResponseObject> {
        match self {
            ResponseValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResponseValue]> {
        match self {
            ResponseValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseValue::Null => "null",
            ResponseValue::Boolean(_) => "a boolean",
            ResponseValue::Int(_) => "an int",
            ResponseValue::Float(_) => "a float",
            ResponseValue::String(_) => "a string",
            ResponseValue::Enum(_) => "an enum value",
            ResponseValue::Custom(_) => "a custom scalar",
            ResponseValue::List(_) => "a list",
            ResponseValue::Object(_) => "an object",
        }
    }

    /// Plain JSON for this value. Non-finite floats become null.
    pub fn to_json(&self) -> Value {
        match self {
            ResponseValue::Null => Value::Null,
            ResponseValue::Boolean(b) => Value::Bool(*b),
            ResponseValue::Int(n) => Value::Number(Number::from(*n)),
            ResponseValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ResponseValue::String(s) | ResponseValue::Enum(s) => Value::String(s.clone()),
            ResponseValue::Custom(value) => value.clone(),
            ResponseValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ResponseValue::Object(object) => object.to_json(),
        }
    }
}

impl From<ResponseObject> for ResponseValue {
    fn from(object: ResponseObject) -> Self {
        ResponseValue::Object(object)
    }
}

/// An instance of one generated model.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseObject {
    model_id: String,
    typename: Option<String>,
    fields: IndexMap<String, ResponseValue>,
}

impl ResponseObject {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            typename: None,
            fields: IndexMap::new(),
        }
    }

    pub fn with_typename(mut self, typename: impl Into<String>) -> Self {
        self.typename = Some(typename.into());
        self
    }

    /// Id of the model this object was decoded into, e.g. `Hero.Data.Hero.DroidHero`.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The concrete type, if the response named it.
    pub fn typename(&self) -> Option<&str> {
        self.typename.as_deref()
    }

    pub fn get(&self, response_name: &str) -> Option<&ResponseValue> {
        self.fields.get(response_name)
    }

    pub fn insert(&mut self, response_name: impl Into<String>, value: ResponseValue) {
        self.fields.insert(response_name.into(), value);
    }

    /// Fields in selection order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ResponseValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_to_json_keeps_field_order() {
        let mut friend = ResponseObject::new("Q.Data.Hero.Friends");
        friend.insert("name", ResponseValue::String("Leia".to_string()));

        let mut hero = ResponseObject::new("Q.Data.Hero").with_typename("Human");
        hero.insert("name", ResponseValue::String("Luke".to_string()));
        hero.insert("height", ResponseValue::Float(1.72));
        hero.insert("appearsIn", ResponseValue::List(vec![ResponseValue::Enum("JEDI".to_string())]));
        hero.insert("friends", ResponseValue::List(vec![friend.into(), ResponseValue::Null]));

        assert_eq!(hero.typename(), Some("Human"));
        assert_eq!(
            serde_json::to_string(&hero.to_json()).unwrap(),
            r#"{"name":"Luke","height":1.72,"appearsIn":["JEDI"],"friends":[{"name":"Leia"},null]}"#
        );
        assert_eq!(hero.get("appearsIn").unwrap().to_json(), json!(["JEDI"]));
    }
}
