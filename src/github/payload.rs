use serde_json::Value;

/// Read-only view over an inbound webhook body.
///
/// Every lookup walks a key path and falls back to an empty/zero value when a
/// segment is missing or has the wrong type. No schema is enforced.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    value: &'a Value,
}

static NULL: Value = Value::Null;

impl<'a> Payload<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Sub-tree at `path`, or a null view if absent.
    pub fn at(&self, path: &[&str]) -> Payload<'a> {
        let mut current = self.value;
        for key in path {
            match current.get(*key) {
                Some(next) => current = next,
                None => return Payload { value: &NULL },
            }
        }
        Payload { value: current }
    }

    pub fn str(&self, path: &[&str]) -> &'a str {
        self.at(path).value.as_str().unwrap_or_default()
    }

    /// Integer at `path`; float-encoded numbers are truncated.
    pub fn int(&self, path: &[&str]) -> i64 {
        let value = self.at(path).value;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .unwrap_or(0)
    }

    /// Array elements at `path`, or `None` when the value is not an array.
    pub fn array(&self, path: &[&str]) -> Option<Vec<Payload<'a>>> {
        self.at(path)
            .value
            .as_array()
            .map(|items| items.iter().map(Payload::new).collect())
    }
}
