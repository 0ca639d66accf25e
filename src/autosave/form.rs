use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Select,
    Checkbox,
    Radio,
}

impl FieldKind {
    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, value)
    }

    pub fn select(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Select, value)
    }

    pub fn checkbox(name: impl Into<String>, value: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(name, FieldKind::Checkbox, value)
        }
    }

    pub fn radio(name: impl Into<String>, value: impl Into<String>, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(name, FieldKind::Radio, value)
        }
    }

    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            checked: false,
        }
    }
}

/// A user edit routed to a tracked form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Value { name: String, value: String },
    Checked { name: String, value: String, checked: bool },
}

impl FieldChange {
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Value {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn checked(name: impl Into<String>, value: impl Into<String>, checked: bool) -> Self {
        Self::Checked {
            name: name.into(),
            value: value.into(),
            checked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedForm {
    pub id: String,
    pub fields: Vec<FormField>,
}

impl TrackedForm {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Field-value mapping as a form submission would see it: checkable
    /// fields contribute only while checked, later fields win on name clashes.
    pub fn field_values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|field| !field.kind.is_checkable() || field.checked)
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }

    /// Checkbox and radio fields are checked when their value equals the
    /// stored value; every other field takes the stored value directly.
    /// Fields absent from `values` are left untouched.
    pub fn apply_values(&mut self, values: &BTreeMap<String, String>) {
        for field in &mut self.fields {
            let Some(stored) = values.get(&field.name) else {
                continue;
            };
            if field.kind.is_checkable() {
                field.checked = field.value == *stored;
            } else {
                field.value = stored.clone();
            }
        }
    }

    /// Returns false when no field matches the change.
    pub fn apply_change(&mut self, change: &FieldChange) -> bool {
        match change {
            FieldChange::Value { name, value } => {
                let mut matched = false;
                for field in self
                    .fields
                    .iter_mut()
                    .filter(|field| field.name == *name && !field.kind.is_checkable())
                {
                    field.value = value.clone();
                    matched = true;
                }
                matched
            }
            FieldChange::Checked {
                name,
                value,
                checked,
            } => {
                let Some(target) = self.fields.iter().position(|field| {
                    field.name == *name && field.kind.is_checkable() && field.value == *value
                }) else {
                    return false;
                };

                if self.fields[target].kind == FieldKind::Radio && *checked {
                    for field in self
                        .fields
                        .iter_mut()
                        .filter(|field| field.name == *name && field.kind == FieldKind::Radio)
                    {
                        field.checked = false;
                    }
                }
                self.fields[target].checked = *checked;
                true
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }
}
