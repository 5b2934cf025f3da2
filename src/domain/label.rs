use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Free-form tag that can be attached to any number of transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for Label {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Label {
    fn name(&self) -> &str {
        &self.name
    }
}
