use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::pipeline::Direction;
use crate::resource::{Deletable, NoCriteria, Resource, SortKey, Updatable};
use crate::samples;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierSortField {
    Name,
    ContactPerson,
    Email,
    CreatedAt,
}

impl Resource for Supplier {
    const ENDPOINT: &'static str = "suppliers";
    const LABEL: &'static str = "supplier";

    type Draft = NewSupplier;
    type SortField = SupplierSortField;
    type Criteria = NoCriteria;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.contact_person.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.address.as_str(),
        ]
    }

    fn sort_key(&self, field: SupplierSortField) -> SortKey<'_> {
        match field {
            SupplierSortField::Name => SortKey::Text(&self.name),
            SupplierSortField::ContactPerson => SortKey::Text(&self.contact_person),
            SupplierSortField::Email => SortKey::Text(&self.email),
            SupplierSortField::CreatedAt => SortKey::Time(self.created_at),
        }
    }

    fn default_sort() -> (SupplierSortField, Direction) {
        (SupplierSortField::Name, Direction::Asc)
    }

    fn samples() -> Vec<Self> {
        samples::suppliers()
    }

    fn from_draft(id: i64, draft: &NewSupplier, now: DateTime<Utc>) -> Self {
        Supplier {
            id,
            name: draft.name.clone(),
            contact_person: draft.contact_person.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Updatable for Supplier {
    fn apply_draft(&mut self, draft: &NewSupplier, now: DateTime<Utc>) {
        self.name = draft.name.clone();
        self.contact_person = draft.contact_person.clone();
        self.email = draft.email.clone();
        self.phone = draft.phone.clone();
        self.address = draft.address.clone();
        self.updated_at = now.max(self.created_at);
    }
}

impl Deletable for Supplier {}
