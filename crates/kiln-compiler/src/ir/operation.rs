//! The closed set of operation kinds.
//!
//! Every name the generator mints flows from the three lookup tables here:
//! the externally visible api name, the data-access client method, and the
//! route segment. The tables are fixed; nothing derives these strings at
//! runtime.

use serde::Serialize;

/// Read/write classification used by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
    Read,
    Write,
}

/// One of the supported CRUD/aggregate operation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Create,
    CreateMany,
    FindFirst,
    FindMany,
    FindById,
    Update,
    UpdateMany,
    Upsert,
    Delete,
    DeleteMany,
    Count,
    Aggregate,
    GroupBy,
}

impl OperationKind {
    /// Every kind, in the fixed order procedures are synthesized in.
    pub const ALL: [Self; 13] = [
        Self::Create,
        Self::CreateMany,
        Self::FindFirst,
        Self::FindMany,
        Self::FindById,
        Self::Update,
        Self::UpdateMany,
        Self::Upsert,
        Self::Delete,
        Self::DeleteMany,
        Self::Count,
        Self::Aggregate,
        Self::GroupBy,
    ];

    /// Kinds force-included even when an explicit allow-list omits them.
    /// Guarantees a minimally usable API; deliberate policy, not an
    /// oversight.
    pub const ESSENTIAL: [Self; 6] = [
        Self::Create,
        Self::FindMany,
        Self::FindById,
        Self::Update,
        Self::Delete,
        Self::Count,
    ];

    /// Fixed read/write classification.
    pub fn classification(self) -> AccessClass {
        match self {
            Self::Create
            | Self::CreateMany
            | Self::Update
            | Self::UpdateMany
            | Self::Upsert
            | Self::Delete
            | Self::DeleteMany => AccessClass::Write,
            Self::FindFirst
            | Self::FindMany
            | Self::FindById
            | Self::Count
            | Self::Aggregate
            | Self::GroupBy => AccessClass::Read,
        }
    }

    pub fn is_write(self) -> bool {
        self.classification() == AccessClass::Write
    }

    /// Externally visible base operation name.
    ///
    /// Note `findById`: the api name is distinct from the underlying
    /// data-access call (`findUnique`).
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::CreateMany => "createMany",
            Self::FindFirst => "findFirst",
            Self::FindMany => "findMany",
            Self::FindById => "findById",
            Self::Update => "update",
            Self::UpdateMany => "updateMany",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
            Self::DeleteMany => "deleteMany",
            Self::Count => "count",
            Self::Aggregate => "aggregate",
            Self::GroupBy => "groupBy",
        }
    }

    /// Data-access client method the operation lowers to, before any
    /// soft-delete rewrite.
    pub fn client_method(self) -> &'static str {
        match self {
            Self::FindById => "findUnique",
            other => other.api_name(),
        }
    }

    /// Route path segment.
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::CreateMany => "create-many",
            Self::FindFirst => "find-first",
            Self::FindMany => "find-many",
            Self::FindById => "find-by-id",
            Self::Update => "update",
            Self::UpdateMany => "update-many",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
            Self::DeleteMany => "delete-many",
            Self::Count => "count",
            Self::Aggregate => "aggregate",
            Self::GroupBy => "group-by",
        }
    }

    /// Parse an operation kind from a string. Accepts both route-segment
    /// (kebab) and api-name (camel) spellings.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.route_segment() == s || k.api_name() == s)
    }

    /// True for operations whose result is count-shaped (`{ count: N }`).
    pub fn returns_count(self) -> bool {
        matches!(
            self,
            Self::CreateMany | Self::UpdateMany | Self::DeleteMany | Self::Count
        )
    }
}
