use serde::{Deserialize, Serialize};

use crate::entity::institution::{self, InstitutionKind};

/// Query parameters for the institution listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstitutionListQuery {
    /// Case-insensitive name substring.
    pub search: Option<String>,
    /// `name` or `created_at`, prefix with `-` for descending. Defaults to `name`.
    pub ordering: Option<String>,
}

#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct InstitutionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Northfield State University")]
    pub name: String,
    pub kind: InstitutionKind,
}

impl From<institution::Model> for InstitutionResponse {
    fn from(m: institution::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            kind: m.kind,
        }
    }
}
