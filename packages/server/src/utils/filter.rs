//! Narrowing of the public internship listing by query constraints.
//!
//! Everything except the technology match runs in SQL. Technology tags live in a
//! JSON column, so that predicate is applied to the fetched rows.

use std::collections::{BTreeSet, HashSet};

use sea_orm::sea_query::{
    Expr, Func, IntoColumnRef, LikeExpr, Query as SeaQuery, SelectStatement,
};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, ExprTrait, Order, QueryFilter, QueryOrder,
};

use crate::entity::{company, internship, internship_institution};
use crate::error::AppError;
use crate::models::internship::InternshipListQuery;
use crate::models::shared::contains_pattern;
use crate::utils::tags::TagList;

/// Fetch the active internships of verified, active companies that satisfy `query`.
pub async fn find_listed_internships<C: ConnectionTrait>(
    db: &C,
    query: &InternshipListQuery,
) -> Result<Vec<internship::Model>, AppError> {
    let (sort_column, sort_order) = parse_ordering(query.ordering.as_deref())?;

    let mut select = internship::Entity::find()
        .filter(internship::Column::IsActive.eq(true))
        .filter(internship::Column::CompanyId.in_subquery(listed_company_ids()));

    if let Some(company_id) = query.company {
        select = select.filter(internship::Column::CompanyId.eq(company_id));
    }

    if let Some(pattern) = query.company_name.as_deref().and_then(contains_pattern) {
        select = select.filter(internship::Column::CompanyId.in_subquery(company_ids_named(&pattern)));
    }

    if let Some(pattern) = query.location.as_deref().and_then(contains_pattern) {
        select = select.filter(lower_like(internship::Column::Location, &pattern));
    }

    if let Some(institution_id) = query.institution {
        select = select.filter(
            internship::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(internship_institution::Column::InternshipId)
                    .from(internship_institution::Entity)
                    .and_where(internship_institution::Column::InstitutionId.eq(institution_id))
                    .to_owned(),
            ),
        );
    }

    if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
        select = select.filter(
            Condition::any()
                .add(lower_like(internship::Column::Position, &pattern))
                .add(lower_like(internship::Column::Description, &pattern))
                .add(lower_like(internship::Column::Location, &pattern))
                .add(internship::Column::CompanyId.in_subquery(company_ids_named(&pattern))),
        );
    }

    let wanted = query
        .tech_stack
        .as_deref()
        .map(TagList::parse)
        .unwrap_or_default();

    let rows = select
        .order_by(sort_column, sort_order)
        .order_by_desc(internship::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter(|m| matches_tech_stack(&TagList::from_json(&m.tech_stack), &wanted))
        .collect())
}

/// Ids of companies allowed in public listings.
pub fn listed_company_ids() -> SelectStatement {
    SeaQuery::select()
        .column(company::Column::Id)
        .from(company::Entity)
        .and_where(company::Column::IsVerified.eq(true))
        .and_where(company::Column::IsActive.eq(true))
        .to_owned()
}

fn company_ids_named(pattern: &str) -> SelectStatement {
    SeaQuery::select()
        .column(company::Column::Id)
        .from(company::Entity)
        .cond_where(lower_like(company::Column::Name, pattern))
        .to_owned()
}

/// `lower(col) LIKE pattern ESCAPE '\'`; `pattern` must already be lowercased and escaped.
pub fn lower_like<T: IntoColumnRef>(col: T, pattern: &str) -> Condition {
    Condition::all()
        .add(Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\')))
}

/// Resolve an `ordering` value (`field` or `-field`) against the sortable `fields`.
/// Blank or missing values fall back to `default`.
pub fn resolve_ordering<C: Copy>(
    raw: Option<&str>,
    default: &str,
    fields: &[(&str, C)],
) -> Result<(C, Order), AppError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default);
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (raw, Order::Asc),
    };
    fields
        .iter()
        .find(|(name, _)| *name == field)
        .map(|&(_, column)| (column, order))
        .ok_or_else(|| {
            let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
            AppError::Validation(format!(
                "ordering must be one of: {} (optionally prefixed with '-')",
                names.join(", ")
            ))
        })
}

/// Map the internship `ordering` parameter to a sort column. Defaults to newest first.
pub fn parse_ordering(raw: Option<&str>) -> Result<(internship::Column, Order), AppError> {
    resolve_ordering(
        raw,
        "-created_at",
        &[
            ("start_date", internship::Column::StartDate),
            ("end_date", internship::Column::EndDate),
            ("created_at", internship::Column::CreatedAt),
        ],
    )
}

/// True when any tag equals any wanted tag, ignoring case. No wanted tags matches everything.
pub fn matches_tech_stack(tags: &TagList, wanted: &TagList) -> bool {
    wanted.is_empty() || wanted.as_slice().iter().any(|w| tags.contains(w))
}

/// Distinct ids in first-seen order.
pub fn distinct_in_order(ids: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Sorted union of tags. Spellings differing only in case stay distinct.
pub fn available_techs(lists: impl IntoIterator<Item = TagList>) -> Vec<String> {
    lists
        .into_iter()
        .flat_map(TagList::into_vec)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
