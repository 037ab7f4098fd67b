use chrono::Utc;
use sea_orm::*;
use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use tracing::info;

use crate::entity::institution::{self, InstitutionKind};
use crate::entity::{application, internship, review};

/// Institutions available on a fresh install.
const DEFAULT_INSTITUTIONS: &[(&str, InstitutionKind)] = &[
    ("Chuvash State University", InstitutionKind::University),
    ("Cheboksary Polytechnic College", InstitutionKind::College),
];

/// Insert the default institutions when the table is empty.
pub async fn seed_institutions(db: &DatabaseConnection) -> Result<(), DbErr> {
    if institution::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let now = Utc::now();
    institution::Entity::insert_many(DEFAULT_INSTITUTIONS.iter().map(|&(name, kind)| {
        institution::ActiveModel {
            name: Set(name.to_string()),
            kind: Set(kind),
            created_at: Set(now),
            ..Default::default()
        }
    }))
    .exec_without_returning(db)
    .await?;

    info!("Seeded {} institutions", DEFAULT_INSTITUTIONS.len());
    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &mut IndexCreateStatement) {
    let sql = stmt
        .if_not_exists()
        .name(name)
        .to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}

/// Create the composite indexes the listing queries rely on.
///
/// Failures are logged and skipped; the server still works without them.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Public listing: WHERE is_active ORDER BY created_at DESC
    create_index(
        db,
        "idx_internship_active_created",
        Index::create()
            .table(internship::Entity)
            .col(internship::Column::IsActive)
            .col(internship::Column::CreatedAt),
    )
    .await;

    create_index(
        db,
        "idx_internship_company",
        Index::create()
            .table(internship::Entity)
            .col(internship::Column::CompanyId),
    )
    .await;

    // Company portal: applications to one company filtered by status
    create_index(
        db,
        "idx_application_company_status",
        Index::create()
            .table(application::Entity)
            .col(application::Column::CompanyId)
            .col(application::Column::Status),
    )
    .await;

    create_index(
        db,
        "idx_application_student_created",
        Index::create()
            .table(application::Entity)
            .col(application::Column::StudentId)
            .col(application::Column::CreatedAt),
    )
    .await;

    create_index(
        db,
        "idx_review_company",
        Index::create()
            .table(review::Entity)
            .col(review::Column::CompanyId),
    )
    .await;

    Ok(())
}
