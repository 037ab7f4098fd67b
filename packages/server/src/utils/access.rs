//! Ownership checks between the calling principal and the rows it touches.
//!
//! Acting on someone else's row is reported exactly like a missing row.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::user::AccountRole;
use crate::entity::{application, company, internship, student};
use crate::error::AppError;
use crate::extractors::auth::Principal;

/// `Ok` when `caller_id` owns the resource, otherwise `NotFound("<what> not found")`.
pub fn ensure_owner(owner_id: i32, caller_id: i32, what: &str) -> Result<(), AppError> {
    if owner_id == caller_id {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("{what} not found")))
    }
}

/// The caller's student profile.
pub async fn require_student<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
) -> Result<student::Model, AppError> {
    let not_found = || AppError::NotFound("Student profile not found".into());
    if principal.role != AccountRole::Student {
        return Err(not_found());
    }
    student::Entity::find()
        .filter(student::Column::UserId.eq(principal.user_id))
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// The caller's company profile.
pub async fn require_company<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
) -> Result<company::Model, AppError> {
    let not_found = || AppError::NotFound("Company profile not found".into());
    if principal.role != AccountRole::Company {
        return Err(not_found());
    }
    company::Entity::find()
        .filter(company::Column::UserId.eq(principal.user_id))
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// An internship owned by `company`.
pub async fn find_company_internship<C: ConnectionTrait>(
    db: &C,
    company: &company::Model,
    internship_id: i32,
) -> Result<internship::Model, AppError> {
    let internship = internship::Entity::find_by_id(internship_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Internship not found".into()))?;
    ensure_owner(internship.company_id, company.id, "Internship")?;
    Ok(internship)
}

/// An application to one of `company`'s internships, with that internship.
///
/// Ownership follows the internship, not the application's stored company.
pub async fn find_company_application<C: ConnectionTrait>(
    db: &C,
    company: &company::Model,
    application_id: i32,
) -> Result<(application::Model, internship::Model), AppError> {
    let not_found = || AppError::NotFound("Application not found".into());
    let app = application::Entity::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;
    let internship = internship::Entity::find_by_id(app.internship_id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(internship.company_id, company.id, "Application")?;
    Ok((app, internship))
}

/// One of `student`'s own applications.
pub async fn find_student_application<C: ConnectionTrait>(
    db: &C,
    student: &student::Model,
    application_id: i32,
) -> Result<application::Model, AppError> {
    let app = application::Entity::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))?;
    ensure_owner(app.student_id, student.id, "Application")?;
    Ok(app)
}
