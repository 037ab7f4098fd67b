//! Email notifications sent to companies when students apply.
//!
//! Delivery is best-effort: every failure is logged and reported as a
//! [`NotifyOutcome`], never as an error to the caller.

pub mod mailer;
pub mod template;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use tracing::instrument;

use crate::entity::{application, company, institution, internship, student, user};
use crate::utils::media::optional_media_url;
use crate::utils::tags::TagList;

pub use mailer::{DisabledMailer, MailError, Mailer, OutgoingEmail, SmtpMailer};
pub use template::ApplicationNotice;

/// Result of one notification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// The company has no contact email configured.
    NoRecipient,
    Failed,
}

#[derive(Debug, thiserror::Error)]
enum NoticeError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("{0} not found")]
    Missing(&'static str),
}

async fn build_notice<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    app: &application::Model,
) -> Result<(company::Model, ApplicationNotice), NoticeError> {
    let internship = internship::Entity::find_by_id(app.internship_id)
        .one(db)
        .await?
        .ok_or(NoticeError::Missing("internship"))?;
    // The owner of the internship is the recipient, whatever the application row says.
    let company = company::Entity::find_by_id(internship.company_id)
        .one(db)
        .await?
        .ok_or(NoticeError::Missing("company"))?;
    let student = student::Entity::find_by_id(app.student_id)
        .one(db)
        .await?
        .ok_or(NoticeError::Missing("student"))?;
    let account = user::Entity::find_by_id(student.user_id)
        .one(db)
        .await?
        .ok_or(NoticeError::Missing("user"))?;
    let institution = match student.institution_id {
        Some(id) => institution::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    let notice = ApplicationNotice {
        company_name: company.name.clone(),
        position: internship.position,
        student_name: account.full_name(),
        student_email: account.email,
        phone: student.phone,
        institution: institution.map(|i| i.name),
        course: student.course,
        specialization: student.specialization,
        bio: student.bio,
        skills: TagList::from_json(&student.skills).into_vec(),
        interests: TagList::from_json(&student.interests).into_vec(),
        resume_url: optional_media_url(public_url, student.resume.as_deref()),
        comment: app.comment.clone(),
    };
    Ok((company, notice))
}

/// Tell the owning company about a new application.
#[instrument(skip(db, mailer, public_url, app), fields(application_id = app.id))]
pub async fn notify_company_of_application<C: ConnectionTrait>(
    db: &C,
    mailer: &dyn Mailer,
    public_url: &str,
    app: &application::Model,
) -> NotifyOutcome {
    let (company, notice) = match build_notice(db, public_url, app).await {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to prepare application notification");
            return NotifyOutcome::Failed;
        }
    };

    let Some(to) = company.email.filter(|e| !e.trim().is_empty()) else {
        tracing::warn!(company = %company.name, "Company has no contact email; notification skipped");
        return NotifyOutcome::NoRecipient;
    };

    let email = OutgoingEmail {
        to,
        subject: notice.subject(),
        text_body: notice.text_body(),
        html_body: notice.html_body(),
    };

    match mailer.send(email).await {
        Ok(()) => {
            tracing::info!(company = %company.name, student = %notice.student_name, "Application notification sent");
            NotifyOutcome::Sent
        }
        Err(e) => {
            tracing::error!(company = %company.name, error = %e, "Application notification failed");
            NotifyOutcome::Failed
        }
    }
}
