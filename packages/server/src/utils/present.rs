//! Turns entity rows into response payloads, batch-loading the related rows
//! (companies, institutions, ratings, applicants) each view embeds.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{
    application, company, institution, internship, internship_institution, review, student, user,
};
use crate::error::AppError;
use crate::models::application::{ApplicantResponse, ApplicationInternship, ApplicationResponse};
use crate::models::company::{CompanyProfileResponse, CompanyResponse, RatingSummary};
use crate::models::institution::InstitutionResponse;
use crate::models::internship::InternshipResponse;
use crate::models::review::ReviewResponse;
use crate::models::student::StudentProfileResponse;
use crate::utils::media::optional_media_url;
use crate::utils::tags::TagList;

/// Aggregate ratings for the given companies. Companies without reviews are absent.
pub async fn rating_summaries<C: ConnectionTrait>(
    db: &C,
    company_ids: &[i32],
) -> Result<HashMap<i32, RatingSummary>, AppError> {
    let mut summaries: HashMap<i32, RatingSummary> = HashMap::new();
    if company_ids.is_empty() {
        return Ok(summaries);
    }
    let rows: Vec<(i32, i32)> = review::Entity::find()
        .select_only()
        .column(review::Column::CompanyId)
        .column(review::Column::Rating)
        .filter(review::Column::CompanyId.is_in(company_ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;
    for (company_id, rating) in rows {
        summaries.entry(company_id).or_default().add(rating);
    }
    Ok(summaries)
}

pub async fn company_responses<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    companies: Vec<company::Model>,
) -> Result<Vec<CompanyResponse>, AppError> {
    let ids: Vec<i32> = companies.iter().map(|c| c.id).collect();
    let ratings = rating_summaries(db, &ids).await?;
    Ok(companies
        .into_iter()
        .map(|c| {
            let logo_url = optional_media_url(public_url, c.logo.as_deref());
            let rating = ratings.get(&c.id).copied().unwrap_or_default();
            CompanyResponse::from_model(c, logo_url, rating)
        })
        .collect())
}

pub async fn company_response<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    company: company::Model,
) -> Result<CompanyResponse, AppError> {
    company_responses(db, public_url, vec![company])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("company response missing".into()))
}

pub async fn company_profile<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    account: user::Model,
    company: company::Model,
) -> Result<CompanyProfileResponse, AppError> {
    let email = company.email.clone();
    let is_active = company.is_active;
    let created_at = company.created_at;
    Ok(CompanyProfileResponse {
        company: company_response(db, public_url, company).await?,
        username: account.username,
        account_email: account.email,
        email,
        is_active,
        created_at,
    })
}

async fn institutions_by_id<C: ConnectionTrait>(
    db: &C,
    ids: Vec<i32>,
) -> Result<HashMap<i32, institution::Model>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(institution::Entity::find()
        .filter(institution::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect())
}

/// Internships with their company and institutions embedded, in input order.
pub async fn internship_responses<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    internships: Vec<internship::Model>,
) -> Result<Vec<InternshipResponse>, AppError> {
    if internships.is_empty() {
        return Ok(Vec::new());
    }
    let internship_ids: Vec<i32> = internships.iter().map(|i| i.id).collect();
    let company_ids: Vec<i32> = internships.iter().map(|i| i.company_id).collect();

    let companies = company::Entity::find()
        .filter(company::Column::Id.is_in(company_ids))
        .all(db)
        .await?;
    let companies: HashMap<i32, CompanyResponse> = company_responses(db, public_url, companies)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let links = internship_institution::Entity::find()
        .filter(internship_institution::Column::InternshipId.is_in(internship_ids))
        .all(db)
        .await?;
    let institutions =
        institutions_by_id(db, links.iter().map(|l| l.institution_id).collect()).await?;
    let mut offered_to: HashMap<i32, Vec<InstitutionResponse>> = HashMap::new();
    for link in &links {
        if let Some(inst) = institutions.get(&link.institution_id) {
            offered_to
                .entry(link.internship_id)
                .or_default()
                .push(InstitutionResponse::from(inst.clone()));
        }
    }

    internships
        .into_iter()
        .map(|m| {
            let company = companies
                .get(&m.company_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("company {} missing", m.company_id)))?;
            let mut insts = offered_to.remove(&m.id).unwrap_or_default();
            insts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(InternshipResponse::from_model(m, company, insts))
        })
        .collect()
}

pub async fn internship_response<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    internship: internship::Model,
) -> Result<InternshipResponse, AppError> {
    internship_responses(db, public_url, vec![internship])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("internship response missing".into()))
}

pub async fn student_profile<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    account: user::Model,
    student: student::Model,
) -> Result<StudentProfileResponse, AppError> {
    let institution = match student.institution_id {
        Some(id) => institution::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(InstitutionResponse::from),
        None => None,
    };
    Ok(StudentProfileResponse {
        id: student.id,
        username: account.username,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        institution,
        phone: student.phone,
        course: student.course,
        specialization: student.specialization,
        bio: student.bio,
        resume_url: optional_media_url(public_url, student.resume.as_deref()),
        skills: TagList::from_json(&student.skills),
        interests: TagList::from_json(&student.interests),
        is_active: student.is_active,
        created_at: student.created_at,
        updated_at: student.updated_at,
    })
}

async fn load_applicants<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    student_ids: Vec<i32>,
) -> Result<HashMap<i32, ApplicantResponse>, AppError> {
    let students = student::Entity::find()
        .filter(student::Column::Id.is_in(student_ids))
        .all(db)
        .await?;
    let accounts: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(students.iter().map(|s| s.user_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let institutions =
        institutions_by_id(db, students.iter().filter_map(|s| s.institution_id).collect()).await?;

    let mut out = HashMap::new();
    for s in students {
        let Some(account) = accounts.get(&s.user_id) else {
            continue;
        };
        out.insert(
            s.id,
            ApplicantResponse {
                id: s.id,
                full_name: account.full_name(),
                email: account.email.clone(),
                phone: s.phone,
                institution: s
                    .institution_id
                    .and_then(|id| institutions.get(&id))
                    .map(|i| i.name.clone()),
                course: s.course,
                specialization: s.specialization,
                bio: s.bio,
                resume_url: optional_media_url(public_url, s.resume.as_deref()),
                skills: TagList::from_json(&s.skills),
                interests: TagList::from_json(&s.interests),
            },
        );
    }
    Ok(out)
}

/// Applications with a condensed internship; `with_applicant` adds student details
/// for company-facing views.
pub async fn application_responses<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    apps: Vec<application::Model>,
    with_applicant: bool,
) -> Result<Vec<ApplicationResponse>, AppError> {
    if apps.is_empty() {
        return Ok(Vec::new());
    }
    let internships: HashMap<i32, internship::Model> = internship::Entity::find()
        .filter(internship::Column::Id.is_in(apps.iter().map(|a| a.internship_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();
    let company_names: HashMap<i32, String> = company::Entity::find()
        .filter(
            company::Column::Id
                .is_in(internships.values().map(|i| i.company_id).collect::<Vec<_>>()),
        )
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let mut applicants = if with_applicant {
        load_applicants(db, public_url, apps.iter().map(|a| a.student_id).collect()).await?
    } else {
        HashMap::new()
    };

    apps.into_iter()
        .map(|app| {
            let i = internships
                .get(&app.internship_id)
                .ok_or_else(|| AppError::Internal(format!("internship {} missing", app.internship_id)))?;
            let summary = ApplicationInternship {
                id: i.id,
                position: i.position.clone(),
                location: i.location.clone(),
                start_date: i.start_date,
                end_date: i.end_date,
                company_id: i.company_id,
                company_name: company_names.get(&i.company_id).cloned().unwrap_or_default(),
            };
            let student = applicants.remove(&app.student_id);
            Ok(ApplicationResponse::from_model(app, summary, student))
        })
        .collect()
}

pub async fn application_response<C: ConnectionTrait>(
    db: &C,
    public_url: &str,
    app: application::Model,
    with_applicant: bool,
) -> Result<ApplicationResponse, AppError> {
    application_responses(db, public_url, vec![app], with_applicant)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("application response missing".into()))
}

/// Reviews with author names resolved; anonymous reviews hide them.
pub async fn review_responses<C: ConnectionTrait>(
    db: &C,
    reviews: Vec<review::Model>,
) -> Result<Vec<ReviewResponse>, AppError> {
    let student_ids: Vec<i32> = reviews.iter().map(|r| r.student_id).collect();
    let students: HashMap<i32, i32> = if student_ids.is_empty() {
        HashMap::new()
    } else {
        student::Entity::find()
            .filter(student::Column::Id.is_in(student_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.user_id))
            .collect()
    };
    let names: HashMap<i32, String> = if students.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(students.values().copied().collect::<Vec<_>>()))
            .all(db)
            .await?
            .into_iter()
            .map(|u| {
                let name = u.full_name();
                (u.id, if name.is_empty() { u.username } else { name })
            })
            .collect()
    };
    Ok(reviews
        .into_iter()
        .map(|r| {
            let author = students
                .get(&r.student_id)
                .and_then(|uid| names.get(uid))
                .cloned();
            ReviewResponse::from_model(r, author)
        })
        .collect())
}
