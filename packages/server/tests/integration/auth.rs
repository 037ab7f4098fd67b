use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;
use uuid::Uuid;

use server::entity::user;

use crate::common::{TestApp, routes};

fn student_body(username: &str, email: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "password": "securepass",
        "password_confirm": "securepass",
    })
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn student_can_register_and_gets_a_session() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::STUDENT_REGISTER,
                &student_body("alice", "alice@example.com"),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["role"], "student");
        assert_eq!(res.body["profile"]["email"], "alice@example.com");
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_field_error() {
        let app = TestApp::spawn().await;
        app.create_student("alice").await;

        let res = app
            .post_without_token(
                routes::STUDENT_REGISTER,
                &student_body("alice", "other@example.com"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["fields"]["username"].is_array());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let app = TestApp::spawn().await;
        app.create_student("alice").await;

        let res = app
            .post_without_token(
                routes::STUDENT_REGISTER,
                &student_body("alice2", "alice@example.com"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["email"].is_array());
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::STUDENT_REGISTER,
                &json!({
                    "username": "bob",
                    "email": "bob@example.com",
                    "password": "securepass",
                    "password_confirm": "different",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["password_confirm"].is_array());
    }

    #[tokio::test]
    async fn unknown_institution_is_rejected() {
        let app = TestApp::spawn().await;

        let mut body = student_body("bob", "bob@example.com");
        body["institution_id"] = json!(999_999);
        let res = app.post_without_token(routes::STUDENT_REGISTER, &body).await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["institution_id"].is_array());
    }

    #[tokio::test]
    async fn company_starts_unverified() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, false).await;

        let res = app.get_with_token(routes::COMPANY_PROFILE, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "acme Inc");
        assert_eq!(res.body["is_verified"], false);
        assert!(res.body["email"].is_null());
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn student_can_log_in() {
        let app = TestApp::spawn().await;
        app.create_student("alice").await;

        let res = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"username": "alice", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "student");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_student("alice").await;

        let res = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"username": "alice", "password": "wrongpass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn company_cannot_use_the_student_login() {
        let app = TestApp::spawn().await;
        app.create_company("acme", None, true).await;

        let res = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"username": "acme", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod session {
    use super::*;
    use server::entity::session;

    #[tokio::test]
    async fn status_reports_anonymous_callers() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::STATUS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["authenticated"], false);
    }

    #[tokio::test]
    async fn status_reports_the_logged_in_role() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, false).await;

        let res = app.get_with_token(routes::STATUS, &token).await;

        assert_eq!(res.body["authenticated"], true);
        assert_eq!(res.body["username"], "acme");
        assert_eq!(res.body["role"], "company");
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let app = TestApp::spawn().await;
        let token = app.create_student("alice").await;

        let res = app.post_with_token(routes::LOGOUT, &json!({}), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(routes::STUDENT_PROFILE, &token).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "SESSION_INVALID");
    }

    #[tokio::test]
    async fn login_purges_expired_sessions() {
        let app = TestApp::spawn().await;
        app.create_student("alice").await;
        let account = user::Entity::find()
            .filter(user::Column::Username.eq("alice"))
            .one(&app.db)
            .await
            .unwrap()
            .expect("user should exist");
        let stale = session::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(account.id),
            created_at: Set(Utc::now() - Duration::days(30)),
            expires_at: Set(Utc::now() - Duration::days(1)),
        }
        .insert(&app.db)
        .await
        .unwrap();

        let res = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"username": "alice", "password": "securepass"}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        assert!(
            session::Entity::find_by_id(stale.id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
        let live = session::Entity::find()
            .filter(session::Column::UserId.eq(account.id))
            .all(&app.db)
            .await
            .unwrap();
        assert_eq!(live.len(), 2);
    }

    #[tokio::test]
    async fn profile_requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::STUDENT_PROFILE).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "NOT_AUTHENTICATED");
    }

    #[tokio::test]
    async fn csrf_endpoint_sets_a_readable_cookie() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .get(app.url(routes::CSRF))
            .send()
            .await
            .expect("Failed to send GET request");

        let cookie = res
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("csrftoken="))
            .map(str::to_string)
            .expect("csrftoken cookie should be set");
        assert!(!cookie.to_ascii_lowercase().contains("httponly"));

        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["csrfToken"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn cookie_sessions_need_the_csrf_header_for_writes() {
        let app = TestApp::spawn().await;
        let token = app.create_student("alice").await;
        let cookies = format!("session={token}; csrftoken=abc123");

        let rejected = app
            .client
            .post(app.url(routes::LOGOUT))
            .header("Cookie", &cookies)
            .send()
            .await
            .unwrap();
        assert_eq!(rejected.status().as_u16(), 403);

        let accepted = app
            .client
            .post(app.url(routes::LOGOUT))
            .header("Cookie", &cookies)
            .header("X-CSRF-Token", "abc123")
            .send()
            .await
            .unwrap();
        assert_eq!(accepted.status().as_u16(), 204);
    }
}

mod profiles {
    use super::*;

    #[tokio::test]
    async fn student_profile_update_accepts_any_tag_form() {
        let app = TestApp::spawn().await;
        let token = app.create_student("alice").await;
        let institution_id = app.institution_id().await;

        let res = app
            .patch_with_token(
                routes::STUDENT_PROFILE,
                &json!({
                    "institution_id": institution_id,
                    "course": 3,
                    "skills": "[\"Python\", \"Go\"]",
                    "interests": "backend, data",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["course"], 3);
        assert_eq!(res.body["institution"]["id"], institution_id);
        assert_eq!(res.body["skills"], json!(["Python", "Go"]));
        assert_eq!(res.body["interests"], json!(["backend", "data"]));
    }

    #[tokio::test]
    async fn student_profile_rejects_out_of_range_course() {
        let app = TestApp::spawn().await;
        let token = app.create_student("alice").await;

        let res = app
            .patch_with_token(routes::STUDENT_PROFILE, &json!({"course": 9}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["course"].is_array());
    }

    #[tokio::test]
    async fn company_cannot_read_the_student_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, false).await;

        let res = app.get_with_token(routes::STUDENT_PROFILE, &token).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn resume_upload_is_exposed_as_an_absolute_url() {
        let app = TestApp::spawn().await;
        let token = app.create_student("alice").await;

        let res = app
            .upload_with_token(
                routes::STUDENT_RESUME,
                "cv.pdf",
                "application/pdf",
                b"%PDF-1.4 resume".to_vec(),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let url = res.body["resume_url"].as_str().unwrap().to_string();
        assert!(url.starts_with("http://testserver/api/v1/media/resumes/"));

        let path = url.trim_start_matches("http://testserver");
        let file = app.get_without_token(path).await;
        assert_eq!(file.status, 200);
        assert_eq!(file.text, "%PDF-1.4 resume");
    }

    #[tokio::test]
    async fn resume_upload_rejects_unexpected_file_types() {
        let app = TestApp::spawn().await;
        let token = app.create_student("alice").await;

        let res = app
            .upload_with_token(
                routes::STUDENT_RESUME,
                "cv.exe",
                "application/octet-stream",
                b"MZ".to_vec(),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn company_profile_update_changes_contact_email() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, false).await;

        let res = app
            .patch_with_token(
                routes::COMPANY_PROFILE,
                &json!({"email": "jobs@acme.example", "website": "https://acme.example"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["email"], "jobs@acme.example");
        assert_eq!(res.body["website"], "https://acme.example");
    }

    #[tokio::test]
    async fn logo_upload_sets_logo_url() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, false).await;

        let res = app
            .upload_with_token(
                routes::COMPANY_LOGO,
                "logo.png",
                "image/png",
                vec![0x89, b'P', b'N', b'G'],
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(
            res.body["logo_url"]
                .as_str()
                .unwrap()
                .starts_with("http://testserver/api/v1/media/logos/")
        );
    }
}
