use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use std::sync::Arc;

use server::entity::application;
use server::notify::{NotifyOutcome, notify_company_of_application};

use crate::common::{FailingMailer, RecordingMailer, TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn student_applies_once_per_internship() {
        let app = TestApp::spawn().await;
        let company = app
            .create_company("acme", Some("hr@acme.example"), true)
            .await;
        let internship_id = app.create_internship(&company, "Backend", &["Rust"]).await;
        app.create_student("alice").await;
        let token = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"username": "alice", "password": "securepass"}),
            )
            .await
            .token();

        let res = app
            .post_with_token(
                routes::APPLICATIONS,
                &json!({"internship_id": internship_id, "comment": "interested"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["comment"], "interested");
        assert_eq!(res.body["internship"]["company_name"], "acme Inc");

        let rows = application::Entity::find()
            .filter(application::Column::InternshipId.eq(internship_id))
            .all(&app.db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company_id, app.company_id("acme").await);

        let again = app
            .post_with_token(
                routes::APPLICATIONS,
                &json!({"internship_id": internship_id, "comment": "really interested"}),
                &token,
            )
            .await;
        assert_eq!(again.status, 400);
        assert_eq!(again.body["code"], "CONFLICT");

        let count = application::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn company_is_emailed_about_new_applications() {
        let app = TestApp::spawn().await;
        let company = app
            .create_company("acme", Some("hr@acme.example"), true)
            .await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;

        app.apply(&token, internship_id).await;

        let sent = app.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "hr@acme.example");
        assert!(sent[0].subject.contains("Backend"));
        assert!(sent[0].text_body.contains("alice@example.com"));
        assert!(sent[0].text_body.contains("interested"));
    }

    #[tokio::test]
    async fn missing_contact_email_does_not_block_the_application() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;

        app.apply(&token, internship_id).await;

        assert!(app.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mail_transport_errors_do_not_block_the_application() {
        let app = TestApp::spawn_with_mailer(Arc::new(FailingMailer)).await;
        let company = app
            .create_company("acme", Some("hr@acme.example"), true)
            .await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;

        let res = app
            .post_with_token(
                routes::APPLICATIONS,
                &json!({"internship_id": internship_id}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let row = application::Entity::find_by_id(res.id())
            .one(&app.db)
            .await
            .unwrap()
            .expect("application should be stored");
        assert_eq!(row.internship_id, internship_id);
        assert_eq!(row.status.to_string(), "pending");
    }

    #[tokio::test]
    async fn closed_internships_cannot_be_applied_to() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        app.patch_with_token(
            &routes::own_internship(internship_id),
            &json!({"is_active": false}),
            &company,
        )
        .await;
        let token = app.create_student("alice").await;

        let res = app
            .post_with_token(
                routes::APPLICATIONS,
                &json!({"internship_id": internship_id}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn companies_cannot_apply() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;

        let res = app
            .post_with_token(
                routes::APPLICATIONS,
                &json!({"internship_id": internship_id}),
                &company,
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod notification {
    use super::*;

    async fn stored_application(app: &TestApp, id: i32) -> application::Model {
        application::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .expect("application should be stored")
    }

    #[tokio::test]
    async fn reports_sent_when_the_transport_accepts() {
        let app = TestApp::spawn().await;
        let company = app
            .create_company("acme", Some("hr@acme.example"), true)
            .await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;
        let row = stored_application(&app, app.apply(&token, internship_id).await).await;

        let mailer = RecordingMailer::default();
        let outcome =
            notify_company_of_application(&app.db, &mailer, "http://testserver", &row).await;

        assert_eq!(outcome, NotifyOutcome::Sent);
        assert_eq!(mailer.sent()[0].to, "hr@acme.example");
    }

    #[tokio::test]
    async fn reports_no_recipient_without_contact_email() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;
        let row = stored_application(&app, app.apply(&token, internship_id).await).await;

        let mailer = RecordingMailer::default();
        let outcome =
            notify_company_of_application(&app.db, &mailer, "http://testserver", &row).await;

        assert_eq!(outcome, NotifyOutcome::NoRecipient);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn reports_failed_when_the_transport_errors() {
        let app = TestApp::spawn().await;
        let company = app
            .create_company("acme", Some("hr@acme.example"), true)
            .await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;
        let row = stored_application(&app, app.apply(&token, internship_id).await).await;

        let outcome =
            notify_company_of_application(&app.db, &FailingMailer, "http://testserver", &row)
                .await;

        assert_eq!(outcome, NotifyOutcome::Failed);
    }
}

mod own_applications {
    use super::*;

    #[tokio::test]
    async fn students_only_see_their_own_applications() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let alice = app.create_student("alice").await;
        let bob = app.create_student("bob").await;
        let alice_app = app.apply(&alice, internship_id).await;
        app.apply(&bob, internship_id).await;

        let res = app.get_with_token(routes::APPLICATIONS, &alice).await;
        assert_eq!(res.pluck("id"), vec![json!(alice_app)]);
        assert!(res.body[0].get("student").is_none());

        let res = app.get_with_token(&routes::application(alice_app), &bob).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let first = app.create_internship(&company, "One", &[]).await;
        let second = app.create_internship(&company, "Two", &[]).await;
        let token = app.create_student("alice").await;
        let cancelled = app.apply(&token, first).await;
        let pending = app.apply(&token, second).await;
        app.patch_with_token(
            &routes::application(cancelled),
            &json!({"status": "cancelled"}),
            &token,
        )
        .await;

        let res = app
            .get_with_token(&format!("{}?status=pending", routes::APPLICATIONS), &token)
            .await;

        assert_eq!(res.pluck("id"), vec![json!(pending)]);
    }
}

mod cancel {
    use super::*;

    #[tokio::test]
    async fn accepted_application_can_still_be_cancelled() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;
        let id = app.apply(&token, internship_id).await;

        let res = app
            .patch_with_token(
                &routes::application_status(id),
                &json!({"status": "accepted"}),
                &company,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .patch_with_token(
                &routes::application(id),
                &json!({"status": "cancelled"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "cancelled");
    }

    #[tokio::test]
    async fn students_cannot_set_other_statuses() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;
        let id = app.apply(&token, internship_id).await;

        for status in ["accepted", "rejected", "pending"] {
            let res = app
                .patch_with_token(&routes::application(id), &json!({"status": status}), &token)
                .await;
            assert_eq!(res.status, 400, "status {status} should be refused");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let app = TestApp::spawn().await;
        let company = app.create_company("acme", None, true).await;
        let internship_id = app.create_internship(&company, "Backend", &[]).await;
        let token = app.create_student("alice").await;
        let id = app.apply(&token, internship_id).await;

        let res = app
            .patch_with_token(&routes::application(id), &json!({"status": "archived"}), &token)
            .await;

        assert_eq!(res.status, 400);
    }
}
