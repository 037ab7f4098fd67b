use serde_json::json;

use crate::common::{TestApp, routes};

mod institutions {
    use super::*;

    #[tokio::test]
    async fn seeded_institutions_are_listed_and_searchable() {
        let app = TestApp::spawn().await;

        let all = app.get_without_token(routes::INSTITUTIONS).await;
        assert_eq!(all.status, 200);
        assert_eq!(all.body.as_array().unwrap().len(), 2);

        let res = app
            .get_without_token(&format!("{}?search=UNIVERSITY", routes::INSTITUTIONS))
            .await;
        assert_eq!(res.pluck("kind"), vec![json!("university")]);
    }

    #[tokio::test]
    async fn institutions_can_be_ordered_by_name_descending() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&format!("{}?ordering=-name", routes::INSTITUTIONS))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.pluck("name"),
            vec![
                json!("Chuvash State University"),
                json!("Cheboksary Polytechnic College"),
            ]
        );
    }
}

mod companies {
    use super::*;

    #[tokio::test]
    async fn unverified_and_inactive_companies_are_hidden() {
        let app = TestApp::spawn().await;
        app.create_company("listed", None, true).await;
        let hidden_token = app.create_company("pending", None, false).await;
        app.create_company("closed", None, true).await;
        app.set_company_active("closed", false).await;
        // An active internship does not make an unverified company visible.
        app.create_internship(&hidden_token, "Intern", &["Rust"]).await;

        let res = app.get_without_token(routes::COMPANIES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.pluck("name"), vec![json!("listed Inc")]);

        let id = app.company_id("pending").await;
        let res = app.get_without_token(&routes::company(id)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn company_rating_is_the_mean_of_reviews() {
        let app = TestApp::spawn().await;
        app.create_company("acme", None, true).await;
        let company_id = app.company_id("acme").await;

        for (name, rating) in [("s1", 4), ("s2", 5)] {
            let token = app.create_student(name).await;
            let res = app
                .post_with_token(
                    routes::REVIEWS,
                    &json!({"company_id": company_id, "rating": rating, "comment": "ok"}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app.get_without_token(&routes::company(company_id)).await;

        assert_eq!(res.body["rating"], 4.5);
        assert_eq!(res.body["reviews_count"], 2);
    }

    #[tokio::test]
    async fn with_internships_groups_matches_by_company() {
        let app = TestApp::spawn().await;
        let acme = app.create_company("acme", None, true).await;
        let globex = app.create_company("globex", None, true).await;
        app.create_company("idle", None, true).await;
        app.create_internship(&acme, "Backend", &["Go"]).await;
        app.create_internship(&acme, "Frontend", &["TypeScript"]).await;
        app.create_internship(&globex, "Data", &["Python"]).await;

        let res = app
            .get_without_token(&format!(
                "{}?tech_stack=go,python",
                routes::COMPANIES_WITH_INTERNSHIPS
            ))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        // globex has the newest match, but groups still come back by name.
        assert_eq!(res.pluck("name"), vec![json!("acme Inc"), json!("globex Inc")]);
        for group in res.body.as_array().unwrap() {
            assert_eq!(group["internships"].as_array().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn ordering_switches_the_sort_column() {
        let app = TestApp::spawn().await;
        app.create_company("zeta", None, true).await;
        app.create_company("acme", None, true).await;

        let by_name = app.get_without_token(routes::COMPANIES).await;
        assert_eq!(by_name.pluck("name"), vec![json!("acme Inc"), json!("zeta Inc")]);

        let newest = app
            .get_without_token(&format!("{}?ordering=-created_at", routes::COMPANIES))
            .await;
        assert_eq!(newest.status, 200, "{}", newest.text);
        assert_eq!(newest.pluck("name"), vec![json!("acme Inc"), json!("zeta Inc")]);

        let oldest = app
            .get_without_token(&format!("{}?ordering=created_at", routes::COMPANIES))
            .await;
        assert_eq!(oldest.pluck("name"), vec![json!("zeta Inc"), json!("acme Inc")]);

        let bad = app
            .get_without_token(&format!("{}?ordering=rating", routes::COMPANIES))
            .await;
        assert_eq!(bad.status, 400);
        assert_eq!(bad.body["code"], "VALIDATION_ERROR");
    }
}

mod internships {
    use super::*;

    #[tokio::test]
    async fn inactive_internships_are_not_listed() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, true).await;
        let open = app.create_internship(&token, "Open", &[]).await;
        let closed = app.create_internship(&token, "Closed", &[]).await;
        let res = app
            .patch_with_token(
                &routes::own_internship(closed),
                &json!({"is_active": false}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_without_token(routes::INTERNSHIPS).await;
        assert_eq!(res.pluck("id"), vec![json!(open)]);

        let res = app.get_without_token(&routes::internship(closed)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn internships_of_unlisted_companies_are_hidden() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, false).await;
        let id = app.create_internship(&token, "Intern", &[]).await;

        let res = app.get_without_token(routes::INTERNSHIPS).await;
        assert!(res.body.as_array().unwrap().is_empty());

        let res = app.get_without_token(&routes::internship(id)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn tech_filter_matches_any_tag_ignoring_case() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, true).await;
        let py = app.create_internship(&token, "A", &["python", "Django"]).await;
        let go = app.create_internship(&token, "B", &["GO"]).await;
        app.create_internship(&token, "C", &["Rust", "Golang"]).await;
        app.create_internship(&token, "D", &[]).await;

        let res = app
            .get_without_token(&format!(
                "{}?tech_stack=Python,Go&ordering=created_at",
                routes::INTERNSHIPS
            ))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.pluck("id"), vec![json!(py), json!(go)]);
    }

    #[tokio::test]
    async fn search_covers_company_name() {
        let app = TestApp::spawn().await;
        let acme = app.create_company("acme", None, true).await;
        let globex = app.create_company("globex", None, true).await;
        let id = app.create_internship(&acme, "Intern", &[]).await;
        app.create_internship(&globex, "Intern", &[]).await;

        let res = app
            .get_without_token(&format!("{}?search=ACME", routes::INTERNSHIPS))
            .await;

        assert_eq!(res.pluck("id"), vec![json!(id)]);
    }

    #[tokio::test]
    async fn institution_filter_uses_offered_institutions() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, true).await;
        let institution_id = app.institution_id().await;
        let res = app
            .post_with_token(
                routes::OWN_INTERNSHIPS,
                &json!({
                    "position": "Targeted",
                    "location": "Cheboksary",
                    "start_date": "2030-06-01",
                    "end_date": "2030-08-31",
                    "institution_ids": [institution_id],
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let targeted = res.id();
        app.create_internship(&token, "Open to all", &[]).await;

        let res = app
            .get_without_token(&format!(
                "{}?institution={institution_id}",
                routes::INTERNSHIPS
            ))
            .await;

        assert_eq!(res.pluck("id"), vec![json!(targeted)]);
    }

    #[tokio::test]
    async fn unknown_ordering_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&format!("{}?ordering=salary", routes::INTERNSHIPS))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn available_techs_are_distinct_and_sorted_by_spelling() {
        let app = TestApp::spawn().await;
        let token = app.create_company("acme", None, true).await;
        app.create_internship(&token, "A", &["Rust", "go"]).await;
        app.create_internship(&token, "B", &["Go", "Ada"]).await;

        let res = app.get_without_token(routes::AVAILABLE_TECHS).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!(["Ada", "Go", "Rust", "go"]));
    }
}
