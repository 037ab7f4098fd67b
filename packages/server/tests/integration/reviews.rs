use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn one_review_per_student_and_company() {
    let app = TestApp::spawn().await;
    app.create_company("acme", None, true).await;
    let company_id = app.company_id("acme").await;
    let token = app.create_student("alice").await;
    let body = json!({"company_id": company_id, "rating": 5, "comment": "Great mentors"});

    let res = app.post_with_token(routes::REVIEWS, &body, &token).await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["author"], "Test Student");

    let res = app.post_with_token(routes::REVIEWS, &body, &token).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn rating_must_be_between_one_and_five() {
    let app = TestApp::spawn().await;
    app.create_company("acme", None, true).await;
    let company_id = app.company_id("acme").await;
    let token = app.create_student("alice").await;

    for rating in [0, 6] {
        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({"company_id": company_id, "rating": rating}),
                &token,
            )
            .await;
        assert_eq!(res.status, 400, "rating {rating} should be refused");
    }
}

#[tokio::test]
async fn anonymous_reviews_hide_the_author() {
    let app = TestApp::spawn().await;
    app.create_company("acme", None, true).await;
    let company_id = app.company_id("acme").await;
    let token = app.create_student("alice").await;
    app.post_with_token(
        routes::REVIEWS,
        &json!({"company_id": company_id, "rating": 2, "is_anonymous": true}),
        &token,
    )
    .await;

    let res = app
        .get_without_token(&format!("{}?company={company_id}", routes::REVIEWS))
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
    assert!(res.body[0]["author"].is_null());
}

#[tokio::test]
async fn unlisted_companies_cannot_be_reviewed() {
    let app = TestApp::spawn().await;
    app.create_company("acme", None, false).await;
    let company_id = app.company_id("acme").await;
    let token = app.create_student("alice").await;

    let res = app
        .post_with_token(
            routes::REVIEWS,
            &json!({"company_id": company_id, "rating": 4}),
            &token,
        )
        .await;

    assert_eq!(res.status, 404);
}
