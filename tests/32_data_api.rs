mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{bootcamp_body, database_app, offline_app, publisher_with_bootcamp, register, send, unique};

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let app = offline_app();

    let (status, body) = common::get(&app, "/api/v1/bootcamps/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Bootcamp not found with id of not-a-uuid" }));

    let (status, body) = common::get(&app, "/api/v1/courses/123").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course not found with id of 123");

    let (status, _) = common::get(&app, "/api/v1/reviews/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn bootcamp_crud_and_ownership() {
    let app = database_app().await;
    let (token, id) = publisher_with_bootcamp(&app).await;

    let (status, body) = common::get(&app, &format!("/api/v1/bootcamps/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    let bootcamp = &body["data"];
    assert!(bootcamp["slug"].as_str().unwrap().starts_with("devworks-"));
    assert_eq!(bootcamp["location"]["type"], "Point");
    assert_eq!(bootcamp["location"]["coordinates"], json!([-71.10542, 42.35009]));
    assert_eq!(bootcamp["location"]["city"], "Boston");
    assert!(bootcamp.get("averageCost").is_none());

    // One bootcamp per publisher
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(&token),
        Some(bootcamp_body(&format!("Second {}", unique()))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("has already published a bootcamp"));

    // Rename re-slugs
    let new_name = format!("ModernTech {}", unique());
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/bootcamps/{}", id),
        Some(&token),
        Some(json!({ "name": new_name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["slug"].as_str().unwrap().starts_with("moderntech-"));

    // Another publisher cannot touch it
    let (other, _) = publisher_with_bootcamp(&app).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/bootcamps/{}", id),
        Some(&other),
        Some(json!({ "housing": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/bootcamps/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": {} }));

    let (status, _) = common::get(&app, &format!("/api/v1/bootcamps/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn bootcamp_validation_messages() {
    let app = database_app().await;
    let token = register(&app, "publisher").await;

    let mut body = bootcamp_body(&"x".repeat(51));
    body["careers"] = json!(["Web Development"]);
    let (status, response) = send(&app, Method::POST, "/api/v1/bootcamps", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Name cannot be more than 50 characters");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn courses_maintain_average_cost() {
    let app = database_app().await;
    let (token, bootcamp_id) = publisher_with_bootcamp(&app).await;

    let mut course_ids = Vec::new();
    for tuition in [8000.0, 10000.0] {
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/bootcamps/{}/courses", bootcamp_id),
            Some(&token),
            Some(json!({
                "title": "Front End Web Development",
                "description": "HTML, CSS and JavaScript",
                "weeks": 8,
                "tuition": tuition,
                "minimumSkill": "beginner",
                "scholarshipAvailable": true,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["bootcamp"], bootcamp_id.as_str());
        course_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (_, body) = common::get(&app, &format!("/api/v1/bootcamps/{}", bootcamp_id)).await;
    assert_eq!(body["data"]["averageCost"], json!(9000.0));

    let (status, body) = common::get(&app, &format!("/api/v1/bootcamps/{}/courses", bootcamp_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert!(body.get("pagination").is_none());

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/courses/{}", course_ids[0]),
        Some(&token),
        Some(json!({ "tuition": 12000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = common::get(&app, &format!("/api/v1/bootcamps/{}", bootcamp_id)).await;
    assert_eq!(body["data"]["averageCost"], json!(11000.0));

    for id in &course_ids {
        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/courses/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = common::get(&app, &format!("/api/v1/bootcamps/{}", bootcamp_id)).await;
    assert!(body["data"].get("averageCost").is_none());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn courses_require_bootcamp_ownership() {
    let app = database_app().await;
    let (_, bootcamp_id) = publisher_with_bootcamp(&app).await;
    let (other, _) = publisher_with_bootcamp(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/bootcamps/{}/courses", bootcamp_id),
        Some(&other),
        Some(json!({
            "title": "Intruder course",
            "description": "Should not be created",
            "weeks": 4,
            "tuition": 100,
            "minimumSkill": "advanced",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn reviews_maintain_average_rating() {
    let app = database_app().await;
    let (_, bootcamp_id) = publisher_with_bootcamp(&app).await;
    let reviews_uri = format!("/api/v1/bootcamps/{}/reviews", bootcamp_id);

    let first = register(&app, "user").await;
    let second = register(&app, "user").await;

    let review = |rating: i64| json!({ "title": "Learned a ton", "text": "Great instructors", "rating": rating });

    let (status, body) = send(&app, Method::POST, &reviews_uri, Some(&first), Some(review(10))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let first_review = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, &reviews_uri, Some(&second), Some(review(7))).await;
    assert_eq!(status, StatusCode::CREATED);

    // One review per user per bootcamp
    let (status, _) = send(&app, Method::POST, &reviews_uri, Some(&first), Some(review(1))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::POST, &reviews_uri, Some(&first), Some(review(11))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please add a rating between 1 and 10");

    let (_, body) = common::get(&app, &format!("/api/v1/bootcamps/{}", bootcamp_id)).await;
    assert_eq!(body["data"]["averageRating"], json!(8.5));

    // Only the author may edit
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/reviews/{}", first_review),
        Some(&second),
        Some(json!({ "rating": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/reviews/{}", first_review), Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = common::get(&app, &format!("/api/v1/bootcamps/{}", bootcamp_id)).await;
    assert_eq!(body["data"]["averageRating"], json!(7.0));

    let (_, body) = common::get(&app, &reviews_uri).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn radius_search_finds_nearby_bootcamps() {
    let app = database_app().await;
    let (_, bootcamp_id) = publisher_with_bootcamp(&app).await;

    let (status, body) = common::get(&app, "/api/v1/bootcamps/radius/02215/10").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&Value> = body["data"].as_array().unwrap().iter().map(|b| &b["id"]).collect();
    assert!(ids.contains(&&json!(bootcamp_id)));

    let (status, _) = common::get(&app, "/api/v1/bootcamps/radius/02215/far").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn radius_search_spans_half_the_globe() {
    let app = database_app().await;
    let token = register(&app, "publisher").await;
    let mut body = bootcamp_body(&format!("Far Side {}", unique()));
    body["address"] = json!("antipode");
    let (status, body) = send(&app, Method::POST, "/api/v1/bootcamps", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let far_side = body["data"]["id"].clone();

    let (status, body) = common::get(&app, "/api/v1/bootcamps/radius/02215/12451").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"].as_array().unwrap().iter().any(|b| b["id"] == far_side));

    let (status, body) = common::get(&app, "/api/v1/bootcamps/radius/02215/12000").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"].as_array().unwrap().iter().any(|b| b["id"] == far_side));
}
