use axum::http::StatusCode;
use integration_tests::{Auth, TestApp};
use serde_json::{json, Value};

async fn create(app: &TestApp, auth: &Auth, category: &str, title: &str) -> Value {
    let response = app
        .post(
            "/api/posts",
            json!({ "category": category, "type": "text", "title": title, "text": "body" }),
            auth,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn full_post_lifecycle() {
    let app = TestApp::bearer();
    let alice = app.sign_up("alice", "pw").await;
    let bob = app.sign_up("bob", "pw").await;

    let post = create(&app, &alice, "music", "hello").await;
    let post_id = id_of(&post);
    assert_eq!(post["score"], 1);
    assert_eq!(post["views"], 1);
    assert_eq!(post["upvotePercentage"], 100);

    // bob comments, then downvotes
    let commented = app
        .post(&format!("/api/post/{post_id}"), json!({ "comment": "nice" }), &bob)
        .await;
    assert_eq!(commented.status, StatusCode::CREATED);
    let comment = &commented.body["comments"][0];
    assert_eq!(comment["author"]["username"], "bob");
    let comment_id = id_of(comment);

    let downvoted = app.get(&format!("/api/post/{post_id}/downvote"), &bob).await;
    assert_eq!(downvoted.body["score"], 0);
    assert_eq!(downvoted.body["upvotePercentage"], 50);

    // alice may not delete bob's comment
    let stolen = app
        .delete(&format!("/api/post/{post_id}/{comment_id}"), &alice)
        .await;
    assert_eq!(stolen.status, StatusCode::UNAUTHORIZED);

    let removed = app.delete(&format!("/api/post/{post_id}/{comment_id}"), &bob).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["comments"], json!([]));

    // bob may not delete alice's post
    let refused = app.delete(&format!("/api/post/{post_id}"), &bob).await;
    assert_eq!(refused.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get(&format!("/api/post/{post_id}"), &Auth::Anonymous).await.status,
        StatusCode::OK
    );

    let deleted = app.delete(&format!("/api/post/{post_id}"), &alice).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "success");
    assert_eq!(
        app.get(&format!("/api/post/{post_id}"), &Auth::Anonymous).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn listings_filter_and_order_newest_first() {
    let app = TestApp::bearer();
    let alice = app.sign_up("alice", "pw").await;
    let bob = app.sign_up("bob", "pw").await;

    create(&app, &alice, "music", "first").await;
    create(&app, &bob, "funny", "second").await;
    create(&app, &alice, "funny", "third").await;

    let all = app.get("/api/posts", &Auth::Anonymous).await;
    let titles: Vec<_> = all.body.as_array().unwrap().iter().map(|p| p["title"].clone()).collect();
    assert_eq!(titles, vec![json!("third"), json!("second"), json!("first")]);

    let funny = app.get("/api/posts/funny", &Auth::Anonymous).await;
    assert_eq!(funny.body.as_array().unwrap().len(), 2);

    let by_alice = app.get("/api/user/alice", &Auth::Anonymous).await;
    assert_eq!(by_alice.body.as_array().unwrap().len(), 2);
    assert!(by_alice.body.as_array().unwrap().iter().all(|p| p["author"]["username"] == "alice"));

    let empty = app.get("/api/posts/nothing-here", &Auth::Anonymous).await;
    assert_eq!(empty.body, json!([]));
}

#[tokio::test]
async fn voting_sequence_over_http() {
    let app = TestApp::bearer();
    let alice = app.sign_up("alice", "pw").await;
    let post_id = id_of(&create(&app, &alice, "music", "votes").await);

    let again = app.get(&format!("/api/post/{post_id}/upvote"), &alice).await;
    assert_eq!(again.body["score"], 1);

    let flipped = app.get(&format!("/api/post/{post_id}/downvote"), &alice).await;
    assert_eq!(flipped.body["score"], -1);
    assert_eq!(flipped.body["upvotePercentage"], 0);

    let cleared = app.get(&format!("/api/post/{post_id}/unvote"), &alice).await;
    assert_eq!(cleared.body["score"], 0);
    assert_eq!(cleared.body["votes"], json!([]));
    assert_eq!(cleared.body["upvotePercentage"], 100);
}

#[tokio::test]
async fn link_posts_carry_url_only() {
    let app = TestApp::bearer();
    let alice = app.sign_up("alice", "pw").await;

    let response = app
        .post(
            "/api/posts",
            json!({ "category": "programming", "type": "link", "title": "rust", "url": "https://rust-lang.org" }),
            &alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["url"], "https://rust-lang.org");
    assert!(response.body.get("text").is_none());
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = TestApp::bearer();
    let alice = app.sign_up("alice", "pw").await;
    let post_id = id_of(&create(&app, &alice, "music", "hello").await);

    let no_url = app
        .post("/api/posts", json!({ "category": "news", "type": "link", "title": "t" }), &alice)
        .await;
    assert_eq!(no_url.status, StatusCode::BAD_REQUEST);

    let blank_comment = app
        .post(&format!("/api/post/{post_id}"), json!({ "comment": "   " }), &alice)
        .await;
    assert_eq!(blank_comment.status, StatusCode::BAD_REQUEST);

    let missing_post = app.get("/api/post/000000000000000000000000/upvote", &alice).await;
    assert_eq!(missing_post.status, StatusCode::NOT_FOUND);

    let missing_comment = app.delete(&format!("/api/post/{post_id}/nope"), &alice).await;
    assert_eq!(missing_comment.status, StatusCode::NOT_FOUND);
}
