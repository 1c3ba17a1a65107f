//! Service-level properties over the in-memory store.

use domains::{DomainError, NewPostRequest, PostKind, VoteDirection};
use integration_tests::{account_service, post_service, principal};

fn request() -> NewPostRequest {
    NewPostRequest {
        category: "music".into(),
        kind: PostKind::Text,
        title: "t".into(),
        text: "b".into(),
        url: String::new(),
    }
}

#[tokio::test]
async fn score_always_equals_recorded_votes() {
    let posts = post_service();
    let post = posts.create(request(), &principal("author")).await.unwrap();

    let users = ["u0", "u1", "u2", "u3"];
    let directions = [VoteDirection::Up, VoteDirection::Down, VoteDirection::Clear];

    // Deterministic pseudo-random walk over users and directions.
    let mut seed: u32 = 7;
    for _ in 0..200 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let user = principal(users[(seed >> 8) as usize % users.len()]);
        let direction = directions[(seed >> 16) as usize % directions.len()];

        let updated = posts.vote(&post.id, &user, direction).await.unwrap();

        let tally: i64 = updated.votes.iter().map(|v| i64::from(v.vote)).sum();
        assert_eq!(updated.score, tally);

        let mut voters: Vec<_> = updated.votes.iter().map(|v| v.user.as_str()).collect();
        voters.sort_unstable();
        voters.dedup();
        assert_eq!(voters.len(), updated.votes.len());
    }
}

#[tokio::test]
async fn two_ups_one_down_is_sixty_six_percent() {
    let posts = post_service();
    let post = posts.create(request(), &principal("a")).await.unwrap();
    posts.vote(&post.id, &principal("b"), VoteDirection::Up).await.unwrap();
    let post = posts.vote(&post.id, &principal("c"), VoteDirection::Down).await.unwrap();

    assert_eq!(post.score, 1);
    assert_eq!(post.upvote_percentage, 66);
}

#[tokio::test]
async fn concurrent_voters_are_all_counted() {
    let posts = std::sync::Arc::new(post_service());
    let post = posts.create(request(), &principal("author")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..32 {
        let posts = posts.clone();
        let id = post.id.clone();
        handles.push(tokio::spawn(async move {
            posts
                .vote(&id, &principal(&format!("voter{i}")), VoteDirection::Up)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let post = posts.get(&post.id).await.unwrap();
    assert_eq!(post.score, 33);
    assert_eq!(post.votes.len(), 33);
}

#[tokio::test]
async fn delete_post_by_stranger_keeps_it() {
    let posts = post_service();
    let post = posts.create(request(), &principal("owner")).await.unwrap();

    assert!(matches!(
        posts.delete(&post.id, &principal("stranger")).await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(posts.get(&post.id).await.is_ok());

    posts.delete(&post.id, &principal("owner")).await.unwrap();
    assert!(matches!(posts.get(&post.id).await, Err(DomainError::PostNotFound(_))));
}

#[tokio::test]
async fn comment_deletion_checks_existence_then_owner() {
    let posts = post_service();
    let post = posts.create(request(), &principal("owner")).await.unwrap();
    let post = posts
        .add_comment(&post.id, &principal("commenter"), "hi")
        .await
        .unwrap();
    let comment_id = post.comments[0].id.clone();

    assert!(matches!(
        posts.delete_comment(&post.id, "missing", &principal("commenter")).await,
        Err(DomainError::CommentNotFound(_))
    ));
    assert!(matches!(
        posts.delete_comment(&post.id, &comment_id, &principal("owner")).await,
        Err(DomainError::Unauthorized(_))
    ));
    let post = posts
        .delete_comment(&post.id, &comment_id, &principal("commenter"))
        .await
        .unwrap();
    assert!(post.comments.is_empty());
}

#[tokio::test]
async fn register_twice_then_authorize_first() {
    let accounts = account_service();
    let first = accounts.register("zed", "first-pass").await.unwrap();

    assert!(matches!(
        accounts.register("zed", "second-pass").await,
        Err(DomainError::AlreadyExists(_))
    ));

    let again = accounts.authorize("zed", "first-pass").await.unwrap();
    assert_eq!(again.user.id, first.user.id);
    assert_eq!(accounts.verify_token(&again.token).unwrap().username, "zed");
    assert!(matches!(
        accounts.authorize("zed", "second-pass").await,
        Err(DomainError::BadPassword)
    ));
}
