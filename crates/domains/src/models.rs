//! # Domain Models
//!
//! These structs represent the core entities of linkboard.
//! A `Post` exclusively owns its votes and comments; authors are embedded as
//! snapshots taken at creation time and are never re-synced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, Result};

/// Denormalised `(username, id)` pair embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub id: String,
}

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
}

impl Principal {
    pub fn as_author(&self) -> Author {
        Author {
            username: self.username.clone(),
            id: self.user_id.clone(),
        }
    }
}

/// A recorded vote. `vote` is always `1` or `-1`; an unvote removes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user: String,
    pub vote: i8,
}

/// The action requested by a voting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteDirection {
    Up,
    Down,
    /// Removes whatever vote the user has recorded.
    Clear,
}

impl VoteDirection {
    /// Value stored in a [`Vote`], `None` for [`VoteDirection::Clear`].
    pub fn value(self) -> Option<i8> {
        match self {
            VoteDirection::Up => Some(1),
            VoteDirection::Down => Some(-1),
            VoteDirection::Clear => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "upvote",
            VoteDirection::Down => "downvote",
            VoteDirection::Clear => "unvote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Author,
    pub body: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Link,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPostRequest {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
}

impl NewPostRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::Validation("category must not be empty".into()));
        }
        match self.kind {
            PostKind::Link if self.url.trim().is_empty() => {
                Err(DomainError::Validation("link post requires a url".into()))
            }
            PostKind::Text if self.text.trim().is_empty() => {
                Err(DomainError::Validation("text post requires a text".into()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: Author,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub score: i64,
    pub views: i64,
    pub votes: Vec<Vote>,
    pub comments: Vec<Comment>,
    pub created: DateTime<Utc>,
    pub upvote_percentage: u8,
}

impl Post {
    /// Builds a fresh post carrying the author's own upvote.
    pub fn new(id: String, author: Author, request: NewPostRequest, created: DateTime<Utc>) -> Self {
        let (text, url) = match request.kind {
            PostKind::Link => (None, Some(request.url)),
            PostKind::Text => (Some(request.text), None),
        };
        let votes = vec![Vote {
            user: author.id.clone(),
            vote: 1,
        }];

        Post {
            id,
            author,
            category: request.category,
            kind: request.kind,
            title: request.title,
            text,
            url,
            score: 1,
            views: 1,
            votes,
            comments: Vec::new(),
            created,
            upvote_percentage: 100,
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.id == user_id
    }

    /// Fails with `Unauthorized` unless `requester_id` wrote this post.
    pub fn ensure_author(&self, requester_id: &str) -> Result<()> {
        if self.is_authored_by(requester_id) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized(format!(
                "user {requester_id} is not the author of post {}",
                self.id
            )))
        }
    }

    /// The user's current vote, if any.
    pub fn vote_of(&self, user_id: &str) -> Option<i8> {
        self.votes.iter().find(|v| v.user == user_id).map(|v| v.vote)
    }

    /// Applies one vote action and recomputes the derived percentage.
    ///
    /// Repeating the vote a user already has is a no-op, flipping a vote moves
    /// the score by two, and clearing a missing vote changes nothing.
    pub fn apply_vote(&mut self, user_id: &str, direction: VoteDirection) {
        let existing = self.votes.iter().position(|v| v.user == user_id);

        match (direction.value(), existing) {
            (Some(value), None) => {
                self.votes.push(Vote {
                    user: user_id.to_owned(),
                    vote: value,
                });
                self.score += i64::from(value);
            }
            (Some(value), Some(index)) => {
                if self.votes[index].vote != value {
                    self.votes[index].vote = value;
                    self.score += 2 * i64::from(value);
                }
            }
            (None, Some(index)) => {
                let removed = self.votes.remove(index);
                self.score -= i64::from(removed.vote);
            }
            (None, None) => {}
        }

        self.upvote_percentage = upvote_percentage(&self.votes);
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Removes a comment; only its own author may do so.
    pub fn remove_comment(&mut self, comment_id: &str, requester_id: &str) -> Result<()> {
        let index = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| DomainError::CommentNotFound(comment_id.to_owned()))?;

        if self.comments[index].author.id != requester_id {
            return Err(DomainError::Unauthorized(format!(
                "user {requester_id} is not the author of comment {comment_id}"
            )));
        }

        self.comments.remove(index);
        Ok(())
    }
}

/// Integer share of upvotes, truncated. An empty vote set counts as 100.
pub fn upvote_percentage(votes: &[Vote]) -> u8 {
    if votes.is_empty() {
        return 100;
    }
    let upvotes = votes.iter().filter(|v| v.vote > 0).count();
    (upvotes * 100 / votes.len()) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string; never leaves the process.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}

/// Server-side record behind a `session_id` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub username: String,
}

impl Session {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: &str) -> Author {
        Author {
            username: format!("name-{id}"),
            id: id.to_owned(),
        }
    }

    fn text_post(author_id: &str) -> Post {
        let request = NewPostRequest {
            category: "music".into(),
            kind: PostKind::Text,
            title: "hello".into(),
            text: "body".into(),
            url: "ignored".into(),
        };
        Post::new("p1".into(), author(author_id), request, Utc::now())
    }

    /// A post with no votes at all, score 0.
    fn blank_post() -> Post {
        let mut post = text_post("owner");
        post.apply_vote("owner", VoteDirection::Clear);
        post
    }

    fn recorded_score(post: &Post) -> i64 {
        post.votes.iter().map(|v| i64::from(v.vote)).sum()
    }

    #[test]
    fn new_post_self_upvotes() {
        let post = text_post("u1");
        assert_eq!(post.score, 1);
        assert_eq!(post.views, 1);
        assert_eq!(post.upvote_percentage, 100);
        assert_eq!(post.votes, vec![Vote { user: "u1".into(), vote: 1 }]);
        assert_eq!(post.text.as_deref(), Some("body"));
        assert!(post.url.is_none());
    }

    #[test]
    fn link_post_keeps_only_url() {
        let request = NewPostRequest {
            category: "news".into(),
            kind: PostKind::Link,
            title: "t".into(),
            text: "dropped".into(),
            url: "https://example.com".into(),
        };
        let post = Post::new("p".into(), author("a"), request, Utc::now());
        assert_eq!(post.url.as_deref(), Some("https://example.com"));
        assert!(post.text.is_none());
    }

    #[test]
    fn repeated_upvote_is_idempotent() {
        let mut post = blank_post();
        post.apply_vote("u", VoteDirection::Up);
        assert_eq!(post.score, 1);
        post.apply_vote("u", VoteDirection::Up);
        assert_eq!(post.score, 1);
        assert_eq!(post.votes.len(), 1);
    }

    #[test]
    fn downvote_after_upvote_flips() {
        let mut post = blank_post();
        assert_eq!(post.score, 0);
        post.apply_vote("u", VoteDirection::Up);
        assert_eq!(post.score, 1);
        post.apply_vote("u", VoteDirection::Down);
        assert_eq!(post.score, -1);
        assert_eq!(post.vote_of("u"), Some(-1));
        post.apply_vote("u", VoteDirection::Up);
        assert_eq!(post.score, 1);
    }

    #[test]
    fn unvote_without_vote_is_noop() {
        let mut post = text_post("owner");
        let before = post.clone();
        post.apply_vote("stranger", VoteDirection::Clear);
        assert_eq!(post, before);
    }

    #[test]
    fn unvote_reverts_either_polarity() {
        let mut post = blank_post();
        post.apply_vote("a", VoteDirection::Down);
        post.apply_vote("b", VoteDirection::Up);
        post.apply_vote("a", VoteDirection::Clear);
        assert_eq!(post.score, 1);
        post.apply_vote("b", VoteDirection::Clear);
        assert_eq!(post.score, 0);
        assert!(post.votes.is_empty());
        assert_eq!(post.upvote_percentage, 100);
    }

    #[test]
    fn percentage_truncates() {
        let mut post = text_post("a");
        post.apply_vote("b", VoteDirection::Up);
        post.apply_vote("c", VoteDirection::Down);
        assert_eq!(post.upvote_percentage, 66);

        post.apply_vote("d", VoteDirection::Down);
        assert_eq!(post.upvote_percentage, 50);
        assert_eq!(upvote_percentage(&[]), 100);
    }

    #[test]
    fn score_tracks_recorded_votes_for_any_sequence() {
        use VoteDirection::*;
        let users = ["a", "b", "c"];
        let script = [Up, Down, Clear, Down, Up, Up, Clear, Clear, Down, Down, Up, Clear];
        let mut post = blank_post();

        for (step, direction) in script.iter().cycle().take(60).enumerate() {
            let user = users[(step * 7 + step / 3) % users.len()];
            post.apply_vote(user, *direction);

            assert_eq!(post.score, recorded_score(&post), "step {step}");
            for u in users {
                assert!(post.votes.iter().filter(|v| v.user == u).count() <= 1);
            }
            assert_eq!(post.upvote_percentage, upvote_percentage(&post.votes));
        }
    }

    #[test]
    fn comment_removal_checks_comment_author() {
        let mut post = text_post("owner");
        post.add_comment(Comment {
            id: "c1".into(),
            author: author("commenter"),
            body: "first".into(),
            created: Utc::now(),
        });

        assert!(matches!(
            post.remove_comment("missing", "commenter"),
            Err(DomainError::CommentNotFound(_))
        ));
        assert!(matches!(
            post.remove_comment("c1", "owner"),
            Err(DomainError::Unauthorized(_))
        ));
        assert_eq!(post.comments.len(), 1);

        post.remove_comment("c1", "commenter").unwrap();
        assert!(post.comments.is_empty());
    }

    #[test]
    fn request_validation() {
        let mut request = NewPostRequest {
            category: "c".into(),
            kind: PostKind::Link,
            title: "t".into(),
            text: String::new(),
            url: " ".into(),
        };
        assert!(matches!(request.validate(), Err(DomainError::Validation(_))));
        request.url = "https://rust-lang.org".into();
        assert!(request.validate().is_ok());
        request.title = "".into();
        assert!(request.validate().is_err());
    }

    #[test]
    fn post_json_shape() {
        let post = text_post("u1");
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["upvotePercentage"], 100);
        assert_eq!(json["author"]["id"], "u1");
        assert!(json.get("url").is_none());

        let back: Post = serde_json::from_value(json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn user_json_hides_password() {
        let user = User {
            id: "1".into(),
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
