//! Behavioural coverage for the comment endpoints.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::ports::{MockCommentCommand, MockCommentQuery};
use crate::domain::{
    Comment, CommentContent, CommentWithAuthor, DisplayName, Error, Rating, UserId,
};
use crate::inbound::http::test_utils::{
    TestState, login_as, test_login_route, test_session_middleware,
};

use super::*;

const MEMBER_ID: &str = "6f9619ff-8b86-4d01-b42d-00cf4fc964ff";

fn member_id() -> UserId {
    UserId::new(MEMBER_ID).expect("fixture id")
}

fn fixture_comment(book_id: Uuid) -> Comment {
    Comment::new(
        member_id(),
        book_id,
        Rating::new(4).expect("valid rating"),
        Some(CommentContent::new("Dense but rewarding").expect("valid content")),
    )
}

macro_rules! comment_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(test_session_middleware())
                .service(test_login_route())
                .service(list_comments)
                .service(add_comment),
        )
        .await
    };
}

#[actix_web::test]
async fn listing_comments_is_public() {
    let book_id = Uuid::new_v4();
    let mut comment_query = MockCommentQuery::new();
    comment_query
        .expect_list_comments()
        .withf(move |id| *id == book_id)
        .returning(|id| {
            Ok(vec![CommentWithAuthor {
                comment: fixture_comment(id),
                author: DisplayName::new("Grace Hopper").expect("fixture name"),
            }])
        });
    let state = TestState {
        comment_query: Some(comment_query),
        ..TestState::default()
    }
    .build();
    let app = comment_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/books/{book_id}/comments"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body[0]["author"].as_str(), Some("Grace Hopper"));
    assert_eq!(body[0]["comment"]["rating"].as_i64(), Some(4));
    assert_eq!(
        body[0]["comment"]["content"].as_str(),
        Some("Dense but rewarding")
    );
}

#[actix_web::test]
async fn posting_requires_a_session() {
    let state = TestState::default().build();
    let app = comment_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/books/{}/comments", Uuid::new_v4()))
            .set_json(json!({"rating": 4}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn posting_attributes_the_comment_to_the_session_user() {
    let book_id = Uuid::new_v4();
    let mut comment_command = MockCommentCommand::new();
    comment_command
        .expect_add_comment()
        .withf(move |request| {
            request.user_id == member_id()
                && request.book_id == book_id
                && request.rating == 5
                && request.content.as_deref() == Some("¡Qué maravilla de libro!")
        })
        .returning(|request| Ok(fixture_comment(request.book_id)));
    let state = TestState {
        comment_command: Some(comment_command),
        ..TestState::default()
    }
    .build();
    let app = comment_app!(state);
    let cookie = login_as(&app, member_id()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/books/{book_id}/comments"))
            .cookie(cookie)
            .set_json(json!({"rating": 5, "content": "¡Qué maravilla de libro!"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn duplicate_comments_report_a_conflict() {
    let mut comment_command = MockCommentCommand::new();
    comment_command.expect_add_comment().returning(|_| {
        Err(Error::conflict("user has already commented on this book")
            .with_details(json!({"code": "duplicate_comment"})))
    });
    let state = TestState {
        comment_command: Some(comment_command),
        ..TestState::default()
    }
    .build();
    let app = comment_app!(state);
    let cookie = login_as(&app, member_id()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/books/{}/comments", Uuid::new_v4()))
            .cookie(cookie)
            .set_json(json!({"rating": 3}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"].as_str(), Some("duplicate_comment"));
}

#[actix_web::test]
async fn invalid_ratings_are_rejected() {
    let mut comment_command = MockCommentCommand::new();
    comment_command.expect_add_comment().returning(|request| {
        Err(Error::invalid_request("rating must be between 1 and 5")
            .with_details(json!({"field": "rating", "value": request.rating})))
    });
    let state = TestState {
        comment_command: Some(comment_command),
        ..TestState::default()
    }
    .build();
    let app = comment_app!(state);
    let cookie = login_as(&app, member_id()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/books/{}/comments", Uuid::new_v4()))
            .cookie(cookie)
            .set_json(json!({"rating": 9}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_book_ids_are_rejected() {
    let state = TestState::default().build();
    let app = comment_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/books/not-a-uuid/comments")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"].as_str(), Some("invalid_uuid"));
}
