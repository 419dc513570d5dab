//! Behavioural coverage for the comment service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{
    AddCommentRequest, CommentCommand, CommentQuery, CommentRepositoryError,
    MockCatalogRepository, MockCommentRepository,
};
use crate::domain::{Book, BookDraft, ErrorCode, UserId};

use super::CommentService;

fn fixture_book() -> Book {
    Book::new(BookDraft {
        id: Uuid::new_v4(),
        title: "Perdido Street Station".to_owned(),
        author: "China Miéville".to_owned(),
        published_year: Some(2000),
        description: None,
        category: None,
        cover_url: None,
        created_at: Utc::now(),
    })
    .expect("fixture book is valid")
}

fn details_code(details: Option<&Value>) -> Option<&str> {
    details.and_then(|value| value.get("code")).and_then(Value::as_str)
}

fn catalog_with(book: Book) -> MockCatalogRepository {
    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find()
        .returning(move |_| Ok(Some(book.clone())));
    catalog
}

fn service(
    comments: MockCommentRepository,
    catalog: MockCatalogRepository,
) -> CommentService<MockCommentRepository, MockCatalogRepository> {
    CommentService::new(Arc::new(comments), Arc::new(catalog))
}

fn request(book_id: Uuid, rating: i16, content: Option<&str>) -> AddCommentRequest {
    AddCommentRequest {
        user_id: UserId::random(),
        book_id,
        rating,
        content: content.map(ToOwned::to_owned),
    }
}

#[rstest]
#[tokio::test]
async fn comment_with_valid_rating_and_text_is_stored() {
    let book = fixture_book();
    let book_id = book.id();

    let mut comments = MockCommentRepository::new();
    comments
        .expect_insert()
        .withf(move |comment| {
            comment.book_id() == book_id
                && comment.rating().value() == 4
                && comment.content().map(AsRef::as_ref) == Some("Dense but rewarding")
        })
        .returning(|_| Ok(()));

    let stored = service(comments, catalog_with(book))
        .add_comment(request(book_id, 4, Some("Dense but rewarding")))
        .await
        .expect("comment stored");

    assert_eq!(stored.rating().value(), 4);
}

#[rstest]
#[tokio::test]
async fn rating_only_comment_is_accepted() {
    let book = fixture_book();
    let book_id = book.id();

    let mut comments = MockCommentRepository::new();
    comments.expect_insert().returning(|_| Ok(()));

    let stored = service(comments, catalog_with(book))
        .add_comment(request(book_id, 5, None))
        .await
        .expect("comment stored");

    assert!(stored.content().is_none());
}

#[rstest]
#[tokio::test]
async fn blank_content_is_treated_as_absent() {
    let book = fixture_book();
    let book_id = book.id();

    let mut comments = MockCommentRepository::new();
    comments
        .expect_insert()
        .withf(|comment| comment.content().is_none())
        .returning(|_| Ok(()));

    service(comments, catalog_with(book))
        .add_comment(request(book_id, 3, Some("   ")))
        .await
        .expect("comment stored");
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-3)]
#[tokio::test]
async fn out_of_range_ratings_are_rejected(#[case] rating: i16) {
    // No repository expectations: validation fails before any call.
    let error = service(MockCommentRepository::new(), MockCatalogRepository::new())
        .add_comment(request(Uuid::new_v4(), rating, None))
        .await
        .expect_err("rating is rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn too_short_content_is_rejected() {
    let error = service(MockCommentRepository::new(), MockCatalogRepository::new())
        .add_comment(request(Uuid::new_v4(), 4, Some("meh")))
        .await
        .expect_err("short content is rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn commenting_on_an_unknown_book_is_not_found() {
    let mut catalog = MockCatalogRepository::new();
    catalog.expect_find().returning(|_| Ok(None));

    let error = service(MockCommentRepository::new(), catalog)
        .add_comment(request(Uuid::new_v4(), 4, None))
        .await
        .expect_err("missing book is rejected");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn second_comment_on_the_same_book_is_a_conflict() {
    let book = fixture_book();
    let book_id = book.id();

    let mut comments = MockCommentRepository::new();
    comments
        .expect_insert()
        .returning(move |_| Err(CommentRepositoryError::DuplicateComment { book_id }));

    let error = service(comments, catalog_with(book))
        .add_comment(request(book_id, 2, None))
        .await
        .expect_err("duplicate comment is rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(details_code(error.details()), Some("duplicate_comment"));
}

#[rstest]
#[tokio::test]
async fn listing_comments_requires_the_book_to_exist() {
    let mut catalog = MockCatalogRepository::new();
    catalog.expect_find().returning(|_| Ok(None));

    let error = service(MockCommentRepository::new(), catalog)
        .list_comments(Uuid::new_v4())
        .await
        .expect_err("missing book is rejected");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn listing_comments_delegates_to_the_repository() {
    let book = fixture_book();
    let book_id = book.id();

    let mut comments = MockCommentRepository::new();
    comments.expect_list_for_book().returning(|_| Ok(Vec::new()));

    let listed = service(comments, catalog_with(book))
        .list_comments(book_id)
        .await
        .expect("listing succeeds");

    assert!(listed.is_empty());
}
