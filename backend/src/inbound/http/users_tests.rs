//! Behavioural coverage for the account endpoints.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{Value, json};

use crate::domain::ports::MockAccounts;
use crate::domain::{Error, User, UserDraft, UserId};
use crate::inbound::http::test_utils::{
    TestState, login_as, test_login_route, test_session_middleware,
};

use super::*;

const MEMBER_ID: &str = "6f9619ff-8b86-4d01-b42d-00cf4fc964ff";

fn member_id() -> UserId {
    UserId::new(MEMBER_ID).expect("fixture id")
}

fn fixture_user(id: UserId, is_admin: bool) -> User {
    User::new(UserDraft {
        id,
        display_name: "Grace Hopper".to_owned(),
        email: "grace@example.org".to_owned(),
        is_admin,
        birth_date: NaiveDate::from_ymd_opt(1906, 12, 9).expect("valid date"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    })
    .expect("fixture user")
}

macro_rules! account_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(test_session_middleware())
                .service(test_login_route())
                .service(register)
                .service(login)
                .service(logout)
                .service(current_user)
                .service(list_users),
        )
        .await
    };
}

#[actix_web::test]
async fn registration_creates_the_account_and_starts_a_session() {
    let mut accounts = MockAccounts::new();
    accounts
        .expect_register()
        .withf(|request| {
            request.display_name == "Grace Hopper"
                && request.email == "grace@example.org"
                && request.password == "correct horse"
                && request.birth_date
                    == NaiveDate::from_ymd_opt(1906, 12, 9).expect("valid date")
        })
        .returning(|_| Ok(fixture_user(member_id(), false)));
    accounts.expect_get_user().returning(|id| Ok(fixture_user(id, false)));
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "displayName": "Grace Hopper",
                "email": "grace@example.org",
                "password": "correct horse",
                "birthDate": "1906-12-09",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["email"].as_str(), Some("grace@example.org"));
    assert!(body.get("password").is_none());

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/me").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn malformed_birth_dates_are_rejected_before_the_port() {
    let state = TestState::default().build();
    let app = account_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "displayName": "Grace Hopper",
                "email": "grace@example.org",
                "password": "correct horse",
                "birthDate": "09/12/1906",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"].as_str(), Some("invalid_date"));
    assert_eq!(body["details"]["field"].as_str(), Some("birthDate"));
}

#[actix_web::test]
async fn duplicate_emails_conflict() {
    let mut accounts = MockAccounts::new();
    accounts.expect_register().returning(|_| {
        Err(Error::conflict("email already registered")
            .with_details(json!({"code": "duplicate_email"})))
    });
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "displayName": "Grace Hopper",
                "email": "grace@example.org",
                "password": "correct horse",
                "birthDate": "1906-12-09",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_sets_the_session_cookie() {
    let mut accounts = MockAccounts::new();
    accounts
        .expect_login()
        .withf(|request| request.email == "grace@example.org" && request.password == "correct horse")
        .returning(|_| Ok(fixture_user(member_id(), false)));
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"email": "grace@example.org", "password": "correct horse"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.response()
            .cookies()
            .any(|cookie| cookie.name() == "session")
    );
}

#[actix_web::test]
async fn failed_logins_are_unauthorised() {
    let mut accounts = MockAccounts::new();
    accounts
        .expect_login()
        .returning(|_| Err(Error::unauthorized("invalid email or password")));
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"email": "grace@example.org", "password": "wrong"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"].as_str(), Some("invalid email or password"));
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let mut accounts = MockAccounts::new();
    accounts
        .expect_get_user()
        .returning(|id| Ok(fixture_user(id, false)));
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);
    let cookie = login_as(&app, member_id()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("removal cookie set");
    assert!(cleared.value().is_empty());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/me")
            .cookie(cleared.into_owned())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn current_user_requires_a_session() {
    let state = TestState::default().build();
    let app = account_app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn listing_users_requires_admin_rights() {
    let mut accounts = MockAccounts::new();
    accounts.expect_is_admin().returning(|_| Ok(false));
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);
    let cookie = login_as(&app, member_id()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/users")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_see_every_account() {
    let mut accounts = MockAccounts::new();
    accounts.expect_is_admin().returning(|_| Ok(true));
    accounts.expect_list_users().returning(|| {
        Ok(vec![
            fixture_user(member_id(), false),
            fixture_user(UserId::random(), true),
        ])
    });
    let state = TestState {
        accounts: Some(accounts),
        ..TestState::default()
    }
    .build();
    let app = account_app!(state);
    let cookie = login_as(&app, member_id()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/users")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}
