//! Scenario coverage for the loan lifecycle service.
//!
//! Uses an in-memory library fake so borrow/return sequences exercise the
//! availability ledger end to end without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{CatalogFilter, CategoryCount};
use crate::domain::{Book, BookDraft, BookSummary, ErrorCode, LoanStatus};

#[derive(Default)]
struct LibraryState {
    loans: Vec<Loan>,
    // book id -> (total, available)
    stock: HashMap<Uuid, (i32, i32)>,
}

/// In-memory loan and catalogue store with the same transition semantics as
/// the database adapters.
#[derive(Clone, Default)]
struct MemoryLibrary {
    state: Arc<Mutex<LibraryState>>,
}

impl MemoryLibrary {
    fn with_book(book_id: Uuid, total: i32, available: i32) -> Self {
        let library = Self::default();
        library
            .state
            .lock()
            .expect("state lock")
            .stock
            .insert(book_id, (total, available));
        library
    }

    fn availability(&self, book_id: Uuid) -> i32 {
        self.state
            .lock()
            .expect("state lock")
            .stock
            .get(&book_id)
            .map(|(_, available)| *available)
            .expect("book present")
    }

    fn fixture_book(book_id: Uuid) -> Book {
        Book::new(BookDraft {
            id: book_id,
            title: "A Wizard of Earthsea".to_owned(),
            author: "Ursula K Le Guin".to_owned(),
            published_year: Some(1968),
            description: None,
            category: None,
            cover_url: None,
            created_at: Utc::now(),
        })
        .expect("valid fixture book")
    }
}

#[async_trait]
impl LoanRepository for MemoryLibrary {
    async fn create_active(&self, loan: &Loan) -> Result<(), LoanRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        let duplicate = state.loans.iter().any(|existing| {
            existing.is_active()
                && existing.user_id() == loan.user_id()
                && existing.book_id() == loan.book_id()
        });
        if duplicate {
            return Err(LoanRepositoryError::DuplicateActiveLoan {
                book_id: loan.book_id(),
            });
        }
        let Some((_, available)) = state.stock.get_mut(&loan.book_id()) else {
            return Err(LoanRepositoryError::BookUnavailable {
                book_id: loan.book_id(),
            });
        };
        if *available <= 0 {
            return Err(LoanRepositoryError::BookUnavailable {
                book_id: loan.book_id(),
            });
        }
        *available -= 1;
        state.loans.push(loan.clone());
        Ok(())
    }

    async fn mark_returned(&self, loan_id: Uuid) -> Result<Loan, LoanRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        let Some(position) = state.loans.iter().position(|loan| loan.id() == loan_id) else {
            return Err(LoanRepositoryError::NotFound { loan_id });
        };
        let loan = state.loans[position].clone();
        if !loan.is_active() {
            return Err(LoanRepositoryError::AlreadyReturned { loan_id });
        }
        let returned = Loan::from_parts(
            loan.id(),
            loan.user_id().clone(),
            loan.book_id(),
            loan.start_date(),
            loan.due_date(),
            LoanStatus::Returned,
        );
        state.loans[position] = returned.clone();
        if let Some((total, available)) = state.stock.get_mut(&loan.book_id()) {
            *available = (*available + 1).min(*total);
        }
        Ok(returned)
    }

    async fn find(&self, loan_id: Uuid) -> Result<Option<Loan>, LoanRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.loans.iter().find(|loan| loan.id() == loan_id).cloned())
    }

    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .loans
            .iter()
            .filter(|loan| loan.is_active() && loan.user_id() == user_id)
            .map(|loan| LoanWithBook {
                loan: loan.clone(),
                book: BookSummary::from(&Self::fixture_book(loan.book_id())),
            })
            .collect())
    }

    async fn list_history_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LoanWithBook>, LoanRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .loans
            .iter()
            .filter(|loan| !loan.is_active() && loan.user_id() == user_id)
            .map(|loan| LoanWithBook {
                loan: loan.clone(),
                book: BookSummary::from(&Self::fixture_book(loan.book_id())),
            })
            .collect())
    }

    async fn list_all_active(&self) -> Result<Vec<LoanWithBorrower>, LoanRepositoryError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl CatalogRepository for MemoryLibrary {
    async fn insert_with_inventory(
        &self,
        book: &Book,
        initial_copies: i32,
    ) -> Result<(), CatalogRepositoryError> {
        let mut state = self.state.lock().expect("state lock");
        state
            .stock
            .insert(book.id(), (initial_copies, initial_copies));
        Ok(())
    }

    async fn update(&self, _book: &Book) -> Result<(), CatalogRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _book_id: Uuid) -> Result<(), CatalogRepositoryError> {
        Ok(())
    }

    async fn find(&self, book_id: Uuid) -> Result<Option<Book>, CatalogRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .stock
            .contains_key(&book_id)
            .then(|| Self::fixture_book(book_id)))
    }

    async fn list(&self, _filter: &CatalogFilter) -> Result<Vec<Book>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn search(&self, _term: &str) -> Result<Vec<Book>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, CatalogRepositoryError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<i64, CatalogRepositoryError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.stock.len() as i64)
    }
}

fn service(library: &MemoryLibrary) -> LoanService<MemoryLibrary, MemoryLibrary> {
    LoanService::new(Arc::new(library.clone()), Arc::new(library.clone()))
}

fn borrow_request(user_id: &UserId, book_id: Uuid) -> BorrowRequest {
    BorrowRequest {
        user_id: user_id.clone(),
        book_id,
        duration_days: None,
    }
}

fn details_code(error: &Error) -> Option<String> {
    error
        .details()
        .and_then(|details| details.get("code"))
        .and_then(|code| code.as_str())
        .map(ToOwned::to_owned)
}

#[rstest]
#[case(6, false)]
#[case(7, true)]
#[case(90, true)]
#[case(91, false)]
#[tokio::test]
async fn borrow_enforces_duration_bounds(#[case] days: i64, #[case] accepted: bool) {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 50);
    let service = service(&library);

    let result = service
        .borrow(BorrowRequest {
            user_id: UserId::random(),
            book_id,
            duration_days: Some(days),
        })
        .await;

    if accepted {
        let loan = result.expect("borrow succeeds");
        assert_eq!(
            (loan.due_date() - loan.start_date()).num_days(),
            days,
            "due date reflects the requested duration"
        );
    } else {
        let error = result.expect_err("borrow fails");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(details_code(&error).as_deref(), Some("invalid_duration"));
    }
}

#[tokio::test]
async fn borrow_defaults_to_thirty_days() {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 50);
    let service = service(&library);

    let loan = service
        .borrow(borrow_request(&UserId::random(), book_id))
        .await
        .expect("borrow succeeds");
    assert_eq!((loan.due_date() - loan.start_date()).num_days(), 30);
}

#[tokio::test]
async fn borrow_of_unknown_book_is_not_found() {
    let library = MemoryLibrary::default();
    let service = service(&library);

    let error = service
        .borrow(borrow_request(&UserId::random(), Uuid::new_v4()))
        .await
        .expect_err("borrow fails");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn last_copy_goes_to_the_first_borrower() {
    // total 50, one copy left: the first borrow drains it, the second user
    // is turned away.
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 1);
    let service = service(&library);

    service
        .borrow(borrow_request(&UserId::random(), book_id))
        .await
        .expect("first borrow succeeds");
    assert_eq!(library.availability(book_id), 0);

    let error = service
        .borrow(borrow_request(&UserId::random(), book_id))
        .await
        .expect_err("second borrow fails");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(details_code(&error).as_deref(), Some("book_unavailable"));
    assert_eq!(library.availability(book_id), 0);
}

#[tokio::test]
async fn second_borrow_of_same_book_by_same_user_conflicts() {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 50);
    let service = service(&library);
    let user_id = UserId::random();

    service
        .borrow(borrow_request(&user_id, book_id))
        .await
        .expect("first borrow succeeds");

    let error = service
        .borrow(borrow_request(&user_id, book_id))
        .await
        .expect_err("second borrow fails");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        details_code(&error).as_deref(),
        Some("duplicate_active_loan")
    );
    // Availability decremented exactly once.
    assert_eq!(library.availability(book_id), 49);
}

#[tokio::test]
async fn return_is_not_repeatable() {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 50);
    let service = service(&library);
    let user_id = UserId::random();

    let loan = service
        .borrow(borrow_request(&user_id, book_id))
        .await
        .expect("borrow succeeds");
    let request = ReturnRequest {
        loan_id: loan.id(),
        user_id: user_id.clone(),
        is_admin: false,
    };

    let returned = service
        .return_loan(request.clone())
        .await
        .expect("first return succeeds");
    assert_eq!(returned.status(), LoanStatus::Returned);
    assert_eq!(library.availability(book_id), 50);

    let error = service
        .return_loan(request)
        .await
        .expect_err("second return fails");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(details_code(&error).as_deref(), Some("already_returned"));
    // Availability incremented exactly once.
    assert_eq!(library.availability(book_id), 50);
}

#[tokio::test]
async fn borrow_return_cycles_do_not_drift() {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 3, 3);
    let service = service(&library);
    let user_id = UserId::random();

    for _ in 0..5 {
        let loan = service
            .borrow(borrow_request(&user_id, book_id))
            .await
            .expect("borrow succeeds");
        assert_eq!(library.availability(book_id), 2);
        service
            .return_loan(ReturnRequest {
                loan_id: loan.id(),
                user_id: user_id.clone(),
                is_admin: false,
            })
            .await
            .expect("return succeeds");
        assert_eq!(library.availability(book_id), 3);
    }
}

#[tokio::test]
async fn returning_anothers_loan_requires_admin() {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 50);
    let service = service(&library);
    let borrower = UserId::random();

    let loan = service
        .borrow(borrow_request(&borrower, book_id))
        .await
        .expect("borrow succeeds");

    let error = service
        .return_loan(ReturnRequest {
            loan_id: loan.id(),
            user_id: UserId::random(),
            is_admin: false,
        })
        .await
        .expect_err("stranger cannot return");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    service
        .return_loan(ReturnRequest {
            loan_id: loan.id(),
            user_id: UserId::random(),
            is_admin: true,
        })
        .await
        .expect("admin can return");
    assert_eq!(library.availability(book_id), 50);
}

#[tokio::test]
async fn returning_unknown_loan_is_not_found() {
    let library = MemoryLibrary::default();
    let service = service(&library);

    let error = service
        .return_loan(ReturnRequest {
            loan_id: Uuid::new_v4(),
            user_id: UserId::random(),
            is_admin: false,
        })
        .await
        .expect_err("return fails");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn listings_split_active_and_history() {
    let book_id = Uuid::new_v4();
    let library = MemoryLibrary::with_book(book_id, 50, 50);
    let service = service(&library);
    let user_id = UserId::random();

    let loan = service
        .borrow(borrow_request(&user_id, book_id))
        .await
        .expect("borrow succeeds");
    assert_eq!(service.list_active(user_id.clone()).await.expect("list").len(), 1);
    assert!(service.list_history(user_id.clone()).await.expect("list").is_empty());

    service
        .return_loan(ReturnRequest {
            loan_id: loan.id(),
            user_id: user_id.clone(),
            is_admin: false,
        })
        .await
        .expect("return succeeds");
    assert!(service.list_active(user_id.clone()).await.expect("list").is_empty());
    assert_eq!(service.list_history(user_id).await.expect("list").len(), 1);
}

#[tokio::test]
async fn repository_outage_maps_to_service_unavailable() {
    use crate::domain::ports::{MockCatalogRepository, MockLoanRepository};

    let mut loans = MockLoanRepository::new();
    loans
        .expect_find()
        .returning(|_| Err(LoanRepositoryError::connection("connection refused")));
    let catalog = MockCatalogRepository::new();
    let service = LoanService::new(Arc::new(loans), Arc::new(catalog));

    let error = service
        .return_loan(ReturnRequest {
            loan_id: Uuid::new_v4(),
            user_id: UserId::random(),
            is_admin: false,
        })
        .await
        .expect_err("return fails");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
