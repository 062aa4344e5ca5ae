//! Paginated user fetcher

use anyhow::Result;
use log::{debug, info};

use crate::api::wire::ByStatementRequest;
use crate::api::{AdManagerService, Statement, StatementBuilder};
use crate::models::{NetworkCode, User, UserPage};

/// Remote listing operation for users
pub trait UserService {
    /// Network the service operates on
    fn network_code(&self) -> &NetworkCode;

    /// Fetch one page of users; `None` when the server returns nothing
    fn get_users_by_statement(&self, statement: &Statement) -> Result<Option<UserPage>>;
}

impl UserService for AdManagerService {
    fn network_code(&self) -> &NetworkCode {
        AdManagerService::network_code(self)
    }

    fn get_users_by_statement(&self, statement: &Statement) -> Result<Option<UserPage>> {
        self.perform_operation(
            "getUsersByStatement",
            &ByStatementRequest {
                filter_statement: statement,
            },
        )
    }
}

/// Fetches users of one network
pub struct UserHandler {
    service: Box<dyn UserService>,
    network_code: NetworkCode,
}

impl UserHandler {
    pub fn new(service: Box<dyn UserService>) -> Self {
        let network_code = service.network_code().clone();
        Self {
            service,
            network_code,
        }
    }

    pub fn network_code(&self) -> &NetworkCode {
        &self.network_code
    }

    /// Get all users of the network
    pub fn get_all_users(&self) -> Result<Vec<User>> {
        self.get_all_users_matching(StatementBuilder::new())
    }

    /// Get all users matching a statement, one page at a time
    ///
    /// Pages are requested until one comes back absent or shorter than the
    /// page limit. The server's total count is not consulted, so a last page
    /// of exactly `limit` users costs one extra (empty) request. Errors from
    /// the service are returned as-is; nothing is retried.
    pub fn get_all_users_matching(&self, mut builder: StatementBuilder) -> Result<Vec<User>> {
        let mut users = Vec::new();

        loop {
            let statement = builder.to_statement();
            let page = self.service.get_users_by_statement(&statement)?;
            let results = page.and_then(|p| p.results);
            let page_len = results.as_ref().map(Vec::len);

            debug!(
                "Fetched {} users at offset {} (limit {})",
                page_len.unwrap_or(0),
                builder.offset,
                builder.limit
            );

            if let Some(results) = results {
                users.extend(results);
            }
            builder.increase_offset_by_limit();

            match page_len {
                Some(len) if len >= builder.limit => continue,
                _ => break,
            }
        }

        info!(
            "Fetched {} users from network {}",
            users.len(),
            self.network_code
        );
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Scripted service returning queued pages and recording statements
    struct FakeUserService {
        network_code: NetworkCode,
        pages: RefCell<VecDeque<Result<Option<UserPage>>>>,
        calls: Rc<RefCell<Vec<Statement>>>,
    }

    impl FakeUserService {
        fn new(pages: Vec<Result<Option<UserPage>>>) -> (Self, Rc<RefCell<Vec<Statement>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let service = Self {
                network_code: NetworkCode::new("NETWORK_CODE"),
                pages: RefCell::new(pages.into()),
                calls: Rc::clone(&calls),
            };
            (service, calls)
        }
    }

    impl UserService for FakeUserService {
        fn network_code(&self) -> &NetworkCode {
            &self.network_code
        }

        fn get_users_by_statement(&self, statement: &Statement) -> Result<Option<UserPage>> {
            self.calls.borrow_mut().push(statement.clone());
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected call: {}", statement.query))
        }
    }

    fn make_users(count: usize) -> Vec<User> {
        (0..count)
            .map(|i| {
                User::new(
                    i as i64,
                    format!("user{}", i),
                    format!("user{}@google.com", i),
                    format!("role{}", i),
                    true,
                )
            })
            .collect()
    }

    fn page(total: usize, start: usize, users: &[User]) -> Result<Option<UserPage>> {
        Ok(Some(UserPage {
            total_result_set_size: total as i64,
            start_index: start as i64,
            results: Some(users.to_vec()),
        }))
    }

    #[test]
    fn test_gets_all_users_from_network() {
        let users = make_users(100);
        let (service, calls) =
            FakeUserService::new(vec![page(100, 0, &users[..75]), page(100, 75, &users[75..])]);
        let handler = UserHandler::new(Box::new(service));

        let fetched = handler
            .get_all_users_matching(StatementBuilder::new().limit(75))
            .unwrap();

        assert_eq!(fetched, users);
        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].query, "LIMIT 75 OFFSET 0");
        assert_eq!(calls[1].query, "LIMIT 75 OFFSET 75");
    }

    #[test]
    fn test_empty_first_page_makes_one_call() {
        let (service, calls) = FakeUserService::new(vec![page(0, 0, &[])]);
        let handler = UserHandler::new(Box::new(service));

        assert!(handler.get_all_users().unwrap().is_empty());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_absent_page_makes_one_call() {
        let (service, calls) = FakeUserService::new(vec![Ok(None)]);
        let handler = UserHandler::new(Box::new(service));

        assert!(handler.get_all_users().unwrap().is_empty());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_absent_results_stop_the_loop() {
        let users = make_users(2);
        let (service, calls) = FakeUserService::new(vec![
            page(4, 0, &users),
            Ok(Some(UserPage {
                total_result_set_size: 4,
                start_index: 2,
                results: None,
            })),
        ]);
        let handler = UserHandler::new(Box::new(service));

        let fetched = handler
            .get_all_users_matching(StatementBuilder::new().limit(2))
            .unwrap();
        assert_eq!(fetched, users);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_exact_multiple_makes_extra_call() {
        let users = make_users(4);
        let (service, calls) = FakeUserService::new(vec![
            page(4, 0, &users[..2]),
            page(4, 2, &users[2..]),
            page(4, 4, &[]),
        ]);
        let handler = UserHandler::new(Box::new(service));

        let fetched = handler
            .get_all_users_matching(StatementBuilder::new().limit(2))
            .unwrap();
        assert_eq!(fetched, users);
        assert_eq!(calls.borrow().len(), 3);
        assert_eq!(calls.borrow()[2].query, "LIMIT 2 OFFSET 4");
    }

    #[test]
    fn test_total_size_does_not_stop_the_loop() {
        // Server claims 1 result in total but keeps returning full pages
        let users = make_users(3);
        let (service, calls) = FakeUserService::new(vec![
            page(1, 0, &users[..1]),
            page(1, 1, &users[1..2]),
            page(1, 2, &[]),
        ]);
        let handler = UserHandler::new(Box::new(service));

        let fetched = handler
            .get_all_users_matching(StatementBuilder::new().limit(1))
            .unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(calls.borrow().len(), 3);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let users = make_users(2);
        let (service, _) = FakeUserService::new(vec![page(4, 0, &users), page(4, 2, &users[..1])]);
        let handler = UserHandler::new(Box::new(service));

        let fetched = handler
            .get_all_users_matching(StatementBuilder::new().limit(2))
            .unwrap();
        assert_eq!(fetched, vec![users[0].clone(), users[1].clone(), users[0].clone()]);
    }

    #[test]
    fn test_error_propagates_without_retry() {
        let users = make_users(2);
        let (service, calls) = FakeUserService::new(vec![
            page(10, 0, &users),
            Err(anyhow::anyhow!("transport failure")),
        ]);
        let handler = UserHandler::new(Box::new(service));

        let err = handler
            .get_all_users_matching(StatementBuilder::new().limit(2))
            .unwrap_err();
        assert!(err.to_string().contains("transport failure"));
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_network_code_from_service() {
        let (service, _) = FakeUserService::new(vec![]);
        let handler = UserHandler::new(Box::new(service));
        assert_eq!(handler.network_code().as_str(), "NETWORK_CODE");
    }
}
