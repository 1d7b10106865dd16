pub mod expense_repository;
pub mod lookup_repository;

pub use expense_repository::ExpenseRepository;
pub use lookup_repository::LookupRepository;
