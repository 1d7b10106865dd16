pub mod expense;
pub mod lookup;
