pub mod owed_balances;
pub mod prelude;
