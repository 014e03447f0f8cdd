//! Repository, facade and stateless services over the ledger.

pub mod clock;
pub mod demo;
pub mod ledger_manager;
pub mod repository;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger_manager::LedgerManager;
pub use repository::{LedgerRepository, LoadOrigin, LoadReport, Loaded};
