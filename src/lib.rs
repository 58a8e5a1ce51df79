//! Personal work log kept in weekly JSON files. Entries are appended from the terminal, listed
//! over named periods and can be snapshotted into a git repository.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod manager;
pub mod storage;
pub mod utils;
