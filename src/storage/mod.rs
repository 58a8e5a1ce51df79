//!  Storage is organized through [week_storage::WeekStorageImpl].
//!  The basic idea is:
//!   - There is a logs root with a directory per ISO year.
//!   - Every ISO week of the year has its own JSON file named after the week number.
//!   - Inside of a file entries are grouped by day (`MMDD`) and numbered per day.

pub mod entities;
pub mod week_storage;
