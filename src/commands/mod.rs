pub mod clean;
pub mod convert;
pub mod tag;
