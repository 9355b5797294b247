pub mod convert;
pub mod images;
pub mod pages;
pub mod tags;
