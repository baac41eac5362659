//! Общие контракты админки каталога: сущности, DTO, формы, пагинация.

pub mod domain;
pub mod shared;
