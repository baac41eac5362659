pub mod form;
pub mod notice;
pub mod pagination;
pub mod upload;
