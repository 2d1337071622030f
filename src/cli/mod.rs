pub mod create;
pub mod doctor;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod show;
