pub mod focus_session;
pub mod subject;
pub mod user;
