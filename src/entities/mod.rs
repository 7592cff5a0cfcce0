pub mod prelude;

pub mod focus_sessions;
pub mod subjects;
pub mod users;
