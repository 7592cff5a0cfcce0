pub use super::focus_sessions::Entity as FocusSessions;
pub use super::subjects::Entity as Subjects;
pub use super::users::Entity as Users;
