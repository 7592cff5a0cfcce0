pub mod focus_session;
pub mod subject;
pub mod timestamp;

pub use focus_session::{FocusSession, NewFocusSession, SessionDraft};
pub use subject::{NewSubject, Subject, SubjectChanges, SubjectRef};
