pub mod analytics;
pub use analytics::{DayData, MonthRange, MonthView, SubjectSlice, build_month_view};

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginResult, SignupInput, UserInfo};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod subject_service;
pub use subject_service::{CreateSubjectInput, SubjectError, SubjectService, UpdateSubjectInput};

pub mod subject_service_impl;
pub use subject_service_impl::SeaOrmSubjectService;

pub mod ledger_service;
pub use ledger_service::{LedgerError, LedgerService, RecordSessionInput};

pub mod ledger_service_impl;
pub use ledger_service_impl::SeaOrmLedgerService;
