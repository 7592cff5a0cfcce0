mod init;
mod report;
mod signup;
mod timer;

pub use init::cmd_init;
pub use report::cmd_report;
pub use signup::cmd_signup;
pub use timer::{TimerArgs, cmd_timer};
