//! Signup command handler

use crate::config::Config;
use crate::services::SignupInput;
use crate::state::SharedState;

pub async fn cmd_signup(
    config: Config,
    email: String,
    password: String,
    name: Option<String>,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let user = state
        .auth_service
        .signup(SignupInput {
            email,
            password,
            name,
        })
        .await?;

    let subjects = state.subject_service.list(user.id).await?;

    println!("✓ Created account {} (id {})", user.email, user.id);
    println!("  Starter subjects:");
    for subject in subjects {
        println!("    {:>4}  {}  {}", subject.id, subject.color, subject.name);
    }
    println!();
    println!("Log in through the API to get your token, or run the timer with --local-user.");

    Ok(())
}
