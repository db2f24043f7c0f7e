//! Auth subcommand implementations.

mod login;
mod logout;
mod logout_all;
mod refresh_token;
mod register;
mod request_password_reset;
mod reset_password;
mod verify_email;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Create a new session (login)
    Login(login::LoginArgs),

    /// Create a new account
    Register(register::RegisterArgs),

    /// Display the user of the active session
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh token for a new access token
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// End the active session
    Logout(logout::LogoutArgs),

    /// Revoke every session of the current user
    LogoutAll(logout_all::LogoutAllArgs),

    /// Confirm an email address with the token from the verification mail
    VerifyEmail(verify_email::VerifyEmailArgs),

    /// Ask for a password reset email
    RequestPasswordReset(request_password_reset::RequestPasswordResetArgs),

    /// Set a new password with a reset token
    ResetPassword(reset_password::ResetPasswordArgs),
}

pub async fn handle(cmd: AuthCommand, global: &GlobalArgs) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, global).await,
        AuthSubcommand::Register(args) => register::run(args, global).await,
        AuthSubcommand::Whoami(args) => whoami::run(args, global).await,
        AuthSubcommand::RefreshToken(args) => refresh_token::run(args, global).await,
        AuthSubcommand::Logout(args) => logout::run(args, global).await,
        AuthSubcommand::LogoutAll(args) => logout_all::run(args, global).await,
        AuthSubcommand::VerifyEmail(args) => verify_email::run(args, global).await,
        AuthSubcommand::RequestPasswordReset(args) => {
            request_password_reset::run(args, global).await
        }
        AuthSubcommand::ResetPassword(args) => reset_password::run(args, global).await,
    }
}
