//! Route intents and the refresh-exempt set.
//!
//! Every request is tagged with the route it targets. Authentication routes
//! that exchange credentials are exempt from refresh-and-retry: a 401 from
//! them is a real credential rejection, not a stale access token.

use std::fmt;

/// Authentication routes exposed by the backend under `/auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthRoute {
    Login,
    Register,
    VerifyEmail,
    RequestPasswordReset,
    ResetPassword,
    Refresh,
    Me,
    Logout,
    LogoutAll,
    ProfileRequestCode,
    ProfileVerifyCode,
    ProfileUpdate,
}

impl AuthRoute {
    pub const ALL: [AuthRoute; 12] = [
        AuthRoute::Login,
        AuthRoute::Register,
        AuthRoute::VerifyEmail,
        AuthRoute::RequestPasswordReset,
        AuthRoute::ResetPassword,
        AuthRoute::Refresh,
        AuthRoute::Me,
        AuthRoute::Logout,
        AuthRoute::LogoutAll,
        AuthRoute::ProfileRequestCode,
        AuthRoute::ProfileVerifyCode,
        AuthRoute::ProfileUpdate,
    ];

    /// Path relative to the API base URL.
    pub const fn path(self) -> &'static str {
        match self {
            AuthRoute::Login => "/auth/login",
            AuthRoute::Register => "/auth/register",
            AuthRoute::VerifyEmail => "/auth/verify-email",
            AuthRoute::RequestPasswordReset => "/auth/request-password-reset",
            AuthRoute::ResetPassword => "/auth/reset-password",
            AuthRoute::Refresh => "/auth/refresh",
            AuthRoute::Me => "/auth/me",
            AuthRoute::Logout => "/auth/logout",
            AuthRoute::LogoutAll => "/auth/logout_all",
            AuthRoute::ProfileRequestCode => "/auth/profile/update/request-code",
            AuthRoute::ProfileVerifyCode => "/auth/profile/update/verify-code",
            AuthRoute::ProfileUpdate => "/auth/profile",
        }
    }

    /// Returns true for routes that authenticate the caller themselves.
    pub const fn exchanges_credentials(self) -> bool {
        matches!(
            self,
            AuthRoute::Login
                | AuthRoute::Register
                | AuthRoute::VerifyEmail
                | AuthRoute::RequestPasswordReset
                | AuthRoute::ResetPassword
                | AuthRoute::Refresh
        )
    }
}

/// The route a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Any resource endpoint (jobs, applications, admin, ...).
    #[default]
    Resource,
    /// One of the `/auth` endpoints.
    Auth(AuthRoute),
}

impl Route {
    /// Classify a request path relative to the API base.
    ///
    /// The query string and a trailing slash are ignored; the remaining path
    /// must equal a known auth route exactly.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);

        AuthRoute::ALL
            .into_iter()
            .find(|route| &route.path()[1..] == path)
            .map(Route::Auth)
            .unwrap_or(Route::Resource)
    }

    /// Returns true if a 401 on this route must never trigger refresh.
    pub fn is_refresh_exempt(self) -> bool {
        matches!(self, Route::Auth(route) if route.exchanges_credentials())
    }
}

impl From<AuthRoute> for Route {
    fn from(route: AuthRoute) -> Self {
        Route::Auth(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Resource => f.write_str("resource"),
            Route::Auth(route) => f.write_str(route.path()),
        }
    }
}
