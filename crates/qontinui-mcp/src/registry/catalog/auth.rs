use crate::registry::{AuthOp, Param, Route, ToolCategory, ToolDescriptor};

pub(super) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "auth_login",
            ToolCategory::Auth,
            "Log in to Qontinui with email and password. The session token is kept \
             for all later tool calls.",
            Route::Auth(AuthOp::Login),
        )
        .param(Param::string("email", "Account email address").required())
        .param(Param::string("password", "Account password").required()),
        ToolDescriptor::new(
            "auth_status",
            ToolCategory::Auth,
            "Report whether the session is authenticated and, if so, as which user.",
            Route::Auth(AuthOp::Status),
        ),
        ToolDescriptor::new(
            "auth_logout",
            ToolCategory::Auth,
            "Forget the session token.",
            Route::Auth(AuthOp::Logout),
        ),
    ]
}
