use std::fmt::{self, Write};

use super::{escape, layout, Shell};

/// Values and messages to re-render the login form with.
#[derive(Debug, Default)]
pub struct LoginView<'a> {
    pub username: &'a str,
    pub username_error: Option<&'a str>,
    pub password_error: Option<&'a str>,
    /// Form-level message (credential mismatch, signed out).
    pub message: Option<&'a str>,
    /// Shown when the server runs with the fallback demo credentials.
    pub demo_hint: Option<(&'a str, &'a str)>,
}

/// # Errors
///
/// Propagates formatter errors.
pub fn render_login(view: &LoginView<'_>) -> Result<String, fmt::Error> {
    let mut body = String::new();
    writeln!(
        body,
        "<div class=\"card\" style=\"max-width:380px;margin:48px auto\">"
    )?;
    writeln!(body, "<h1>Sign in</h1>")?;
    writeln!(
        body,
        "<p class=\"muted\">Scrape product pages from Indian retailers.</p>"
    )?;
    if let Some(message) = view.message {
        writeln!(body, "<div class=\"error\" role=\"alert\">{}</div>", escape(message))?;
    }
    writeln!(body, "<form method=\"post\" action=\"/login\" novalidate>")?;
    writeln!(
        body,
        "<p><label for=\"username\">Username</label><br>\
<input type=\"text\" id=\"username\" name=\"username\" autocomplete=\"username\" value=\"{}\" required>",
        escape(view.username)
    )?;
    if let Some(err) = view.username_error {
        write!(body, "<br><span class=\"field-error\">{}</span>", escape(err))?;
    }
    writeln!(body, "</p>")?;
    writeln!(
        body,
        "<p><label for=\"password\">Password</label><br>\
<input type=\"password\" id=\"password\" name=\"password\" autocomplete=\"current-password\" required>"
    )?;
    if let Some(err) = view.password_error {
        write!(body, "<br><span class=\"field-error\">{}</span>", escape(err))?;
    }
    writeln!(body, "</p>")?;
    writeln!(body, "<button type=\"submit\">Sign in</button>")?;
    writeln!(body, "</form>")?;
    if let Some((user, pass)) = view.demo_hint {
        writeln!(
            body,
            "<p class=\"muted\">Demo credentials: <code>{}</code> / <code>{}</code></p>",
            escape(user),
            escape(pass)
        )?;
    }
    writeln!(body, "</div>")?;

    layout(
        &Shell {
            title: "Sign in",
            ..Shell::default()
        },
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rerender_keeps_username_escaped_and_never_password() {
        let html = render_login(&LoginView {
            username: "\"admin\"",
            password_error: Some("Password must be at least 6 characters"),
            ..LoginView::default()
        })
        .unwrap();
        assert!(html.contains("value=\"&quot;admin&quot;\""));
        assert!(html.contains("Password must be at least 6 characters"));
        assert!(!html.contains("Demo credentials"));
    }
}
