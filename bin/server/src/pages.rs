//! Minimal server-rendered pages.
//!
//! Two pages exist: a public login page and a user page behind
//! `RequireAuth`. Both render a transient `notice` passed as a query
//! parameter, the mechanism the auth redirects use to surface flow
//! outcomes ("Logged in successfully", "Invalid access attempt").

use axum::{extract::Query, response::Html};
use serde::Deserialize;

use crate::auth::RequireAuth;

/// Query parameters shared by both pages.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Transient flow outcome to display, if any.
    pub notice: Option<String>,
}

/// Public landing page with the LINE Login entry point.
pub async fn login_page(Query(query): Query<PageQuery>) -> Html<String> {
    let notice = render_notice(query.notice.as_deref());
    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n<head><title>line-bridge</title></head>\n<body>\n\
         {notice}\
         <h1>line-bridge</h1>\n\
         <p><a href=\"/line_login_api/login\">Log in with LINE</a></p>\n\
         </body>\n</html>\n"
    ))
}

/// Page shown to a logged-in user.
pub async fn user_page(
    RequireAuth(auth): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let notice = render_notice(query.notice.as_deref());
    let user = auth.user();
    let name = user.display_name().unwrap_or_else(|| user.uid());
    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n<head><title>line-bridge</title></head>\n<body>\n\
         {notice}\
         <h1>Hello, {}</h1>\n\
         <p>Email: {}</p>\n\
         <form action=\"/auth/logout\" method=\"get\">\
         <button type=\"submit\">Log out</button></form>\n\
         </body>\n</html>\n",
        escape_html(name),
        escape_html(user.email()),
    ))
}

/// Renders the notice banner, or nothing when no notice is set.
fn render_notice(notice: Option<&str>) -> String {
    match notice {
        Some(text) => format!("<p class=\"notice\">{}</p>\n", escape_html(text)),
        None => String::new(),
    }
}

/// Escapes text for interpolation into HTML body and attribute positions.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Alice & Bob's"), "Alice &amp; Bob&#39;s");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn notice_is_rendered_escaped() {
        let html = render_notice(Some("Logged in <b>successfully</b>"));
        assert!(html.contains("Logged in &lt;b&gt;successfully&lt;/b&gt;"));
    }

    #[test]
    fn missing_notice_renders_nothing() {
        assert!(render_notice(None).is_empty());
    }
}
