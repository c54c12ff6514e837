use axum::response::Html;

use crate::shared::utils::html_escape;

use super::flash::Flash;

const STYLE: &str = r#"
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f5; color: #1a1a1a; }
        nav { background: #1a1a1a; padding: 12px 24px; display: flex; gap: 20px; align-items: center; }
        nav a { color: #e0e0e0; text-decoration: none; font-size: 14px; }
        nav a:hover { color: white; }
        nav .spacer { flex: 1; }
        .container { max-width: 1200px; margin: 0 auto; padding: 24px; }
        .header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 24px; }
        .header h1 { font-size: 26px; }
        .card { background: white; border-radius: 12px; padding: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); margin-bottom: 24px; }
        .card h2 { font-size: 18px; margin-bottom: 12px; }
        .stats { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 24px; }
        .stat-value { font-size: 32px; font-weight: 600; }
        .stat-label { font-size: 13px; color: #666; }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 10px 8px; border-bottom: 1px solid #eee; font-size: 14px; }
        th { color: #666; font-weight: 500; }
        form.stacked label { display: block; font-size: 13px; color: #444; margin: 10px 0 4px; }
        form.stacked input, form.stacked select, form.stacked textarea { width: 100%; padding: 8px 12px; border: 1px solid #ddd; border-radius: 8px; font-size: 14px; }
        .btn { display: inline-block; padding: 8px 16px; border: none; border-radius: 8px; cursor: pointer; font-size: 14px; font-weight: 500; text-decoration: none; }
        .btn-primary { background: #0066cc; color: white; }
        .btn-danger { background: #cc2936; color: white; }
        .btn-link { background: none; color: #0066cc; padding: 0; }
        form.stacked .btn { margin-top: 16px; }
        form.inline { display: inline; }
        .flash { padding: 12px 16px; border-radius: 8px; margin-bottom: 16px; font-size: 14px; }
        .flash-success { background: #e6f4ea; color: #1e6b34; }
        .flash-info { background: #e8f0fe; color: #1a4f9c; }
        .flash-error { background: #fce8e6; color: #a50e0e; }
        .status { padding: 2px 8px; border-radius: 4px; font-size: 12px; background: #f0f0f0; }
        .empty-state { text-align: center; padding: 40px 24px; color: #666; }
"#;

fn nav(user: Option<&str>) -> String {
    match user {
        Some(name) => format!(
            r#"<nav>
        <a href="/dashboard">Dashboard</a>
        <a href="/invoices">Invoices</a>
        <a href="/clients">Clients</a>
        <a href="/products">Products</a>
        <a href="/company/settings">Company</a>
        <span class="spacer"></span>
        <a href="/logout">Log out ({})</a>
    </nav>"#,
            html_escape(name)
        ),
        None => r#"<nav>
        <a href="/">Home</a>
        <span class="spacer"></span>
        <a href="/login">Log in</a>
    </nav>"#
            .to_string(),
    }
}

fn flash_html(flash: Option<&Flash>) -> String {
    flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                html_escape(&f.message)
            )
        })
        .unwrap_or_default()
}

/// Wrap a page body in the shared document shell. `body` must already be escaped.
pub fn page(title: &str, user: Option<&str>, flash: Option<&Flash>, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {flash}
        {body}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav(user),
        flash = flash_html(flash),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::flash::FlashLevel;

    #[test]
    fn test_page_escapes_title_and_flash() {
        let flash = Flash {
            level: FlashLevel::Error,
            message: "<b>bad</b>".to_string(),
        };
        let Html(html) = page("A & B", Some("admin"), Some(&flash), "<p>ok</p>");
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("flash-error"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(html.contains("<p>ok</p>"));
        assert!(html.contains("Log out (admin)"));
    }

    #[test]
    fn test_anonymous_nav_links_to_login() {
        let Html(html) = page("Home", None, None, "");
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains("/logout"));
    }
}
