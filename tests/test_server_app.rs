// Fake marketing site shared between tests and the standalone binary

use axum::{Router, extract::Path, http::StatusCode, response::Html, routing::get};

/// Primary navigation as (label, path)
pub const NAV_LINKS: [(&str, &str); 5] = [
    ("О нас", "/about/"),
    ("Контакты", "/contacts/"),
    ("Услуги", "/uslugi/"),
    ("Карьера", "/career/"),
    ("Блог", "/blog/"),
];

pub async fn create_app() -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/plain", get(plain_page))
        .route("/:section/", get(section_page))
}

fn header() -> String {
    let links: String = NAV_LINKS
        .iter()
        .map(|(label, href)| format!(r#"<a href="{}">{}</a>"#, href, label))
        .collect();
    format!(
        r#"<header>
        <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" alt="Company logo" width="120" height="40">
        <nav class="main-nav">{}</nav>
    </header>"#,
        links
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>{}</title></head>
<body>
    {}
    <div id="root">{}</div>
</body>
</html>"#,
        title,
        header(),
        body
    )
}

async fn home_page() -> Html<String> {
    Html(page(
        "Effective Mobile",
        r#"<h1>Разработка цифровых продуктов</h1>
        <script>
            // Late resource so the network-idle wait has something to settle
            setTimeout(() => fetch('/plain').catch(() => {}), 100);
        </script>"#,
    ))
}

async fn section_page(Path(section): Path<String>) -> Result<Html<String>, StatusCode> {
    let (label, _) = NAV_LINKS
        .iter()
        .find(|(_, href)| href.trim_matches('/') == section)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Html(page(label, &format!("<h1>{}</h1>", label))))
}

/// A page without header or navigation
async fn plain_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Plain</title></head>
<body><div id="root"><p>No navigation here.</p></div></body>
</html>"#,
    )
}
