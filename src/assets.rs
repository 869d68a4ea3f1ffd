use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web/dist"]
pub struct Assets;

pub async fn serve_embedded(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    if path.starts_with("api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    // SPA routing: extensionless paths get index.html
    let path = if path.is_empty() || !path.contains('.') {
        "index.html"
    } else {
        path
    };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_html() -> String {
        let file = Assets::get("index.html").unwrap();
        String::from_utf8(file.data.into_owned()).unwrap()
    }

    fn function_body<'a>(src: &'a str, name: &str) -> &'a str {
        let start = src.find(&format!("function {}(", name)).unwrap();
        let rest = &src[start..];
        let end = rest[1..].find("function ").map(|i| i + 1).unwrap_or(rest.len());
        &rest[..end]
    }

    #[test]
    fn test_list_refresh_keeps_unsaved_draft() {
        let html = index_html();

        // keystrokes update the draft as they happen
        assert!(html.contains(r#"addEventListener("input""#));
        assert!(!html.contains("readDraft"));

        // refreshing the list (mount, after delete, after save) re-renders only the table
        let fetch = function_body(&html, "fetchBooks");
        assert!(fetch.contains("renderBooks()"));
        assert!(!fetch.contains("renderForm()"));

        let delete = function_body(&html, "deleteBook");
        assert!(!delete.contains("renderForm()"));
        assert!(!delete.contains("state.draft"));
    }

    #[tokio::test]
    async fn test_spa_fallback_and_api_misses() {
        let req = Request::builder().uri("/books/edit").body(Body::empty()).unwrap();
        let resp = serve_embedded(req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        assert_eq!(serve_embedded(req).await.status(), StatusCode::NOT_FOUND);

        let req = Request::builder().uri("/missing.js").body(Body::empty()).unwrap();
        assert_eq!(serve_embedded(req).await.status(), StatusCode::NOT_FOUND);
    }
}
