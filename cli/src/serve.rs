//! Local browser view of a generated deck.

use anyhow::{anyhow, Result};
use std::io::Cursor;
use std::sync::Arc;
use storydeck_common::Deck;
use storydeck_core::Navigator;
use tiny_http::{Header, Response, Server};
use tracing::{info, warn};

use crate::html;

#[derive(Debug, PartialEq, Eq)]
enum Page {
    Html(String),
    Download(String),
    NotFound,
}

pub async fn serve(deck: Deck, port: u16, open_browser: bool) -> Result<()> {
    let server = Server::http(("127.0.0.1", port))
        .map_err(|e| anyhow!("could not listen on 127.0.0.1:{port}: {e}"))?;
    let url = format!("http://127.0.0.1:{port}/");
    println!("Serving \"{}\" at {url} (Ctrl+C to stop)", deck.topic());
    info!(%url, slides = deck.len(), "serving deck");

    if open_browser {
        if let Err(e) = webbrowser::open(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    let deck = Arc::new(deck);
    tokio::task::spawn_blocking(move || {
        for request in server.incoming_requests() {
            let page = route(&deck, request.url());
            if let Err(e) = request.respond(into_response(page)) {
                warn!(error = %e, "failed to send response");
            }
        }
    })
    .await?;
    Ok(())
}

fn route(deck: &Deck, url: &str) -> Page {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    match path {
        "/" => {
            let mut nav = Navigator::for_deck(deck);
            let requested = slide_param(query).unwrap_or(1).max(1);
            for _ in 1..requested.min(deck.len()) {
                nav.next();
            }
            Page::Html(html::render_viewer(deck, &nav))
        }
        "/download" => {
            let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
            Page::Download(html::render_document(deck, &generated_at))
        }
        _ => Page::NotFound,
    }
}

fn slide_param(query: &str) -> Option<usize> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("slide="))
        .and_then(|v| v.parse().ok())
}

fn into_response(page: Page) -> Response<Cursor<Vec<u8>>> {
    let (body, status, disposition): (String, u16, Option<&str>) = match page {
        Page::Html(body) => (body, 200, None),
        Page::Download(body) => (body, 200, Some("attachment; filename=\"slide_deck.html\"")),
        Page::NotFound => ("not found".to_string(), 404, None),
    };

    let mut response = Response::from_string(body).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
        response.add_header(header);
    }
    if let Some(value) = disposition {
        if let Ok(header) = Header::from_bytes(&b"Content-Disposition"[..], value.as_bytes()) {
            response.add_header(header);
        }
    }
    response
}
