use axum::{body::Body, response::Response};
use scraper::{ElementRef, Html, Selector};

use super::http::body_bytes;

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = body_bytes(response).await;
    Html::parse_document(&String::from_utf8_lossy(&body))
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    let body = body_bytes(response).await;
    Html::parse_fragment(&String::from_utf8_lossy(&body))
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// The trimmed text of every element matching `selector`.
#[track_caller]
pub(crate) fn select_text(html: &Html, selector: &str) -> Vec<String> {
    let selector = Selector::parse(selector).unwrap();

    html.select(&selector)
        .map(|element: ElementRef<'_>| element.text().collect::<String>().trim().to_owned())
        .collect()
}

/// The rows of the first table body in `html`, each row as a list of trimmed cell text.
#[track_caller]
pub(crate) fn table_rows(html: &Html) -> Vec<Vec<String>> {
    let row_selector = Selector::parse("tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    html.select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_owned())
                .collect()
        })
        .collect()
}
