//! Listing-page scraping and PDF downloads.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode, redirect::Policy};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::CandidateLink;
use crate::config::Config;
use crate::rate_limit::RequestPacer;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Discovers candidate PDF links and downloads them.
#[derive(Debug)]
pub struct DocumentFetcher {
    http: Client,
    pacer: RequestPacer,
}

impl DocumentFetcher {
    pub fn new(http: Client, pacer: RequestPacer) -> Self {
        Self { http, pacer }
    }

    /// Build a client with the configured user agent, timeout and pacing.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(8))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self::new(http, RequestPacer::from_millis(config.request_interval_ms)))
    }

    /// Every PDF link on the listing page, in page order, without truncation.
    pub async fn list_links(&self, listing_url: &str) -> Result<Vec<CandidateLink>, FetchError> {
        let (base, html) = self.listing_page(listing_url).await?;
        let links = extract_pdf_links(&html, &base);

        log::info!("{}: found {} PDF link(s)", listing_url, links.len());
        Ok(links)
    }

    /// PDF links from the listing's cards whose publication date is `date`.
    pub async fn list_links_published_on(
        &self,
        listing_url: &str,
        date: NaiveDate,
    ) -> Result<Vec<CandidateLink>, FetchError> {
        let (base, html) = self.listing_page(listing_url).await?;
        let links = extract_pdf_links_published_on(&html, &base, date);

        log::info!(
            "{}: found {} PDF link(s) published on {}",
            listing_url,
            links.len(),
            date.format(PUBLICATION_DATE_FORMAT)
        );
        Ok(links)
    }

    async fn listing_page(&self, listing_url: &str) -> Result<(Url, String), FetchError> {
        let base = Url::parse(listing_url).map_err(|e| FetchError::InvalidUrl {
            url: listing_url.to_string(),
            reason: e.to_string(),
        })?;
        let body = self.get(base.clone()).await?;
        let html = String::from_utf8_lossy(&body).into_owned();
        Ok((base, html))
    }

    /// The first `max_count` PDF links on the listing page.
    ///
    /// Any failure to retrieve the page is an error; a partial listing is never returned.
    pub async fn list_candidates(
        &self,
        listing_url: &str,
        max_count: usize,
    ) -> Result<Vec<CandidateLink>, FetchError> {
        let mut links = self.list_links(listing_url).await?;
        links.truncate(max_count);
        Ok(links)
    }

    /// Raw bytes of one document.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let bytes = self.get(parsed).await?;
        log::debug!("downloaded {} ({} bytes)", url, bytes.len());
        Ok(bytes)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        self.pacer.acquire().await;

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Date format of a listing card's subtitle, e.g. `Poz. 1234, 01.03.2025`.
const PUBLICATION_DATE_FORMAT: &str = "%d.%m.%Y";

/// Collect `a[href]` targets ending in `.pdf`, resolved against `base`.
///
/// Page order is kept; repeated links keep their first position.
pub fn extract_pdf_links(html: &str, base: &Url) -> Vec<CandidateLink> {
    let doc = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();

    dedup_pdf_links(doc.select(&anchor_sel).filter_map(|a| a.value().attr("href")), base)
}

/// Like [`extract_pdf_links`], restricted to `div.card-body` cards whose
/// `p.card-subtitle` ends in a `DD.MM.YYYY` date equal to `date`.
///
/// Cards without a subtitle or with an unparseable date are ignored.
pub fn extract_pdf_links_published_on(html: &str, base: &Url, date: NaiveDate) -> Vec<CandidateLink> {
    let doc = Html::parse_document(html);
    let card_sel = Selector::parse("div.card-body").unwrap();
    let subtitle_sel = Selector::parse("p.card-subtitle").unwrap();
    let anchor_sel = Selector::parse("a[href]").unwrap();
    let anchors = &anchor_sel;

    let hrefs = doc
        .select(&card_sel)
        .filter(|card| {
            card.select(&subtitle_sel)
                .next()
                .and_then(|subtitle| publication_date(&subtitle.text().collect::<String>()))
                == Some(date)
        })
        .flat_map(move |card| card.select(anchors).filter_map(|a| a.value().attr("href")));

    dedup_pdf_links(hrefs, base)
}

/// The date after the last comma of a card subtitle.
fn publication_date(subtitle: &str) -> Option<NaiveDate> {
    let raw = subtitle.rsplit(',').next()?.trim();
    NaiveDate::parse_from_str(raw, PUBLICATION_DATE_FORMAT).ok()
}

fn dedup_pdf_links<'a>(hrefs: impl Iterator<Item = &'a str>, base: &Url) -> Vec<CandidateLink> {
    let mut seen = HashSet::new();
    hrefs
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| url.path().to_ascii_lowercase().ends_with(".pdf"))
        .map(|url| url.to_string())
        .filter(|url| seen.insert(url.clone()))
        .map(|url| CandidateLink { url })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://dziennikustaw.gov.pl/DU/rok/2025").unwrap()
    }

    fn urls(links: &[CandidateLink]) -> Vec<&str> {
        links.iter().map(|l| l.url.as_str()).collect()
    }

    #[test]
    fn keeps_only_pdf_links_in_page_order() {
        let html = r#"
            <html><body>
              <a href="/DU/2025/10/D2025000001001.pdf">one</a>
              <a href="/DU/rok/2025/pozycja/11">details</a>
              <a href="https://dziennikustaw.gov.pl/DU/2025/12/D2025000001201.PDF">two</a>
              <a>no href</a>
              <a href="mailto:kontakt@example.pl">mail</a>
              <a href="files/three.pdf?download=1">three</a>
            </body></html>"#;
        let links = extract_pdf_links(html, &base());
        assert_eq!(
            urls(&links),
            vec![
                "https://dziennikustaw.gov.pl/DU/2025/10/D2025000001001.pdf",
                "https://dziennikustaw.gov.pl/DU/2025/12/D2025000001201.PDF",
                "https://dziennikustaw.gov.pl/DU/rok/files/three.pdf?download=1",
            ]
        );
    }

    #[test]
    fn repeated_links_keep_first_position() {
        let html = r#"
            <a href="/a.pdf"><img src="icon.png"></a>
            <a href="/b.pdf">b</a>
            <a href="/a.pdf">a again</a>"#;
        let links = extract_pdf_links(html, &base());
        assert_eq!(
            urls(&links),
            vec!["https://dziennikustaw.gov.pl/a.pdf", "https://dziennikustaw.gov.pl/b.pdf"]
        );
    }

    const CARDS: &str = r#"
        <div class="card-body">
          <h5 class="card-title">Ustawa o zmianie ustawy o podatku</h5>
          <p class="card-subtitle">Poz. 301, 01.03.2025</p>
          <a class="btn" href="/DU/2025/301/D2025000030101.pdf">PDF</a>
        </div>
        <div class="card-body">
          <h5 class="card-title">Rozporządzenie Ministra</h5>
          <p class="card-subtitle">Poz. 300, 28.02.2025</p>
          <a class="btn" href="/DU/2025/300/D2025000030001.pdf">PDF</a>
        </div>
        <div class="card-body">
          <h5 class="card-title">Obwieszczenie</h5>
          <p class="card-subtitle">Poz. 302,  01.03.2025 </p>
          <a class="btn" href="/DU/2025/302/D2025000030201.pdf">PDF</a>
          <a href="/DU/rok/2025/pozycja/302">szczegóły</a>
        </div>
        <div class="card-body">
          <p class="card-subtitle">bez daty</p>
          <a class="btn" href="/DU/2025/303/D2025000030301.pdf">PDF</a>
        </div>
        <a href="/DU/2025/304/D2025000030401.pdf">outside any card</a>"#;

    #[test]
    fn published_on_keeps_only_that_days_cards() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let links = extract_pdf_links_published_on(CARDS, &base(), day);
        assert_eq!(
            urls(&links),
            vec![
                "https://dziennikustaw.gov.pl/DU/2025/301/D2025000030101.pdf",
                "https://dziennikustaw.gov.pl/DU/2025/302/D2025000030201.pdf",
            ]
        );

        let other = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(extract_pdf_links_published_on(CARDS, &base(), other).len(), 1);
        assert_eq!(extract_pdf_links(CARDS, &base()).len(), 5);
    }

    #[test]
    fn subtitle_date_is_read_after_last_comma() {
        assert_eq!(publication_date("Poz. 12, 05.11.2024"), NaiveDate::from_ymd_opt(2024, 11, 5));
        assert_eq!(publication_date("05.11.2024"), NaiveDate::from_ymd_opt(2024, 11, 5));
        assert_eq!(publication_date("Poz. 12, 2024-11-05"), None);
    }

    #[test]
    fn page_without_pdfs_is_empty() {
        assert!(extract_pdf_links("<p>Brak nowych aktów</p>", &base()).is_empty());
    }

    fn fetcher() -> DocumentFetcher {
        DocumentFetcher::new(Client::new(), RequestPacer::unpaced())
    }

    fn listing(count: usize) -> String {
        let anchors: String = (1..=count)
            .map(|i| format!(r#"<li><a href="/pdf/act{i}.pdf">Act {i}</a></li>"#))
            .collect();
        format!("<html><body><ul>{anchors}</ul></body></html>")
    }

    #[tokio::test]
    async fn list_candidates_truncates_in_page_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/DU")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(listing(7))
            .expect(1)
            .create_async()
            .await;

        let listing_url = format!("{}/DU", server.url());
        let links = fetcher().list_candidates(&listing_url, 3).await.unwrap();

        mock.assert_async().await;
        let expected: Vec<String> = (1..=3).map(|i| format!("{}/pdf/act{i}.pdf", server.url())).collect();
        assert_eq!(urls(&links), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn list_candidates_with_zero_max_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/DU")
            .with_status(200)
            .with_body(listing(2))
            .create_async()
            .await;

        let links = fetcher()
            .list_candidates(&format!("{}/DU", server.url()), 0)
            .await
            .unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn listing_error_status_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/DU")
            .with_status(503)
            .create_async()
            .await;

        let err = fetcher()
            .list_candidates(&format!("{}/DU", server.url()), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn unreachable_listing_is_http_error() {
        // Port 9 (discard) is closed on test hosts.
        let err = fetcher()
            .list_candidates("http://127.0.0.1:9/DU", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn download_returns_body_bytes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pdf/act1.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(b"%PDF-1.7 body".as_slice())
            .create_async()
            .await;

        let bytes = fetcher()
            .download(&format!("{}/pdf/act1.pdf", server.url()))
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF-1.7 body");
    }

    #[tokio::test]
    async fn download_not_found_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pdf/gone.pdf")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher()
            .download(&format!("{}/pdf/gone.pdf", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn download_rejects_invalid_url() {
        let err = fetcher().download("::nope::").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
