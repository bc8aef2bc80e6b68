//! End-to-end runs against in-memory pages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use listing_harvest::error::{FetchError, RenderError};
use listing_harvest::extract::LocateStrategy;
use listing_harvest::fetch::{PageFetcher, RawResponse, RenderSession, RenderTiming, Renderer};
use listing_harvest::sink::{CsvFileSink, JsonFileSink, ListingSink};
use listing_harvest::summary::RunSummary;
use listing_harvest::{FetchStrategy, ScrapeError, Scraper, Settings};

#[derive(Default)]
struct Pages {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl Pages {
    fn with(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }
}

#[async_trait]
impl PageFetcher for Pages {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.pages.get(url) {
            Some(body) => RawResponse {
                status: 200,
                body: body.clone(),
            },
            None => RawResponse {
                status: 403,
                body: String::new(),
            },
        })
    }
}

/// Renderer whose sessions always fail to navigate.
#[derive(Default)]
struct BrokenBrowser {
    opened: AtomicUsize,
}

struct BrokenSession;

#[async_trait]
impl Renderer for BrokenBrowser {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BrokenSession))
    }
}

#[async_trait]
impl RenderSession for BrokenSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        Err(RenderError::Navigation(format!("net::ERR_FAILED at {}", url)))
    }

    async fn run_script(&mut self, _script: &str) -> Result<(), RenderError> {
        Ok(())
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        Ok(String::new())
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        Ok(())
    }
}

fn scraper(settings: &Settings, pages: Arc<Pages>, browser: Arc<BrokenBrowser>) -> Scraper {
    let fetch = FetchStrategy::new(pages, browser, RenderTiming::immediate());
    Scraper::with_fetch_strategy(settings, fetch).unwrap()
}

fn settings(max_results: usize) -> Settings {
    let mut settings = Settings::default();
    settings.scrape.max_results = max_results;
    settings
}

fn card(title: &str, company: &str, location: &str, stipend: &str) -> String {
    format!(
        r#"<div class="individual_internship">
            <h3 class="job-internship-name"><a class="job-title-href" href="/internship/detail/{slug}">{title}</a></h3>
            <p class="company-name">{company}</p>
            <div class="locations"><span><a href="/internships/{location}">{location}</a></span></div>
            <span class="stipend">{stipend}</span>
        </div>"#,
        slug = title.to_lowercase().replace(' ', "-"),
        title = title,
        company = company,
        location = location,
        stipend = stipend,
    )
}

fn document(cards: &[String]) -> String {
    format!(
        "<html><body><div class=\"internship_list_container\">{}</div></body></html>",
        cards.concat()
    )
}

#[tokio::test]
async fn test_actively_hiring_card_end_to_end() {
    let markup = document(&[r#"<div class="individual_internship">
            <a class="job-title-href" href="/internship/detail/data-analyst-at-acme">Data Analyst</a>
            <p class="company-name">Acme Inc <span class="actively-hiring-badge">Actively hiring</span></p>
        </div>"#
        .to_string()]);
    let pages = Arc::new(Pages::default().with("https://jobs.test/internships", markup));
    let browser = Arc::new(BrokenBrowser::default());

    let report = scraper(&settings(30), pages, browser.clone())
        .run_base("https://jobs.test/internships/")
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.title, "Data Analyst");
    assert_eq!(record.company, "Acme Inc");
    assert!(record.actively_hiring);
    assert!(!record.early_applicant);
    assert_eq!(
        record.apply_link.as_deref(),
        Some("https://internshala.com/internship/detail/data-analyst-at-acme?referral=web_share")
    );

    // 30 results => 3 planned pages; the two missing ones fall back to the browser once each
    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.unavailable_pages(), 2);
    assert_eq!(browser.opened.load(Ordering::SeqCst), 2);

    let first = report
        .pages
        .iter()
        .find(|p| p.url == "https://jobs.test/internships")
        .unwrap();
    assert_eq!(
        first.strategy,
        LocateStrategy::Selector(".individual_internship".to_string())
    );
}

#[tokio::test]
async fn test_duplicates_keep_first_and_cap_holds() {
    let page_one = document(&[
        card("Designer", "Globex", "Pune", "5000"),
        card("Designer", "Globex", "Pune", "9000"),
        card("Writer", "Acme", "Delhi", "4000"),
    ]);
    let page_two = document(&[
        card("Tester", "Initech", "Remote", "3000"),
        card("Analyst", "Umbrella", "Mumbai", "6000"),
        card("Marketer", "Hooli", "Remote", "2000"),
    ]);
    let pages = Arc::new(
        Pages::default()
            .with("https://jobs.test/internships", page_one)
            .with("https://jobs.test/internships/page-2", page_two),
    );

    let mut settings = settings(4);
    settings.scrape.concurrency = 1;
    let report = scraper(&settings, pages.clone(), Arc::new(BrokenBrowser::default()))
        .run(vec![
            "https://jobs.test/internships".to_string(),
            "https://jobs.test/internships/page-2".to_string(),
            "https://jobs.test/internships/page-3".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(report.records.len(), 4);
    assert_eq!(report.duplicates(), 1);
    // cap reached on page two, so page three is never requested
    assert_eq!(pages.calls.load(Ordering::SeqCst), 2);

    let designer = report
        .records
        .iter()
        .find(|r| r.title == "Designer")
        .unwrap();
    assert_eq!(designer.stipend.as_deref(), Some("5000"));

    let companies: Vec<_> = report.records.iter().map(|r| r.company.as_str()).collect();
    assert_eq!(companies, ["Acme", "Globex", "Initech", "Umbrella"]);

    let summary = RunSummary::from_records(&report.records);
    assert_eq!(summary.unique_companies, 4);
}

#[tokio::test]
async fn test_cards_without_title_are_dropped() {
    let markup = document(&[
        r#"<div class="individual_internship"><p class="company-name">Nameless Co</p></div>"#
            .to_string(),
        card("Editor", "Acme", "Delhi", "1000"),
    ]);
    let pages = Arc::new(Pages::default().with("https://jobs.test/internships", markup));

    let report = scraper(&settings(5), pages, Arc::new(BrokenBrowser::default()))
        .run_base("https://jobs.test/internships")
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.pages[0].skipped, 1);
    assert!(report.records.iter().all(|r| r.company != "Nameless Co"));
}

#[tokio::test]
async fn test_all_pages_failing_is_no_results() {
    let browser = Arc::new(BrokenBrowser::default());
    let err = scraper(&settings(20), Arc::new(Pages::default()), browser.clone())
        .run_base("https://jobs.test/internships")
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::NoResults { pages: 2 }));
    assert_eq!(browser.opened.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_results_written_to_files() {
    let markup = document(&[
        card("Designer", "Globex, Ltd", "Pune", "5000"),
        card("Writer", "Acme", "Delhi", "4000"),
    ]);
    let pages = Arc::new(Pages::default().with("https://jobs.test/internships", markup));
    let report = scraper(&settings(5), pages, Arc::new(BrokenBrowser::default()))
        .run_base("https://jobs.test/internships")
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("out.json");
    let csv_path = dir.path().join("out.csv");
    JsonFileSink::new(&json_path)
        .write(&report.records)
        .await
        .unwrap();
    CsvFileSink::new(&csv_path)
        .write(&report.records)
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json[0]["company"], "Acme");
    assert_eq!(json[1]["company"], "Globex, Ltd");
    assert_eq!(json[1]["actively_hiring"], false);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("\"Globex, Ltd\""));
}

#[tokio::test]
async fn test_cap_holds_with_every_page_in_flight() {
    let pages = Arc::new(
        Pages::default()
            .with(
                "https://jobs.test/internships",
                document(&[
                    card("Designer", "Globex", "Pune", "5000"),
                    card("Writer", "Acme", "Delhi", "4000"),
                ]),
            )
            .with(
                "https://jobs.test/internships/page-2",
                document(&[
                    card("Tester", "Initech", "Remote", "3000"),
                    card("Analyst", "Umbrella", "Mumbai", "6000"),
                ]),
            ),
    );

    let mut settings = settings(3);
    settings.scrape.concurrency = 0;
    let report = scraper(&settings, pages.clone(), Arc::new(BrokenBrowser::default()))
        .run(vec![
            "https://jobs.test/internships".to_string(),
            "https://jobs.test/internships/page-2".to_string(),
        ])
        .await
        .unwrap();

    // both pages were requested together; the later one is cut at the cap
    assert_eq!(pages.calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.pages.iter().map(|p| p.accepted).sum::<usize>(), 3);
}
