use crate::config::BrowserConfig;
use crate::scrapers::table::{self, PRICE_CELL_SELECTOR};
use crate::scrapers::traits::PriceSource;
use crate::scrapers::types::{AreaPrices, PriceQuote};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAP_SEARCH_URL: &str = "https://rtech.or.kr/main/mapSearch.do";
const ACCEPT_LANGUAGE: &str = "ko-KR";

const SEARCH_INPUT: &str = "#searchInput";
const FIRST_RESULT: &str = "#quickSearchResult > li:first-child > a";
const MORE_BUTTON: &str = ".map_pop_info_bottom_btn";
const MORE_LABEL: &str = "더보기";

const TAB_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser-based price lookup against R-TECH using headless Chrome
pub struct RtechBrowserSource {
    config: Arc<BrowserConfig>,
}

impl RtechBrowserSource {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl PriceSource for RtechBrowserSource {
    async fn lookup(&self, address: &str) -> Result<PriceQuote> {
        let config = Arc::clone(&self.config);
        let address = address.to_string();

        // headless_chrome blocks, so keep it off the async workers
        tokio::task::spawn_blocking(move || lookup_blocking(&config, &address))
            .await
            .context("Browser task panicked")?
    }

    fn source_name(&self) -> &'static str {
        "R-TECH"
    }
}

fn launch(config: &BrowserConfig) -> Result<Browser> {
    info!("Launching headless Chrome...");

    let args = vec![OsStr::new("--disable-dev-shm-usage")];
    let options = LaunchOptions::default_builder()
        .headless(config.headless)
        .sandbox(false)
        .window_size(Some((1280, 960)))
        .proxy_server(config.proxy.as_deref())
        .idle_browser_timeout(config.session_timeout)
        .args(args)
        .build()
        .context("Failed to build launch options")?;

    Browser::new(options).context("Failed to launch Chrome browser")
}

/// Run one full lookup. The browser is dropped, and Chrome with it,
/// when this returns.
fn lookup_blocking(config: &BrowserConfig, address: &str) -> Result<PriceQuote> {
    let browser = launch(config)?;

    let tab = browser.new_tab().context("Failed to open tab")?;
    tab.set_default_timeout(config.element_timeout);
    tab.set_user_agent(&config.user_agent, Some(ACCEPT_LANGUAGE), None)
        .context("Failed to set user agent")?;

    info!("Opening R-TECH map search for {}", address);
    tab.navigate_to(MAP_SEARCH_URL)
        .context("Failed to open map search page")?;
    tab.wait_until_navigated()
        .context("Map search page did not finish loading")?;

    dismiss_notices(&tab);

    let input = tab
        .wait_for_element(SEARCH_INPUT)
        .context("Search input did not appear")?;
    input
        .type_into(address)
        .context("Failed to type address")?;

    // Quick search fires on keyup and needs a moment to fill the dropdown
    thread::sleep(config.quick_search_delay);

    tab.wait_for_element(FIRST_RESULT)
        .with_context(|| format!("No quick search result for '{}'", address))?
        .click()
        .context("Failed to open first search result")?;

    thread::sleep(config.info_window_delay);

    let known_tabs = tab_count(&browser)?;
    click_more_button(&tab)?;

    let popup = wait_for_popup(&browser, known_tabs, config.popup_timeout)?;
    popup
        .wait_until_navigated()
        .context("Price popup did not finish loading")?;
    let source_url = popup.get_url();
    debug!("Price popup opened at {}", source_url);

    let prices = read_prices(&popup, config.table_timeout)?;
    if prices.is_empty() {
        warn!("No prices found for {}", address);
    } else {
        info!("Read prices for {}: {:?}", address, prices);
    }

    Ok(PriceQuote {
        prices,
        source_url: Some(source_url),
    })
}

/// Close notice layers that cover the map, if any
fn dismiss_notices(tab: &Tab) {
    let _ = tab.evaluate(
        r#"
        document.querySelectorAll('.pop_close, .btn_close, .layer_close, button[class*="close"]')
            .forEach(button => button.click());
        "#,
        false,
    );
}

fn click_more_button(tab: &Tab) -> Result<()> {
    let buttons = tab
        .wait_for_elements(MORE_BUTTON)
        .context("Map info window did not appear")?;

    for button in &buttons {
        let label = button.get_inner_text().unwrap_or_default();
        if label.contains(MORE_LABEL) {
            button
                .click()
                .with_context(|| format!("Failed to click {}", MORE_LABEL))?;
            return Ok(());
        }
    }

    bail!("No {} button in map info window", MORE_LABEL)
}

fn tab_count(browser: &Browser) -> Result<usize> {
    let tabs = browser
        .get_tabs()
        .lock()
        .map_err(|_| anyhow!("Tab list lock poisoned"))?;
    Ok(tabs.len())
}

/// Wait for the tab opened by the "더보기" click
fn wait_for_popup(browser: &Browser, known_tabs: usize, timeout: Duration) -> Result<Arc<Tab>> {
    let deadline = Instant::now() + timeout;

    loop {
        {
            let tabs = browser
                .get_tabs()
                .lock()
                .map_err(|_| anyhow!("Tab list lock poisoned"))?;
            if tabs.len() > known_tabs {
                if let Some(popup) = tabs.last() {
                    return Ok(Arc::clone(popup));
                }
            }
        }

        if Instant::now() >= deadline {
            bail!("Price popup did not open within {:?}", timeout);
        }
        thread::sleep(TAB_POLL_INTERVAL);
    }
}

/// A popup without a rendered price table means the address has no
/// listed prices; that is an empty result, not an error.
fn read_prices(popup: &Tab, timeout: Duration) -> Result<AreaPrices> {
    if let Err(e) = popup.wait_for_element_with_custom_timeout(PRICE_CELL_SELECTOR, timeout) {
        warn!("Price table did not load in time: {}", e);
        return Ok(AreaPrices::default());
    }

    let html = page_html(popup)?;
    if !table::has_price_table(&html)? {
        warn!("Price cells vanished before the page was captured");
        return Ok(AreaPrices::default());
    }

    table::extract_area_prices(&html)
}

fn page_html(tab: &Tab) -> Result<String> {
    let html_result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .context("Failed to read page HTML")?;

    match html_result.value.as_ref().and_then(|v| v.as_str()) {
        Some(html) => {
            debug!("Captured {} bytes of popup HTML", html.len());
            Ok(html.to_string())
        }
        None => bail!("Page HTML was empty"),
    }
}
