use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{CardDeliverer, CardList};
use crate::card::Card;
use crate::error::{Error, Result};
use crate::webdriver::{Capabilities, WebDriver};

/// AnkiWeb's login page.
pub const ANKIWEB_LOGIN_URL: &str = "https://ankiweb.net/account/login";

const EMAIL_INPUT: &str = r#"input[id="email"]"#;
const PASSWORD_INPUT: &str = r#"input[type="password"]"#;
const SUBMIT_INPUT: &str = r#"input[type="submit"]"#;
const NAV_LINK: &str = r#"a[class="nav-link"]"#;
const DECK_INPUT: &str = r#"input[id="deck"]"#;
const FRONT_FIELD_ID: &str = "f0";
const BACK_FIELD_ID: &str = "f1";
const SAVE_BUTTON: &str = r#"button[class$="primary"]"#;

/// Index of the "Add" entry among the navigation links.
const ADD_NAV_INDEX: usize = 1;

/// Browser and account settings for AnkiWeb delivery.
#[derive(Debug, Clone)]
pub struct AnkiWebOptions {
    /// WebDriver server URL, e.g. `http://localhost:4444` for geckodriver.
    pub webdriver_url: String,
    /// Browser session capabilities.
    pub capabilities: Capabilities,
    /// AnkiWeb account email.
    pub email: String,
    /// AnkiWeb account password.
    pub password: String,
    /// Deck typed into the add page. `None` keeps AnkiWeb's current deck.
    pub deck: Option<String>,
    /// Login page URL.
    pub login_url: String,
    /// Window size as (width, height).
    pub window_size: (u32, u32),
    /// Implicit wait for element lookups.
    pub implicit_wait: Duration,
    /// Pause after page transitions and each saved card.
    pub pause: Duration,
}

/// Delivers cards by filling AnkiWeb's add page in a real browser.
#[derive(Debug)]
pub struct AnkiWebDeliverer {
    options: AnkiWebOptions,
    card_list: CardList,
}

impl AnkiWebDeliverer {
    /// Create a deliverer with the given options.
    pub fn new(options: AnkiWebOptions) -> Self {
        Self {
            options,
            card_list: CardList::new(),
        }
    }

    /// The cards handed to the last delivery, with their current state.
    pub fn card_list(&self) -> Vec<Card> {
        self.card_list.cards()
    }

    async fn open(&self) -> Result<WebDriver> {
        let driver = WebDriver::start(&self.options.webdriver_url, &self.options.capabilities).await?;

        let setup = async {
            driver.implicit_wait(self.options.implicit_wait).await?;
            let (width, height) = self.options.window_size;
            driver.set_window_size(width, height).await?;
            driver.goto(&self.options.login_url).await
        };

        if let Err(e) = setup.await {
            if let Err(quit_err) = driver.quit().await {
                warn!("could not close browser session: {}", quit_err);
            }
            return Err(e);
        }
        Ok(driver)
    }

    async fn login(&self, driver: &WebDriver) -> Result<()> {
        info!("login page");
        let email = driver.find(EMAIL_INPUT).await?;
        driver.send_keys(&email, &self.options.email).await?;
        let password = driver.find(PASSWORD_INPUT).await?;
        driver.send_keys(&password, &self.options.password).await?;
        let submit = driver.find(SUBMIT_INPUT).await?;
        driver.click(&submit).await?;
        tokio::time::sleep(self.options.pause).await;
        Ok(())
    }

    async fn open_add_page(&self, driver: &WebDriver) -> Result<()> {
        info!("deck page");
        let links = driver.find_all(NAV_LINK).await?;
        let add = links.get(ADD_NAV_INDEX).ok_or_else(|| Error::WebDriver {
            status: "no such element".to_string(),
            message: format!("expected at least {} navigation links", ADD_NAV_INDEX + 1),
        })?;
        driver.click(add).await?;
        tokio::time::sleep(self.options.pause).await;

        info!("edit page");
        if let Some(deck) = &self.options.deck {
            let field = driver.find(DECK_INPUT).await?;
            driver.clear(&field).await?;
            driver.send_keys(&field, deck).await?;
        }
        Ok(())
    }

    async fn insert_card(&mut self, driver: &WebDriver, card: &Card) {
        let attempt = async {
            let front = driver.find_by_id(FRONT_FIELD_ID).await?;
            driver.send_keys(&front, &card.front).await?;
            let back = driver.find_by_id(BACK_FIELD_ID).await?;
            driver.send_keys(&back, &card.back).await?;
            let save = driver.find(SAVE_BUTTON).await?;
            driver.click(&save).await?;
            tokio::time::sleep(self.options.pause).await;
            Ok::<_, Error>(())
        };

        match attempt.await {
            Ok(()) => {
                info!(front = %card.front, "inserted card");
                self.card_list.mark_inserted(card);
            }
            Err(e) => warn!(front = %card.front, "could not insert card: {}", e),
        }
    }
}

#[async_trait]
impl CardDeliverer for AnkiWebDeliverer {
    async fn deliver(&mut self, cards: Vec<Card>) -> Result<Vec<Card>> {
        self.card_list = CardList::new();
        self.card_list.extend(cards.iter().cloned());

        let driver = self.open().await?;

        let prepared = async {
            self.login(&driver).await?;
            self.open_add_page(&driver).await
        }
        .await;

        if let Err(e) = &prepared {
            warn!("could not reach the add page: {}", e);
        } else {
            for card in &cards {
                self.insert_card(&driver, card).await;
            }
        }

        if let Err(e) = driver.quit().await {
            warn!("could not close browser session: {}", e);
        }

        prepared?;
        Ok(self.card_list.cards())
    }
}
