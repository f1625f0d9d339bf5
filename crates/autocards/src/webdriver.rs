//! Just enough of the W3C WebDriver protocol to script a login-and-fill UI.
//!
//! Talks to a running driver server (geckodriver, chromedriver) over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use autocards::webdriver::{Browser, Capabilities, WebDriver};
//!
//! # async fn example() -> autocards::Result<()> {
//! let caps = Capabilities::new(Browser::Firefox, true);
//! let driver = WebDriver::start("http://localhost:4444", &caps).await?;
//! driver.goto("https://ankiweb.net/account/login").await?;
//! let email = driver.find(r#"input[id="email"]"#).await?;
//! driver.send_keys(&email, "me@example.com").await?;
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};

/// The key W3C drivers use for element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Browsers the delivery can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    /// Mozilla Firefox through geckodriver.
    Firefox,
    /// Google Chrome through chromedriver.
    Chrome,
}

impl Browser {
    /// The W3C `browserName`.
    pub fn name(&self) -> &'static str {
        match self {
            Browser::Firefox => "firefox",
            Browser::Chrome => "chrome",
        }
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "firefox" => Ok(Browser::Firefox),
            "chrome" => Ok(Browser::Chrome),
            other => Err(Error::Config(format!(
                "unsupported browser '{}'. Use 'firefox' or 'chrome'",
                other
            ))),
        }
    }
}

/// Session capabilities sent when starting a browser.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Which browser to start.
    pub browser: Browser,
    /// Run without a visible window.
    pub headless: bool,
}

impl Capabilities {
    /// Capabilities for `browser`.
    pub fn new(browser: Browser, headless: bool) -> Self {
        Self { browser, headless }
    }

    /// The `alwaysMatch` capability object.
    pub fn to_json(&self) -> Value {
        let mut caps = json!({ "browserName": self.browser.name() });
        if self.headless {
            let (key, arg) = match self.browser {
                Browser::Firefox => ("moz:firefoxOptions", "-headless"),
                Browser::Chrome => ("goog:chromeOptions", "--headless"),
            };
            caps[key] = json!({ "args": [arg] });
        }
        caps
    }
}

/// A reference to an element in the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: String,
}

impl Element {
    /// The driver's id for this element.
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    value: Value,
}

/// An open WebDriver session.
#[derive(Debug)]
pub struct WebDriver {
    http_client: reqwest::Client,
    session_url: String,
}

impl WebDriver {
    /// Start a new browser session on the driver at `url`.
    pub async fn start(url: &str, capabilities: &Capabilities) -> Result<Self> {
        let http_client = reqwest::Client::new();
        let base = url.trim_end_matches('/');
        let body = json!({ "capabilities": { "alwaysMatch": capabilities.to_json() } });

        let value = send(http_client.post(format!("{}/session", base)).json(&body)).await?;
        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| Error::WebDriver {
                status: "session not created".to_string(),
                message: format!("no session id in {}", value),
            })?;
        debug!(session_id, browser = capabilities.browser.name(), "webdriver session started");

        Ok(Self {
            session_url: format!("{}/session/{}", base, session_id),
            http_client,
        })
    }

    /// How long element lookups wait for elements to appear.
    pub async fn implicit_wait(&self, wait: Duration) -> Result<()> {
        self.post("timeouts", json!({ "implicit": wait.as_millis() as u64 }))
            .await
            .map(drop)
    }

    /// Resize the browser window.
    pub async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        self.post("window/rect", json!({ "width": width, "height": height }))
            .await
            .map(drop)
    }

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.post("url", json!({ "url": url })).await.map(drop)
    }

    /// Find the first element matching a CSS selector.
    pub async fn find(&self, css: &str) -> Result<Element> {
        let value = self
            .post("element", json!({ "using": "css selector", "value": css }))
            .await?;
        element_from(&value)
    }

    /// Find every element matching a CSS selector.
    pub async fn find_all(&self, css: &str) -> Result<Vec<Element>> {
        let value = self
            .post("elements", json!({ "using": "css selector", "value": css }))
            .await?;
        match value {
            Value::Array(items) => items.iter().map(element_from).collect(),
            other => Err(unexpected(&other)),
        }
    }

    /// Find an element by its `id` attribute.
    pub async fn find_by_id(&self, id: &str) -> Result<Element> {
        self.find(&format!("[id=\"{}\"]", id)).await
    }

    /// Type text into an element.
    pub async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        self.post(
            &format!("element/{}/value", element.id),
            json!({ "text": text }),
        )
        .await
        .map(drop)
    }

    /// Click an element.
    pub async fn click(&self, element: &Element) -> Result<()> {
        self.post(&format!("element/{}/click", element.id), json!({}))
            .await
            .map(drop)
    }

    /// Clear an input element.
    pub async fn clear(&self, element: &Element) -> Result<()> {
        self.post(&format!("element/{}/clear", element.id), json!({}))
            .await
            .map(drop)
    }

    /// End the session and close the browser.
    pub async fn quit(self) -> Result<()> {
        send(self.http_client.delete(&self.session_url))
            .await
            .map(drop)
    }

    async fn post(&self, command: &str, body: Value) -> Result<Value> {
        let url = format!("{}/{}", self.session_url, command);
        send(self.http_client.post(url).json(&body)).await
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await?;
    let status = response.status();
    let reply: Reply = response.json().await?;

    if status.is_success() {
        return Ok(reply.value);
    }

    let code = reply.value["error"]
        .as_str()
        .unwrap_or("unknown error")
        .to_string();
    let message = reply.value["message"].as_str().unwrap_or_default().to_string();
    Err(Error::WebDriver {
        status: code,
        message,
    })
}

fn element_from(value: &Value) -> Result<Element> {
    value[ELEMENT_KEY]
        .as_str()
        .map(|id| Element { id: id.to_string() })
        .ok_or_else(|| unexpected(value))
}

fn unexpected(value: &Value) -> Error {
    Error::WebDriver {
        status: "unexpected response".to_string(),
        message: value.to_string(),
    }
}
