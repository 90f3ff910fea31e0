//! Backend availability probing and install guidance.

use crate::config::BrowserConfig;
use crate::driver::Backend;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Chromium-family executable names to search for on `PATH`.
/// All of these speak the Chrome DevTools Protocol.
const CHROMIUM_EXECUTABLES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "chromium",
    "chromium-browser",
    "microsoft-edge",
    "microsoft-edge-stable",
    "msedge",
    "brave-browser",
];

/// macOS app bundle paths for Chromium-based browsers.
#[cfg(target_os = "macos")]
const MACOS_APP_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
];

/// Windows installation paths for Chromium-based browsers.
#[cfg(target_os = "windows")]
const WINDOWS_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Locates a Chromium-family executable.
///
/// Checks, in order: the configured path, the `CHROME` environment variable,
/// platform install locations, then known names on `PATH`.
#[must_use]
pub fn find_chrome(custom_path: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(path) = custom_path {
        return path.exists().then(|| path.to_path_buf());
    }

    if let Ok(path) = std::env::var("CHROME") {
        let p = PathBuf::from(path);
        if p.exists() {
            return Some(p);
        }
    }

    #[cfg(target_os = "macos")]
    for path in MACOS_APP_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Some(p);
        }
    }

    #[cfg(target_os = "windows")]
    for path in WINDOWS_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Some(p);
        }
    }

    CHROMIUM_EXECUTABLES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Result of probing one backend.
#[derive(Debug, Clone)]
pub struct BackendStatus {
    /// Backend that was probed
    pub backend: Backend,
    /// Whether a session could plausibly be opened
    pub available: bool,
    /// Executable path or endpoint when available, install hint otherwise
    pub detail: String,
}

/// Probes every backend in preference order without launching a browser.
///
/// CDP is available when a Chromium executable exists; WebDriver is available
/// when something accepts TCP connections on the configured endpoint.
pub async fn probe_backends(config: &BrowserConfig) -> Vec<BackendStatus> {
    let mut statuses = Vec::with_capacity(Backend::PREFERENCE_ORDER.len());

    for backend in Backend::PREFERENCE_ORDER {
        let status = match backend {
            Backend::Cdp => match find_chrome(config.chrome_path.as_deref()) {
                Some(path) => BackendStatus {
                    backend,
                    available: true,
                    detail: path.display().to_string(),
                },
                None => BackendStatus {
                    backend,
                    available: false,
                    detail: chrome_install_hint(),
                },
            },
            Backend::WebDriver => {
                if webdriver_reachable(&config.webdriver_url, Duration::from_secs(2)).await {
                    BackendStatus {
                        backend,
                        available: true,
                        detail: config.webdriver_url.clone(),
                    }
                } else {
                    BackendStatus {
                        backend,
                        available: false,
                        detail: webdriver_hint(&config.webdriver_url),
                    }
                }
            }
        };
        statuses.push(status);
    }

    statuses
}

/// Returns true if a TCP connection to the WebDriver endpoint succeeds.
pub async fn webdriver_reachable(endpoint: &str, timeout: Duration) -> bool {
    let Ok(url) = Url::parse(endpoint) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let port = url.port_or_known_default().unwrap_or(4444);

    matches!(
        tokio::time::timeout(timeout, tokio::net::TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Platform-specific Chrome install instructions.
#[must_use]
pub fn chrome_install_hint() -> String {
    let instructions = if cfg!(target_os = "macos") {
        "brew install --cask google-chrome"
    } else if cfg!(target_os = "linux") {
        "sudo apt install chromium  (or: dnf install chromium / pacman -S chromium)"
    } else if cfg!(target_os = "windows") {
        "winget install Google.Chrome"
    } else {
        "download from https://www.google.com/chrome/"
    };

    format!("no Chromium-based browser found; install one ({instructions}) or set CHROME=/path/to/browser")
}

/// Instructions for starting a WebDriver server.
#[must_use]
pub fn webdriver_hint(endpoint: &str) -> String {
    format!(
        "nothing is listening on {endpoint}; start one with `geckodriver --port 4444` \
         or `chromedriver --port=4444`"
    )
}
