//! Chromium executable detection and install guidance.

use std::path::PathBuf;

/// Chromium-based executable names to search for on PATH. All speak CDP.
const CHROMIUM_EXECUTABLES: &[&str] = &[
    "chrome",
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "msedge",
    "microsoft-edge",
    "brave",
    "brave-browser",
];

#[cfg(target_os = "macos")]
const MACOS_APP_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
];

#[cfg(target_os = "windows")]
const WINDOWS_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Find a Chromium-based browser. Checks (in order): the explicit path from
/// the CLI, the `CHROME` environment variable, platform install locations,
/// then known executable names on PATH.
pub fn detect_browser(custom_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = custom_path {
        let p = PathBuf::from(path);
        if p.exists() {
            return Some(p);
        }
    }

    if let Ok(path) = std::env::var("CHROME") {
        let p = PathBuf::from(&path);
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

    find_in_path()
}

fn find_in_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in CHROMIUM_EXECUTABLES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Platform-specific install hint for launch failure messages.
pub fn install_instructions() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "Install Google Chrome from https://www.google.com/chrome/ or run: brew install --cask google-chrome"
    }
    #[cfg(target_os = "windows")]
    {
        "Install Google Chrome from https://www.google.com/chrome/"
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        "Install Chromium (e.g. apt install chromium-browser) or set $CHROME to an executable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_path_must_exist() {
        assert!(detect_browser(Some("/nonexistent/definitely-not-chrome"))
            .map(|p| p != PathBuf::from("/nonexistent/definitely-not-chrome"))
            .unwrap_or(true));
    }

    #[test]
    fn install_instructions_not_empty() {
        assert!(!install_instructions().is_empty());
    }
}
