use thiserror::Error;

// === TabError ===

/// Errors related to tab collection operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// A tab with the given ID already exists.
    #[error("Tab already exists: {0}")]
    AlreadyExists(String),
    /// The provided tab index is out of bounds.
    #[error("Invalid tab index: {0}")]
    InvalidIndex(usize),
}

// === WindowError ===

/// Errors related to window lifecycle operations.
#[derive(Debug, Error)]
pub enum WindowError {
    /// Window with the given ID was not found.
    #[error("Window not found: {0}")]
    NotFound(String),
    /// A window cannot be opened without at least one tab.
    #[error("A window needs at least one tab")]
    Empty,
    /// A tab operation inside the window failed.
    #[error(transparent)]
    Tab(#[from] TabError),
}

// === NavigationError ===

/// Errors raised by side operations on the navigation controller.
///
/// Load failures are never reported through this type; they are classified into
/// error pages instead.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Find-in-page was requested while an error page is being substituted.
    #[error("Find is unavailable while an error page is pending")]
    ErrorPagePending,
    /// Find-in-page was requested with an empty term.
    #[error("Find term is empty")]
    EmptyFindTerm,
    /// The tab is closed or has no rendering surface attached.
    #[error("Tab has no surface: {0}")]
    NoSurface(String),
}

// === ScriptError ===

/// Errors returned by the rendering surface's script evaluation.
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    /// The script threw or the value could not be produced.
    #[error("Script evaluation failed: {0}")]
    Evaluation(String),
    /// The surface went away before the script completed.
    #[error("Rendering surface is gone")]
    SurfaceGone,
}

// === ProbeError ===

/// Errors raised while fetching a server trust chain.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// The connection to the host failed before a trust chain was received.
    #[error("Trust probe network error: {0}")]
    Network(String),
    /// The URL has no host to probe.
    #[error("URL has no host: {0}")]
    NoHost(String),
}

// === FaviconError ===

/// Errors raised while downloading a favicon.
#[derive(Debug, Error)]
pub enum FaviconError {
    /// A network error occurred during the download.
    #[error("Favicon network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("Favicon request returned status {0}")]
    Status(u16),
    /// No downloader is available in this build.
    #[error("Favicon download is unavailable")]
    Unavailable,
}

// === HistoryError ===

/// Errors related to visit history persistence.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Database operation failed.
    #[error("History database error: {0}")]
    DatabaseError(String),
}

// === BookmarkError ===

/// Errors related to bookmark persistence.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// The target folder was not found.
    #[error("Bookmark folder not found: {0}")]
    FolderNotFound(String),
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === LocaleError ===

/// Errors related to localization engine operations.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// The requested locale is not supported.
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
    /// The locale file was not found.
    #[error("Locale file not found: {0}")]
    FileNotFound(String),
    /// The locale file could not be parsed.
    #[error("Locale file is malformed: {0}")]
    Malformed(String),
}

// === ContentBlockingError ===

/// Errors reported by the content rule store.
#[derive(Debug, Error)]
pub enum ContentBlockingError {
    /// The rule list could not be compiled.
    #[error("Failed to compile content rules '{identifier}': {message}")]
    Compile { identifier: String, message: String },
    /// Removing the installed rule list failed.
    #[error("Failed to remove content rules '{0}'")]
    Remove(String),
}

// === AppError ===

/// Top-level error for application setup and owner-side operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Bookmark(#[from] BookmarkError),
    #[error(transparent)]
    ContentBlocking(#[from] ContentBlockingError),
}
