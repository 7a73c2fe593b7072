//! Application state management for mayl.
//!
//! This module contains the core `App` struct that manages all
//! application state: the sign-in flow, the current folder and message
//! list, the detail pane, and background task coordination.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::auth::{callback, FileStore, KeyringStore, SessionManager, TokenStore};
use crate::config::Config;
use crate::models::{MailItem, MessageDetail};
use crate::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is plenty for the handful of independent fetches this client runs.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// How long to wait for the user to finish the browser consent screen.
const CALLBACK_TIMEOUT_SECS: u64 = 180;

/// Maximum length for the search query input
const MAX_SEARCH_LENGTH: usize = 64;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Sidebar folders, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Inbox,
    Starred,
    Snoozed,
    Sent,
    Drafts,
    Trash,
}

impl Folder {
    pub const ALL: [Folder; 6] = [
        Folder::Inbox,
        Folder::Starred,
        Folder::Snoozed,
        Folder::Sent,
        Folder::Drafts,
        Folder::Trash,
    ];

    /// Get the display title for this folder.
    pub fn title(&self) -> &'static str {
        match self {
            Folder::Inbox => "Inbox",
            Folder::Starred => "Starred",
            Folder::Snoozed => "Snoozed",
            Folder::Sent => "Sent",
            Folder::Drafts => "Drafts",
            Folder::Trash => "Trash",
        }
    }

    /// Gmail search query scoping the message list to this folder
    pub fn query(&self) -> &'static str {
        match self {
            Folder::Inbox => "in:inbox",
            Folder::Starred => "is:starred",
            Folder::Snoozed => "in:snoozed",
            Folder::Sent => "in:sent",
            Folder::Drafts => "in:drafts",
            Folder::Trash => "in:trash",
        }
    }

    /// Get the next folder (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Folder::Inbox => Folder::Starred,
            Folder::Starred => Folder::Snoozed,
            Folder::Snoozed => Folder::Sent,
            Folder::Sent => Folder::Drafts,
            Folder::Drafts => Folder::Trash,
            Folder::Trash => Folder::Inbox,
        }
    }

    /// Get the previous folder (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Folder::Inbox => Folder::Trash,
            Folder::Starred => Folder::Inbox,
            Folder::Snoozed => Folder::Starred,
            Folder::Sent => Folder::Snoozed,
            Folder::Drafts => Folder::Sent,
            Folder::Trash => Folder::Drafts,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Sign-in screen
    Login,
    /// Browser handed off to the identity provider, waiting for the
    /// redirect to come back
    AwaitingAuth,
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Current UI focus area (message list or opened message)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background tasks, sent through an MPSC channel back
/// to the main loop.
enum TaskResult {
    /// The browser was opened against the identity provider
    AuthorizationStarted,
    /// The redirect came back; the URL may or may not carry a token
    AuthorizationRedirect(Url),
    /// The sign-in flow failed before a redirect arrived
    AuthorizationFailed(String),
    /// Message list fetch finished (items plus the server's total count)
    Messages(Result<(Vec<MailItem>, Option<i64>), ApiError>),
    /// Single message detail fetch finished
    MessageBody(Result<MessageDetail, ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub focus: Focus,
    pub folder: Folder,
    pub sidebar_collapsed: bool,
    pub search_query: String,

    // Message list
    pub mail: Vec<MailItem>,
    pub total_count: Option<i64>,
    pub selection: usize,
    pub loading: bool,
    pub list_error: Option<String>,

    // Opened message
    pub detail: Option<MessageDetail>,
    pub detail_scroll: u16,

    // Status
    pub login_error: Option<String>,
    pub status_message: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api_base_url = %config.api_base_url, "Config loaded");

        // The OS keychain is the default home for the session token; a
        // file store can be selected for headless machines.
        let store: Box<dyn TokenStore> = match std::env::var("MAYL_TOKEN_FILE") {
            Ok(path) => {
                debug!(path = %path, "Using file token store");
                Box::new(FileStore::new(path.into()))
            }
            Err(_) => Box::new(KeyringStore::new()),
        };
        let session = Arc::new(SessionManager::new(store));
        let api = ApiClient::new(&config.api_base_url, Arc::clone(&session))?;

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let state = if session.is_authenticated() {
            AppState::Normal
        } else {
            AppState::Login
        };
        debug!(?state, "Initial state resolved");

        Ok(Self {
            config,
            session,
            api,

            state,
            focus: Focus::List,
            folder: Folder::Inbox,
            sidebar_collapsed: false,
            search_query: String::new(),

            mail: Vec::new(),
            total_count: None,
            selection: 0,
            loading: false,
            list_error: None,

            detail: None,
            detail_scroll: 0,

            login_error: None,
            status_message: None,

            task_rx,
            task_tx,
        })
    }

    /// Check if the client holds a stored session token
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // =========================================================================
    // Sign-in flow
    // =========================================================================

    /// Kick off the OAuth redirect flow: ask the backend for an
    /// authorization URL, stand up the loopback listener, then hand the
    /// user to the browser.
    ///
    /// Session state is only written once the redirect comes back with a
    /// token; any failure along the way lands back on the sign-in screen
    /// with the session untouched.
    pub fn start_login(&mut self) {
        self.login_error = None;
        self.status_message = Some("Contacting sign-in server...".to_string());

        let api = self.api.clone();
        let port = self.config.callback_port;
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let auth_url = match api.get_oauth_url().await {
                Ok(url) => url,
                Err(e) => {
                    error!(error = %e, "Failed to fetch authorization URL");
                    Self::send_result(
                        &tx,
                        TaskResult::AuthorizationFailed(format!(
                            "Could not reach the sign-in server: {}",
                            e
                        )),
                    )
                    .await;
                    return;
                }
            };

            // Bind before opening the browser so the redirect cannot
            // race the listener.
            let server = match callback::bind(port) {
                Ok(server) => server,
                Err(e) => {
                    error!(error = %e, "Failed to bind redirect listener");
                    Self::send_result(&tx, TaskResult::AuthorizationFailed(e.to_string())).await;
                    return;
                }
            };

            let (url_tx, url_rx) = oneshot::channel();
            std::thread::spawn(move || {
                if let Err(e) = callback::wait_for_redirect(
                    server,
                    url_tx,
                    Duration::from_secs(CALLBACK_TIMEOUT_SECS),
                ) {
                    warn!(error = %e, "Redirect listener error");
                }
            });

            if let Err(e) = webbrowser::open(&auth_url) {
                error!(error = %e, "Failed to open browser");
                Self::send_result(
                    &tx,
                    TaskResult::AuthorizationFailed(format!("Could not open a browser: {}", e)),
                )
                .await;
                return;
            }

            info!("Browser handed off to the identity provider");
            Self::send_result(&tx, TaskResult::AuthorizationStarted).await;

            // The listener enforces its own deadline and drops the sender
            // when it gives up; the grace period here only covers the gap.
            match tokio::time::timeout(Duration::from_secs(CALLBACK_TIMEOUT_SECS + 5), url_rx).await
            {
                Ok(Ok(url)) => {
                    Self::send_result(&tx, TaskResult::AuthorizationRedirect(url)).await;
                }
                _ => {
                    Self::send_result(
                        &tx,
                        TaskResult::AuthorizationFailed(
                            "Timed out waiting for the browser sign-in".to_string(),
                        ),
                    )
                    .await;
                }
            }
        });
    }

    // =========================================================================
    // Background Data Fetches
    // =========================================================================

    /// Fetch the message list for the current folder in a background task
    pub fn refresh_messages(&mut self) {
        self.loading = true;
        self.list_error = None;
        self.status_message = Some("Loading messages...".to_string());

        let api = self.api.clone();
        let query = self.folder.query().to_string();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = api.fetch_messages(&query).await.map(|response| {
                let items: Vec<MailItem> =
                    response.messages.iter().map(MailItem::from_api).collect();
                (items, response.total_count)
            });
            Self::send_result(&tx, TaskResult::Messages(result)).await;
        });
    }

    /// Fetch the full body of the selected message and open the detail pane
    pub fn open_selected_message(&mut self) {
        let id = match self.visible_mail().get(self.selection) {
            Some(item) => item.id.clone(),
            None => return,
        };

        self.focus = Focus::Detail;
        self.detail = None;
        self.detail_scroll = 0;
        self.status_message = Some("Loading message...".to_string());

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = api.fetch_message(&id).await;
            Self::send_result(&tx, TaskResult::MessageBody(result)).await;
        });
    }

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }
    }

    /// Process a single result from a background task
    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::AuthorizationStarted => {
                self.state = AppState::AwaitingAuth;
                self.status_message = Some("Waiting for the browser sign-in...".to_string());
            }
            TaskResult::AuthorizationFailed(msg) => {
                self.state = AppState::Login;
                self.status_message = None;
                self.login_error = Some(msg);
            }
            TaskResult::AuthorizationRedirect(url) => self.complete_login(&url),
            TaskResult::Messages(result) => {
                self.loading = false;
                match result {
                    Ok((items, total_count)) => {
                        debug!(count = items.len(), "Messages fetched");
                        self.mail = items;
                        self.total_count = total_count;
                        self.selection = self
                            .selection
                            .min(self.visible_mail().len().saturating_sub(1));
                        self.list_error = None;
                        self.status_message = None;
                    }
                    Err(e) => self.handle_api_error(e),
                }
            }
            TaskResult::MessageBody(result) => match result {
                Ok(detail) => {
                    debug!(id = %detail.id, "Message detail fetched");
                    self.detail = Some(detail);
                    self.status_message = None;
                }
                Err(e) => {
                    self.focus = Focus::List;
                    self.handle_api_error(e);
                }
            },
        }
    }

    /// Finish the sign-in from the captured return URL
    fn complete_login(&mut self, url: &Url) {
        self.status_message = None;
        match self.session.complete_login_from_return_url(url) {
            Ok(true) => {
                info!("Login successful");
                self.state = AppState::Normal;
                self.login_error = None;
                self.refresh_messages();
            }
            Ok(false) => {
                warn!("Redirect carried no session token");
                self.state = AppState::Login;
                self.login_error =
                    Some("Sign-in did not complete (no token in redirect)".to_string());
            }
            Err(e) => {
                error!(error = %e, "Failed to persist session token");
                self.state = AppState::Login;
                self.login_error = Some(format!("Could not store the session: {}", e));
            }
        }
    }

    /// Route a failed gateway call to the right place in the UI.
    ///
    /// An auth failure always lands back on the sign-in screen - by the
    /// time the error is observed the gateway has already dropped the
    /// stored token. Anything else stays on the mail view with a retry
    /// hint.
    fn handle_api_error(&mut self, error: ApiError) {
        self.status_message = None;
        if error.is_auth_failure() {
            warn!(error = %error, "Session is gone, returning to sign-in");
            self.state = AppState::Login;
            self.focus = Focus::List;
            self.detail = None;
            self.login_error = Some("Session expired. Please sign in again.".to_string());
        } else {
            error!(error = %error, "Request failed");
            self.list_error = Some(error.to_string());
        }
    }

    // =========================================================================
    // List navigation and filtering
    // =========================================================================

    /// The message list with the current search filter applied
    pub fn visible_mail(&self) -> Vec<&MailItem> {
        if self.search_query.is_empty() {
            self.mail.iter().collect()
        } else {
            self.mail
                .iter()
                .filter(|m| {
                    contains_ignore_case(&m.from, &self.search_query)
                        || contains_ignore_case(&m.subject, &self.search_query)
                        || contains_ignore_case(&m.preview, &self.search_query)
                })
                .collect()
        }
    }

    /// Unread messages in the current list (shown as the folder badge)
    pub fn unread_count(&self) -> usize {
        self.mail.iter().filter(|m| !m.read).count()
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_mail().len();
        if len == 0 {
            self.selection = 0;
            return;
        }
        let current = self.selection as isize;
        self.selection = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn select_folder(&mut self, folder: Folder) {
        if self.folder == folder {
            return;
        }
        self.folder = folder;
        self.selection = 0;
        self.focus = Focus::List;
        self.detail = None;
        self.mail.clear();
        self.total_count = None;
        self.refresh_messages();
    }

    pub fn next_folder(&mut self) {
        self.select_folder(self.folder.next());
    }

    pub fn prev_folder(&mut self) {
        self.select_folder(self.folder.prev());
    }

    /// Close the detail pane and return to the list
    pub fn close_detail(&mut self) {
        self.focus = Focus::List;
        self.detail = None;
        self.detail_scroll = 0;
    }

    pub fn push_search_char(&mut self, c: char) {
        if self.search_query.len() < MAX_SEARCH_LENGTH {
            self.search_query.push(c);
            self.selection = 0;
        }
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.selection = 0;
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.selection = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_cycle_wraps_both_ways() {
        let mut folder = Folder::Inbox;
        for _ in 0..Folder::ALL.len() {
            folder = folder.next();
        }
        assert_eq!(folder, Folder::Inbox);

        assert_eq!(Folder::Inbox.prev(), Folder::Trash);
        assert_eq!(Folder::Trash.next(), Folder::Inbox);
    }

    #[test]
    fn test_folder_queries_use_gmail_search_syntax() {
        assert_eq!(Folder::Inbox.query(), "in:inbox");
        assert_eq!(Folder::Starred.query(), "is:starred");
        assert_eq!(Folder::Sent.query(), "in:sent");
    }
}
