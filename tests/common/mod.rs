//! Scripted in-memory job site implementing `PageDriver`
//!
//! Pages are modelled as a small state machine; every action the bot takes
//! is recorded so tests can assert on it.

#![allow(dead_code)]

use async_trait::async_trait;
use easy_apply::error::{AppError, AppResult, BrowserError};
use easy_apply::infrastructure::{Locator, PageDriver, PageState};
use easy_apply::models::JobPosting;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use url::Url;

pub const LOGIN_URL: &str = "https://jobs.test/login";
pub const SEARCH_URL: &str = "https://jobs.test/jobs/search/";
pub const JOB_URL: &str = "https://jobs.test/jobs/view/";

// ========== script ==========

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text { prefilled: Option<String> },
    Radio(Vec<String>),
    Select(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn text(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Text { prefilled: None },
        }
    }

    pub fn prefilled(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Text {
                prefilled: Some(value.to_string()),
            },
        }
    }

    pub fn radio(label: &str, options: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Radio(options.iter().map(|o| o.to_string()).collect()),
        }
    }

    pub fn select(label: &str, options: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Select(options.iter().map(|o| o.to_string()).collect()),
        }
    }
}

/// One form section of the apply dialog
#[derive(Debug, Clone, Default)]
pub struct Step {
    pub fields: Vec<Field>,
    pub uploads: Vec<Locator>,
    /// Times the step control is rejected with an inline error
    pub rejects: usize,
    /// Last section before submit shows "Review" instead of "Next"
    pub review: bool,
}

impl Step {
    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedJob {
    pub posting: Option<JobPosting>,
    pub easy_apply: bool,
    pub steps: Vec<Step>,
    /// Controls vanish after leaving this step index
    pub stall_after: Option<usize>,
    /// Challenge page appears once the dialog opens
    pub two_factor: bool,
}

impl ScriptedJob {
    pub fn easy(steps: Vec<Step>) -> Self {
        Self {
            easy_apply: true,
            steps,
            ..Self::default()
        }
    }

    pub fn external() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScript {
    Accept,
    Reject,
    Challenge,
}

// ========== page state ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Blank,
    Login,
    Home,
    LoginChallenge,
    Search { start: usize },
    Posting { job_id: String },
    Dialog { job_id: String, step: usize },
    Stalled { job_id: String },
    Submitted { job_id: String },
}

/// Opaque element handles handed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Marker(Locator),
    Control(Locator),
    Input(Locator),
    Card(usize),
    CardTitle(usize),
    CardCompany(usize),
    Group(usize),
    Label(usize),
    Radio(usize, usize),
    Select(usize),
    OptionItem(usize, usize),
    TextBox(usize),
}

pub struct SiteState {
    pub screen: Screen,
    pub url: String,
    pub login: LoginScript,
    pub jobs: HashMap<String, ScriptedJob>,
    pub search_pages: HashMap<usize, Vec<JobPosting>>,

    pub rejects_left: usize,
    pub error_shown: bool,
    pub values: HashMap<(String, usize, usize), String>,

    pub navigations: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub radio_clicks: Vec<(String, String)>,
    pub selections: Vec<(String, String)>,
    pub uploads: Vec<(Locator, PathBuf)>,
    pub unfollowed: Vec<String>,
    pub submitted: Vec<String>,
    pub opened: Vec<String>,
}

impl SiteState {
    fn current_step(&self) -> Option<(&str, usize, &Step)> {
        match &self.screen {
            Screen::Dialog { job_id, step } => {
                let job = self.jobs.get(job_id)?;
                job.steps.get(*step).map(|s| (job_id.as_str(), *step, s))
            }
            _ => None,
        }
    }

    fn field(&self, index: usize) -> AppResult<(&str, usize, &Field)> {
        self.current_step()
            .and_then(|(id, step, s)| s.fields.get(index).map(|f| (id, step, f)))
            .ok_or_else(|| stale(format!("field {}", index)))
    }

    fn dialog_done(&self) -> bool {
        match &self.screen {
            Screen::Dialog { job_id, step } => self
                .jobs
                .get(job_id)
                .map(|job| *step >= job.steps.len())
                .unwrap_or(false),
            _ => false,
        }
    }

    fn two_factor(&self) -> bool {
        match &self.screen {
            Screen::LoginChallenge => true,
            Screen::Dialog { job_id, .. } => {
                self.jobs.get(job_id).map(|j| j.two_factor).unwrap_or(false)
            }
            _ => false,
        }
    }

    fn enter_step(&mut self, job_id: String, step: usize) {
        let rejects = self
            .jobs
            .get(&job_id)
            .and_then(|j| j.steps.get(step))
            .map(|s| s.rejects)
            .unwrap_or(0);
        self.rejects_left = rejects;
        self.error_shown = false;
        self.screen = Screen::Dialog { job_id, step };
    }

    fn advance(&mut self) {
        let Screen::Dialog { job_id, step } = self.screen.clone() else {
            return;
        };
        if self.rejects_left > 0 {
            self.rejects_left -= 1;
            self.error_shown = true;
            return;
        }
        let stall = self
            .jobs
            .get(&job_id)
            .and_then(|j| j.stall_after)
            .map(|s| s == step)
            .unwrap_or(false);
        if stall {
            self.error_shown = false;
            self.screen = Screen::Stalled { job_id };
        } else {
            self.enter_step(job_id, step + 1);
        }
    }

    fn present(&self, locator: Locator) -> Vec<Node> {
        use Locator::*;
        let one = |cond: bool, node: Node| if cond { vec![node] } else { Vec::new() };
        match locator {
            LoginUsername | LoginPassword => one(self.screen == Screen::Login, Node::Input(locator)),
            LoginSubmit => one(self.screen == Screen::Login, Node::Control(locator)),
            SignedInNav => one(self.screen == Screen::Home, Node::Marker(locator)),
            TwoFactorChallenge => one(self.two_factor(), Node::Marker(locator)),
            SearchResults => match &self.screen {
                Screen::Search { start } => {
                    one(self.search_pages.contains_key(start), Node::Marker(locator))
                }
                _ => Vec::new(),
            },
            JobCard => match &self.screen {
                Screen::Search { start } => self
                    .search_pages
                    .get(start)
                    .map(|cards| (0..cards.len()).map(Node::Card).collect())
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            EasyApplyButton => match &self.screen {
                Screen::Posting { job_id } => one(
                    self.jobs.get(job_id).map(|j| j.easy_apply).unwrap_or(false),
                    Node::Control(locator),
                ),
                _ => Vec::new(),
            },
            NextButton | ReviewButton => match self.current_step() {
                Some((_, _, step)) => one(step.review == (locator == ReviewButton), Node::Control(locator)),
                None => Vec::new(),
            },
            SubmitButton | FollowCompany => one(self.dialog_done(), Node::Control(locator)),
            ErrorFeedback => one(self.error_shown, Node::Marker(locator)),
            UploadResume | UploadCoverLetter => match self.current_step() {
                Some((_, _, step)) => one(step.uploads.contains(&locator), Node::Input(locator)),
                None => Vec::new(),
            },
            FieldGroup => match self.current_step() {
                Some((_, _, step)) => (0..step.fields.len()).map(Node::Group).collect(),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

fn stale(what: String) -> AppError {
    AppError::Browser(BrowserError::StaleElement(what))
}

// ========== driver ==========

pub struct FakeSite {
    state: Mutex<SiteState>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SiteState {
                screen: Screen::Blank,
                url: "about:blank".to_string(),
                login: LoginScript::Accept,
                jobs: HashMap::new(),
                search_pages: HashMap::new(),
                rejects_left: 0,
                error_shown: false,
                values: HashMap::new(),
                navigations: Vec::new(),
                typed: Vec::new(),
                radio_clicks: Vec::new(),
                selections: Vec::new(),
                uploads: Vec::new(),
                unfollowed: Vec::new(),
                submitted: Vec::new(),
                opened: Vec::new(),
            }),
        }
    }

    pub fn with_login(self, login: LoginScript) -> Self {
        self.state().login = login;
        self
    }

    pub fn with_job(self, job_id: &str, job: ScriptedJob) -> Self {
        self.state().jobs.insert(job_id.to_string(), job);
        self
    }

    /// Results shown for `start=<offset>`
    pub fn with_page(self, start: usize, postings: Vec<JobPosting>) -> Self {
        self.state().search_pages.insert(start, postings);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap()
    }
}

impl Default for FakeSite {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for FakeSite {
    type Element = Node;

    async fn navigate(&self, url: &str) -> AppResult<()> {
        let mut state = self.state();
        state.navigations.push(url.to_string());
        state.url = url.to_string();
        state.error_shown = false;

        if url.starts_with(LOGIN_URL) {
            state.screen = Screen::Login;
        } else if url.starts_with(SEARCH_URL) {
            let parsed = Url::parse(url).map_err(|e| AppError::Other(e.to_string()))?;
            let start = parsed
                .query_pairs()
                .find(|(k, _)| k == "start")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0);
            state.screen = Screen::Search { start };
        } else if let Some(rest) = url.strip_prefix(JOB_URL) {
            let job_id = rest.trim_end_matches('/').to_string();
            state.opened.push(job_id.clone());
            state.screen = Screen::Posting { job_id };
        } else {
            state.screen = Screen::Blank;
        }
        Ok(())
    }

    async fn find_all(&self, locator: Locator) -> AppResult<Vec<Node>> {
        Ok(self.state().present(locator))
    }

    async fn find_in(&self, parent: &Node, locator: Locator) -> AppResult<Vec<Node>> {
        let state = self.state();
        let nodes = match (parent, locator) {
            (Node::Card(i), Locator::JobCardTitle) => vec![Node::CardTitle(*i)],
            (Node::Card(i), Locator::JobCardCompany) => vec![Node::CardCompany(*i)],
            (Node::Group(i), Locator::FieldLabel) => vec![Node::Label(*i)],
            (Node::Group(i), Locator::RadioInput) => match &state.field(*i)?.2.kind {
                FieldKind::Radio(options) => (0..options.len()).map(|o| Node::Radio(*i, o)).collect(),
                _ => Vec::new(),
            },
            (Node::Group(i), Locator::MultiSelect) => match &state.field(*i)?.2.kind {
                FieldKind::Select(_) => vec![Node::Select(*i)],
                _ => Vec::new(),
            },
            (Node::Group(i), Locator::TextInput) => match &state.field(*i)?.2.kind {
                FieldKind::Text { .. } => vec![Node::TextBox(*i)],
                _ => Vec::new(),
            },
            (Node::Select(i), Locator::SelectOption) => match &state.field(*i)?.2.kind {
                FieldKind::Select(options) => {
                    (0..options.len()).map(|o| Node::OptionItem(*i, o)).collect()
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(nodes)
    }

    async fn click(&self, element: &Node) -> AppResult<()> {
        let mut state = self.state();
        match element {
            Node::Control(Locator::LoginSubmit) => {
                state.screen = match state.login {
                    LoginScript::Accept => Screen::Home,
                    LoginScript::Reject => Screen::Login,
                    LoginScript::Challenge => Screen::LoginChallenge,
                };
            }
            Node::Control(Locator::EasyApplyButton) => {
                let Screen::Posting { job_id } = state.screen.clone() else {
                    return Err(stale("easy apply button".into()));
                };
                state.enter_step(job_id, 0);
            }
            Node::Control(Locator::NextButton) | Node::Control(Locator::ReviewButton) => {
                if state.current_step().is_none() {
                    return Err(stale("step control".into()));
                }
                state.advance();
            }
            Node::Control(Locator::FollowCompany) => {
                if let Screen::Dialog { job_id, .. } = state.screen.clone() {
                    state.unfollowed.push(job_id);
                }
            }
            Node::Control(Locator::SubmitButton) => {
                let Screen::Dialog { job_id, .. } = state.screen.clone() else {
                    return Err(stale("submit button".into()));
                };
                state.submitted.push(job_id.clone());
                state.screen = Screen::Submitted { job_id };
            }
            Node::Radio(i, o) => {
                let (job_id, step, field) = state.field(*i)?;
                let FieldKind::Radio(options) = &field.kind else {
                    return Err(stale("radio".into()));
                };
                let key = (job_id.to_string(), step, *i);
                let label = field.label.clone();
                let value = options[*o].clone();
                state.values.insert(key, value.clone());
                state.radio_clicks.push((label, value));
            }
            other => return Err(stale(format!("{:?} is not clickable", other))),
        }
        Ok(())
    }

    async fn type_text(&self, element: &Node, text: &str) -> AppResult<()> {
        let mut state = self.state();
        match element {
            Node::Input(locator) => {
                state.typed.push((format!("{:?}", locator), text.to_string()));
            }
            Node::TextBox(i) => {
                let (job_id, step, field) = state.field(*i)?;
                let key = (job_id.to_string(), step, *i);
                let label = field.label.clone();
                state.values.insert(key, text.to_string());
                state.typed.push((label, text.to_string()));
            }
            other => return Err(stale(format!("cannot type into {:?}", other))),
        }
        Ok(())
    }

    async fn upload(&self, element: &Node, path: &Path) -> AppResult<()> {
        match element {
            Node::Input(locator @ (Locator::UploadResume | Locator::UploadCoverLetter)) => {
                self.state().uploads.push((*locator, path.to_path_buf()));
                Ok(())
            }
            other => Err(stale(format!("{:?} is not a file input", other))),
        }
    }

    async fn select(&self, element: &Node, value: &str) -> AppResult<()> {
        let mut state = self.state();
        let Node::Select(i) = element else {
            return Err(stale(format!("{:?} is not a select", element)));
        };
        let (job_id, step, field) = state.field(*i)?;
        let key = (job_id.to_string(), step, *i);
        let label = field.label.clone();
        state.values.insert(key, value.to_string());
        state.selections.push((label, value.to_string()));
        Ok(())
    }

    async fn text(&self, element: &Node) -> AppResult<String> {
        let state = self.state();
        let card = |i: usize| -> AppResult<JobPosting> {
            match &state.screen {
                Screen::Search { start } => state
                    .search_pages
                    .get(start)
                    .and_then(|cards| cards.get(i))
                    .cloned()
                    .ok_or_else(|| stale(format!("card {}", i))),
                _ => Err(stale(format!("card {}", i))),
            }
        };
        match element {
            Node::CardTitle(i) => Ok(card(*i)?.title),
            Node::CardCompany(i) => Ok(card(*i)?.company),
            // labels on the real site carry stray line breaks
            Node::Label(i) | Node::Group(i) => {
                Ok(format!("\n  {}\n  ", state.field(*i)?.2.label.replace(' ', "  ")))
            }
            Node::OptionItem(i, o) => match &state.field(*i)?.2.kind {
                FieldKind::Select(options) => Ok(options[*o].clone()),
                _ => Err(stale("option".into())),
            },
            _ => Ok(String::new()),
        }
    }

    async fn attribute(&self, element: &Node, name: &str) -> AppResult<Option<String>> {
        let state = self.state();
        match (element, name) {
            (Node::Card(i), "data-job-id") => match &state.screen {
                Screen::Search { start } => Ok(state
                    .search_pages
                    .get(start)
                    .and_then(|cards| cards.get(*i))
                    .map(|p| p.job_id.clone())),
                _ => Err(stale(format!("card {}", i))),
            },
            (Node::Radio(i, o), "value") => match &state.field(*i)?.2.kind {
                FieldKind::Radio(options) => Ok(options.get(*o).cloned()),
                _ => Ok(None),
            },
            (Node::OptionItem(i, o), "value") => match &state.field(*i)?.2.kind {
                FieldKind::Select(options) => Ok(options.get(*o).cloned()),
                _ => Ok(None),
            },
            (Node::TextBox(i), "value") => {
                let (job_id, step, field) = state.field(*i)?;
                let key = (job_id.to_string(), step, *i);
                if let Some(value) = state.values.get(&key) {
                    return Ok(Some(value.clone()));
                }
                match &field.kind {
                    FieldKind::Text { prefilled } => Ok(Some(prefilled.clone().unwrap_or_default())),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    async fn page_state(&self) -> AppResult<PageState> {
        let state = self.state();
        Ok(PageState {
            url: state.url.clone(),
            title: format!("{:?}", state.screen),
        })
    }
}

/// Answer source that returns a fixed reply and counts how often it was asked
pub struct CountingSource {
    pub reply: String,
    pub asked: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl CountingSource {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            asked: Default::default(),
        }
    }
}

#[async_trait]
impl easy_apply::services::AnswerSource for CountingSource {
    async fn answer(&self, _question: &str) -> AppResult<String> {
        self.asked
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}
