//! Client session: identity, view, the report being drafted and the
//! persisted points/history. Every mutation of persisted state is saved
//! before the call returns.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use civicflow_core::Report;
use tracing::info;

use crate::error::{ClientError, Result};
use crate::gamification::{Level, POINTS_PER_REPORT};
use crate::history::HistoryEntry;
use crate::language::Language;
use crate::session::User;
use crate::store::{ClientState, StateStore};
use crate::strategy::{AnalysisRelay, ReportContext, ReportStrategy, DEFAULT_TEMPLATE_DELAY};
use crate::view::View;

pub struct CivicApp {
    store: StateStore,
    state: ClientState,
    relay: Arc<dyn AnalysisRelay>,
    language: Language,
    template_delay: Duration,
    view: View,
    address: String,
    pending: Option<ReportStrategy>,
    result: Option<Report>,
}

impl CivicApp {
    /// Loads (and migrates) persisted state.
    pub async fn open(
        store: StateStore,
        relay: Arc<dyn AnalysisRelay>,
        language: Language,
    ) -> Result<Self> {
        let state = store.load().await?;
        Ok(Self {
            store,
            state,
            relay,
            language,
            template_delay: DEFAULT_TEMPLATE_DELAY,
            view: View::Home,
            address: String::new(),
            pending: None,
            result: None,
        })
    }

    pub fn with_template_delay(mut self, delay: Duration) -> Self {
        self.template_delay = delay;
        self
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn points(&self) -> u32 {
        self.state.points
    }

    pub fn level(&self) -> Level {
        Level::for_points(self.state.points)
    }

    /// Newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn result(&self) -> Option<&Report> {
        self.result.as_ref()
    }

    pub async fn sign_in(&mut self, user: User) -> Result<&User> {
        info!("Signed in as {}", user.email);
        self.state.user = Some(user);
        self.store.save(&self.state).await?;
        self.state.user.as_ref().ok_or(ClientError::NotSignedIn)
    }

    pub async fn login_guest(&mut self, name: &str) -> Result<&User> {
        let user = User::guest(name)?;
        self.sign_in(user).await
    }

    /// Clears the identity and returns to `Home`. Points and history stay.
    pub async fn logout(&mut self) -> Result<()> {
        self.state.user = None;
        self.store.save(&self.state).await?;
        self.reset();
        Ok(())
    }

    /// Opens the form for `strategy`.
    pub fn begin(&mut self, strategy: ReportStrategy) -> Result<()> {
        if self.state.user.is_none() {
            return Err(ClientError::NotSignedIn);
        }
        self.view = self.view.transition(strategy.view())?;
        self.pending = Some(strategy);
        self.result = None;
        Ok(())
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Produces the report for the open form, then awards points and records history.
    /// On failure the form stays open and nothing is persisted.
    pub async fn submit(&mut self) -> Result<&Report> {
        let Some(strategy) = self.pending.as_ref() else {
            return Err(ClientError::InvalidTransition {
                from: self.view.name(),
                to: View::Result.name(),
            });
        };
        let next = self.view.transition(View::Result)?;

        let ctx = ReportContext {
            address: &self.address,
            language: self.language,
            signer: self.state.user.as_ref().map(|u| u.display_name.as_str()),
            template_delay: self.template_delay,
        };
        let report = strategy.generate(self.relay.as_ref(), &ctx).await?;

        self.record(&report).await?;
        self.view = next;
        self.pending = None;
        Ok(&*self.result.insert(report))
    }

    async fn record(&mut self, report: &Report) -> Result<()> {
        let entry = HistoryEntry::from_report(report, &self.address, Local::now());
        self.state.history.insert(0, entry);
        self.state.points += POINTS_PER_REPORT;
        self.store.save(&self.state).await?;

        info!(
            "Report recorded: +{} points (total {}, {})",
            POINTS_PER_REPORT,
            self.state.points,
            self.level()
        );
        Ok(())
    }

    /// Back to `Home` from anywhere, clearing the form and result.
    pub fn reset(&mut self) {
        self.view = View::Home;
        self.address.clear();
        self.pending = None;
        self.result = None;
    }
}
