use std::sync::Arc;

use crate::foundation::error::{StagecastError, StagecastResult};
use crate::scene::store::{InMemoryTemplateStore, LinkContext};
use crate::scene::template::Template;

/// Host capabilities an activated element can call into.
pub trait ActionHost {
    /// Launch an installed application by package name.
    fn launch_app(&mut self, package: &str) -> StagecastResult<()>;

    /// Fetch a linked template, authenticated with the store's link context.
    fn fetch_template(&mut self, template_id: &str, link: &LinkContext) -> StagecastResult<Template>;

    /// URL actions are only logged.
    fn open_url(&mut self, url: &str) -> StagecastResult<()> {
        tracing::info!(url, "url action (not opened)");
        Ok(())
    }
}

/// What executing the focused element did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    NothingFocused,
    /// The focused element has no action bound.
    NoAction,
    Launched(String),
    /// The linked template became current and was rendered.
    TemplateRendered(String),
    UrlLogged(String),
}

/// Action host that records calls and serves linked templates from an in-memory store.
#[derive(Default)]
pub struct RecordingActionHost {
    linked: Option<Arc<InMemoryTemplateStore>>,
    pub launched: Vec<String>,
    pub fetched: Vec<String>,
    pub urls: Vec<String>,
}

impl RecordingActionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_linked_store(mut self, store: Arc<InMemoryTemplateStore>) -> Self {
        self.linked = Some(store);
        self
    }
}

impl ActionHost for RecordingActionHost {
    fn launch_app(&mut self, package: &str) -> StagecastResult<()> {
        self.launched.push(package.to_owned());
        Ok(())
    }

    fn fetch_template(&mut self, template_id: &str, _link: &LinkContext) -> StagecastResult<Template> {
        self.fetched.push(template_id.to_owned());
        self.linked
            .as_ref()
            .ok_or_else(|| StagecastError::platform("no linked template source"))?
            .linked(template_id)
    }

    fn open_url(&mut self, url: &str) -> StagecastResult<()> {
        tracing::info!(url, "url action (not opened)");
        self.urls.push(url.to_owned());
        Ok(())
    }
}
