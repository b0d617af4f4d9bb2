use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::foundation::error::{StagecastError, StagecastResult};
use crate::scene::template::Template;

/// Auth/link context the host attaches to linked-template fetches.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkContext {
    pub device_id: Option<String>,
    pub auth_token: Option<String>,
    pub base_url: Option<String>,
}

/// Data holder the compositor reads the current template from.
pub trait TemplateStore: Send + Sync {
    /// Template for the active scene, if one is loaded.
    fn current(&self) -> Option<Arc<Template>>;

    fn link_context(&self) -> LinkContext;

    /// Make `template` the active one (linked navigation, host refresh).
    fn replace(&self, template: Template);
}

/// In-process store, optionally preloaded with linked templates by id.
#[derive(Default)]
pub struct InMemoryTemplateStore {
    current: Mutex<Option<Arc<Template>>>,
    linked: Mutex<BTreeMap<String, Template>>,
    link: LinkContext,
}

impl InMemoryTemplateStore {
    pub fn new(template: Template) -> Self {
        Self {
            current: Mutex::new(Some(Arc::new(template))),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_link_context(mut self, link: LinkContext) -> Self {
        self.link = link;
        self
    }

    /// Register a template reachable through a `template` action.
    pub fn insert_linked(&self, id: impl Into<String>, template: Template) {
        lock(&self.linked).insert(id.into(), template);
    }

    /// Take a registered linked template.
    pub fn linked(&self, id: &str) -> StagecastResult<Template> {
        lock(&self.linked)
            .get(id)
            .cloned()
            .ok_or_else(|| StagecastError::config(format!("unknown linked template '{id}'")))
    }

    pub fn clear(&self) {
        *lock(&self.current) = None;
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn current(&self) -> Option<Arc<Template>> {
        lock(&self.current).clone()
    }

    fn link_context(&self) -> LinkContext {
        self.link.clone()
    }

    fn replace(&self, template: Template) {
        *lock(&self.current) = Some(Arc::new(template));
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
