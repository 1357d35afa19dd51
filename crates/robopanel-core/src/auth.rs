// ── Emergency access control ──
//
// Every emergency write passes through an `AccessPolicy` before it touches
// the store. The shipped `AdminAllowList` is a placeholder boundary: a
// real identity provider implements the same trait and slots in behind it.

use std::collections::HashSet;

use crate::error::CoreError;

const MIN_ADMIN_ID_LEN: usize = 4;

/// Proof of authorization. Only an [`AccessPolicy`] can mint one, which
/// keeps unauthorized ids out of [`crate::model::EmergencyCommand`] by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminId(String);

impl AdminId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decides who may operate the emergency channel.
pub trait AccessPolicy: Send + Sync + 'static {
    fn authorize(&self, id: &str) -> Result<AdminId, CoreError>;
}

/// Case-insensitive membership in a fixed allow-list, with a minimum id
/// length. Ids are matched lowercased but minted with the caller's casing.
#[derive(Debug, Clone)]
pub struct AdminAllowList {
    ids: HashSet<String>,
}

impl Default for AdminAllowList {
    fn default() -> Self {
        Self::new(["admin", "emergency", "root", "supervisor"])
    }
}

impl AdminAllowList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|id| id.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl AccessPolicy for AdminAllowList {
    fn authorize(&self, id: &str) -> Result<AdminId, CoreError> {
        let candidate = id.trim();
        if candidate.chars().count() >= MIN_ADMIN_ID_LEN
            && self.ids.contains(&candidate.to_lowercase())
        {
            Ok(AdminId(candidate.to_owned()))
        } else {
            Err(CoreError::PermissionDenied {
                detail: format!("admin id {candidate:?} is not authorized for emergency control"),
            })
        }
    }
}
