use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Pending,
    Loaded,
    Failed,
}

/// All-or-nothing readiness gate for assets loaded by the front end.
///
/// A failed asset still settles: the game can run without a sprite, it just
/// must not start while anything is in flight.
#[derive(Debug, Clone, Default)]
pub struct Preload {
    assets: BTreeMap<String, AssetState>,
}

impl Preload {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            assets: keys
                .into_iter()
                .map(|k| (k.into(), AssetState::Pending))
                .collect(),
        }
    }

    pub fn loaded(&mut self, key: &str) {
        self.settle(key, AssetState::Loaded);
    }

    pub fn failed(&mut self, key: &str) {
        warn!(key, "asset failed to load");
        self.settle(key, AssetState::Failed);
    }

    fn settle(&mut self, key: &str, state: AssetState) {
        let Some(slot) = self.assets.get_mut(key) else {
            warn!(key, "ignoring unknown asset");
            return;
        };
        *slot = state;
        debug!(key, ?state, pending = self.pending().len(), "asset settled");
    }

    pub fn state(&self, key: &str) -> Option<AssetState> {
        self.assets.get(key).copied()
    }

    pub fn pending(&self) -> BTreeSet<&str> {
        self.assets
            .iter()
            .filter(|(_, s)| **s == AssetState::Pending)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.assets.values().all(|s| *s != AssetState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_ready() {
        assert!(Preload::new(Vec::<String>::new()).is_ready());
        assert!(Preload::default().is_ready());
    }

    #[test]
    fn ready_only_when_everything_settles() {
        let mut preload = Preload::new(["eddie", "murphy"]);
        assert!(!preload.is_ready());
        preload.loaded("eddie");
        assert!(!preload.is_ready());
        assert_eq!(preload.pending().into_iter().collect::<Vec<_>>(), vec!["murphy"]);
        preload.failed("murphy");
        assert!(preload.is_ready());
        assert_eq!(preload.state("murphy"), Some(AssetState::Failed));
    }

    #[test]
    fn unknown_keys_do_not_count() {
        let mut preload = Preload::new(["eddie"]);
        preload.loaded("somebody-else");
        assert!(!preload.is_ready());
        assert_eq!(preload.state("somebody-else"), None);
    }
}
