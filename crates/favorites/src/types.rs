//! Identity and favorites types shared by the ledger and the store adapters.

use catalog::ListingId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Identifier of an authenticated user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The current user. Opaque beyond its id and profile labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: IdentityId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: IdentityId::new(id),
            display_name: None,
            email: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Display name, falling back to email, then id
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

/// Notifications from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    SignedIn(Identity),
    SessionRestored(Identity),
    SignedOut,
}

/// Result of a toggle: exactly one of the two always happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Set of favorite listing ids with O(1) membership.
///
/// Insertion order is kept alongside the hash index so favorites can be listed
/// in the order the user added them. Serialized as a plain JSON array.
/// Equality is set equality; the order is display metadata only.
#[derive(Debug, Clone, Default)]
pub struct FavoritesSet {
    order: Vec<ListingId>,
    members: HashSet<ListingId>,
}

impl PartialEq for FavoritesSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for FavoritesSet {}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.members.contains(id)
    }

    /// Returns false if the id was already present
    pub fn insert(&mut self, id: ListingId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Returns false if the id was not present
    pub fn remove(&mut self, id: &ListingId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }

    pub fn toggle(&mut self, id: ListingId) -> ToggleOutcome {
        if self.remove(&id) {
            ToggleOutcome::Removed
        } else {
            self.insert(id);
            ToggleOutcome::Added
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = &ListingId> {
        self.order.iter()
    }
}

impl FromIterator<ListingId> for FavoritesSet {
    fn from_iter<I: IntoIterator<Item = ListingId>>(iter: I) -> Self {
        let mut set = FavoritesSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl Serialize for FavoritesSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.order)
    }
}

impl<'de> Deserialize<'de> for FavoritesSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<ListingId>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ListingId {
        ListingId::from(raw)
    }

    #[test]
    fn test_insert_is_deduplicated() {
        let mut set = FavoritesSet::new();
        assert!(set.insert(id("a")));
        assert!(!set.insert(id("a")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let original: FavoritesSet = [id("a"), id("b")].into_iter().collect();
        let mut set = original.clone();

        assert_eq!(set.toggle(id("c")), ToggleOutcome::Added);
        assert!(set.contains(&id("c")));
        assert_eq!(set.toggle(id("c")), ToggleOutcome::Removed);
        assert_eq!(set, original);
    }

    #[test]
    fn test_toggle_present_id_twice_restores_set() {
        let original: FavoritesSet = [id("a"), id("b")].into_iter().collect();
        let mut set = original.clone();

        assert_eq!(set.toggle(id("a")), ToggleOutcome::Removed);
        assert_eq!(set.toggle(id("a")), ToggleOutcome::Added);

        assert_eq!(set, original);
        let ids: Vec<&str> = set.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let forward: FavoritesSet = [id("a"), id("b")].into_iter().collect();
        let backward: FavoritesSet = [id("b"), id("a")].into_iter().collect();
        let smaller: FavoritesSet = [id("a")].into_iter().collect();

        assert_eq!(forward, backward);
        assert_ne!(forward, smaller);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut set: FavoritesSet = [id("z"), id("a"), id("m")].into_iter().collect();
        set.remove(&id("a"));
        set.insert(id("b"));

        let ids: Vec<&str> = set.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["z", "m", "b"]);
    }

    #[test]
    fn test_serializes_as_array_and_drops_duplicates() {
        let set: FavoritesSet = serde_json::from_str(r#"["1", 2, "1"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["1","2"]"#);
    }

    #[test]
    fn test_identity_label_fallbacks() {
        assert_eq!(Identity::new("u1").label(), "u1");
        assert_eq!(Identity::new("u1").with_email("a@b.c").label(), "a@b.c");
        assert_eq!(
            Identity::new("u1")
                .with_email("a@b.c")
                .with_display_name("Ada")
                .label(),
            "Ada"
        );
    }
}
