use dashmap::DashMap;

/// In-memory registry of onboarding conversations.
///
/// A member's session has two layers: the guild binding (which guild the
/// conversation belongs to, kept until the flow finishes) and the active
/// flag (whether the agent currently holds live contexts for the member).
/// A member can stay bound but inactive; their next DM re-seeds the agent
/// from the persisted status.
#[derive(Default)]
pub struct SessionRegistry {
    guilds: DashMap<u64, u64>,
    active: DashMap<u64, ()>,
    awaiting_input: DashMap<u64, ()>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a member to a guild and mark the session active.
    pub fn open(&self, member_id: u64, guild_id: u64) {
        self.guilds.insert(member_id, guild_id);
        self.active.insert(member_id, ());
    }

    /// The agent's contexts expired; keep the guild binding so the flow can
    /// be re-seeded later.
    pub fn deactivate(&self, member_id: u64) {
        self.active.remove(&member_id);
    }

    /// The flow is over; forget everything about the member.
    pub fn close(&self, member_id: u64) {
        self.guilds.remove(&member_id);
        self.active.remove(&member_id);
        self.awaiting_input.remove(&member_id);
    }

    pub fn is_active(&self, member_id: u64) -> bool {
        self.active.contains_key(&member_id)
    }

    pub fn guild_of(&self, member_id: u64) -> Option<u64> {
        self.guilds.get(&member_id).map(|g| *g)
    }

    pub fn mark_awaiting(&self, member_id: u64) {
        self.awaiting_input.insert(member_id, ());
    }

    /// Consume the awaiting-input marker. Returns whether it was set.
    pub fn take_awaiting(&self, member_id: u64) -> bool {
        self.awaiting_input.remove(&member_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close() {
        let registry = SessionRegistry::new();
        assert!(!registry.is_active(7));

        registry.open(7, 1);
        assert!(registry.is_active(7));
        assert_eq!(registry.guild_of(7), Some(1));

        registry.close(7);
        assert!(!registry.is_active(7));
        assert_eq!(registry.guild_of(7), None);
    }

    #[test]
    fn test_deactivate_keeps_guild_binding() {
        let registry = SessionRegistry::new();
        registry.open(7, 1);
        registry.deactivate(7);

        assert!(!registry.is_active(7));
        assert_eq!(registry.guild_of(7), Some(1));
    }

    #[test]
    fn test_awaiting_marker_is_consumed() {
        let registry = SessionRegistry::new();
        registry.open(7, 1);

        assert!(!registry.take_awaiting(7));
        registry.mark_awaiting(7);
        assert!(registry.take_awaiting(7));
        assert!(!registry.take_awaiting(7));
    }
}
