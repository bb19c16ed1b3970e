//! Ordered contact list with per-contact chat panes.
//!
//! The roster keeps two sequences: contacts in identity order and chat panes
//! in display order. Every mutating operation updates both inside one `&mut
//! self` call, so callers never observe them out of alignment.
//!
//! Slot 0 is reserved for the local account (self-status). It is never
//! removed, never moved, and never reset by [`Roster::reset_all_but_first`].

use crate::{ContactId, Presence};

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Stable identifier assigned by the signaling backend.
    pub id: ContactId,
    /// Human-readable label. Empty when only presence has been seen so far.
    pub display_name: String,
    /// Current availability.
    pub presence: Presence,
    /// Position in the displayed ordering.
    pub order_index: usize,
}

/// Who wrote a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    /// Sent by the local user.
    Local,
    /// Received from the contact.
    Remote,
}

/// One line of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Author side.
    pub origin: LineOrigin,
    /// Message text.
    pub text: String,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
}

/// Display slot for one contact's conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPane {
    contact_id: ContactId,
    lines: Vec<ChatLine>,
}

impl ChatPane {
    fn new(contact_id: ContactId) -> Self {
        Self { contact_id, lines: Vec::new() }
    }

    /// Contact this pane belongs to.
    pub fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    /// Transcript in arrival order.
    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    /// Append a line to the transcript.
    pub fn push(&mut self, line: ChatLine) {
        self.lines.push(line);
    }
}

/// Result of [`Roster::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new contact was appended at `index`.
    Inserted {
        /// Position of the new contact.
        index: usize,
    },
    /// An existing contact was updated.
    Updated {
        /// Whether presence actually changed.
        presence_changed: bool,
    },
}

/// Ordered mapping from contact id to presence and chat pane.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    contacts: Vec<Contact>,
    panes: Vec<ChatPane>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unseen contact at the end, or update presence in place.
    ///
    /// The display name of an existing contact is only filled in when it was
    /// empty, so presence pushes never rename a contact.
    pub fn upsert(&mut self, id: ContactId, display_name: &str, presence: Presence) -> Upsert {
        if let Some(contact) = self.contacts.iter_mut().find(|c| c.id == id) {
            if contact.display_name.is_empty() && !display_name.is_empty() {
                contact.display_name = display_name.to_string();
            }
            let presence_changed = contact.presence != presence;
            contact.presence = presence;
            return Upsert::Updated { presence_changed };
        }

        let index = self.contacts.len();
        self.contacts.push(Contact {
            id,
            display_name: display_name.to_string(),
            presence,
            order_index: index,
        });
        self.panes.push(ChatPane::new(id));
        Upsert::Inserted { index }
    }

    /// Delete a contact and its pane.
    ///
    /// Unknown ids and the self slot are ignored.
    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        let index = self.position(id)?;
        if index == 0 {
            tracing::debug!(contact_id = id, "refusing to remove self slot");
            return None;
        }
        self.panes.remove(index);
        let removed = self.contacts.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Look up a contact.
    pub fn find(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Look up a contact by display name.
    pub fn find_by_name(&self, display_name: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.display_name == display_name)
    }

    /// Position of a contact in the displayed ordering.
    pub fn position(&self, id: ContactId) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == id)
    }

    /// Move a contact to `new_index`, shifting the others.
    ///
    /// The target is clamped into the movable range (never slot 0). Unknown
    /// ids, the self slot, and no-op moves return `None`; otherwise the
    /// `(from, to)` pair actually applied.
    pub fn reorder(&mut self, id: ContactId, new_index: usize) -> Option<(usize, usize)> {
        let from = self.position(id)?;
        if from == 0 {
            return None;
        }
        let to = new_index.clamp(1, self.contacts.len() - 1);
        if from == to {
            return None;
        }

        let contact = self.contacts.remove(from);
        let pane = self.panes.remove(from);
        self.contacts.insert(to, contact);
        self.panes.insert(to, pane);
        self.renumber();
        Some((from, to))
    }

    /// Set every contact except the self slot to [`Presence::Offline`].
    ///
    /// Order is preserved. Returns the ids whose presence changed.
    pub fn reset_all_but_first(&mut self) -> Vec<ContactId> {
        self.contacts
            .iter_mut()
            .skip(1)
            .filter(|c| c.presence != Presence::Offline)
            .map(|c| {
                c.presence = Presence::Offline;
                c.id
            })
            .collect()
    }

    /// Update the self slot's presence. No-op on an empty roster.
    pub fn set_self_presence(&mut self, presence: Presence) -> Option<ContactId> {
        let me = self.contacts.first_mut()?;
        me.presence = presence;
        Some(me.id)
    }

    /// Id of the self slot.
    pub fn self_id(&self) -> Option<ContactId> {
        self.contacts.first().map(|c| c.id)
    }

    /// Contacts in display order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Chat panes in display order.
    pub fn panes(&self) -> &[ChatPane] {
        &self.panes
    }

    /// Pane for a contact.
    pub fn pane(&self, id: ContactId) -> Option<&ChatPane> {
        self.position(id).and_then(|i| self.panes.get(i))
    }

    /// Mutable pane for a contact.
    pub fn pane_mut(&mut self, id: ContactId) -> Option<&mut ChatPane> {
        let index = self.position(id)?;
        self.panes.get_mut(index)
    }

    /// Whether contacts and panes are index-aligned.
    pub fn is_aligned(&self) -> bool {
        self.contacts.len() == self.panes.len()
            && self
                .contacts
                .iter()
                .zip(&self.panes)
                .enumerate()
                .all(|(i, (c, p))| c.id == p.contact_id && c.order_index == i)
    }

    /// Number of contacts, self slot included.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the roster has no entries.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    fn renumber(&mut self) {
        for (i, contact) in self.contacts.iter_mut().enumerate() {
            contact.order_index = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.upsert(1, "me", Presence::Available);
        roster.upsert(2, "alice", Presence::Available);
        roster.upsert(3, "bob", Presence::Away);
        roster.upsert(4, "carol", Presence::Offline);
        roster
    }

    fn ids(roster: &Roster) -> Vec<ContactId> {
        roster.contacts().iter().map(|c| c.id).collect()
    }

    #[test]
    fn upsert_then_find_returns_values() {
        let mut roster = Roster::new();
        assert_eq!(roster.upsert(7, "dave", Presence::Away), Upsert::Inserted { index: 0 });

        let found = roster.find(7).cloned();
        assert_eq!(
            found,
            Some(Contact {
                id: 7,
                display_name: "dave".into(),
                presence: Presence::Away,
                order_index: 0
            })
        );
    }

    #[test]
    fn upsert_updates_presence_in_place() {
        let mut roster = roster();
        let result = roster.upsert(3, "robert", Presence::DoNotDisturb);

        assert_eq!(result, Upsert::Updated { presence_changed: true });
        assert_eq!(ids(&roster), vec![1, 2, 3, 4]);
        let bob = roster.find(3).cloned();
        assert_eq!(bob.as_ref().map(|c| c.display_name.as_str()), Some("bob"));
        assert_eq!(bob.map(|c| c.presence), Some(Presence::DoNotDisturb));
    }

    #[test]
    fn upsert_fills_missing_name() {
        let mut roster = roster();
        roster.upsert(9, "", Presence::Available);
        roster.upsert(9, "erin", Presence::Available);

        assert_eq!(roster.find(9).map(|c| c.display_name.as_str()), Some("erin"));
    }

    #[test]
    fn remove_drops_contact_and_pane() {
        let mut roster = roster();
        let removed = roster.remove(3);

        assert_eq!(removed.map(|c| c.id), Some(3));
        assert_eq!(ids(&roster), vec![1, 2, 4]);
        assert!(roster.pane(3).is_none());
        assert!(roster.is_aligned());

        assert!(roster.remove(3).is_none());
    }

    #[test]
    fn self_slot_is_not_removable() {
        let mut roster = roster();
        assert!(roster.remove(1).is_none());
        assert_eq!(roster.self_id(), Some(1));
    }

    #[test]
    fn reorder_moves_contact_and_pane_together() {
        let mut roster = roster();
        assert_eq!(roster.reorder(4, 1), Some((3, 1)));

        assert_eq!(ids(&roster), vec![1, 4, 2, 3]);
        let pane_ids: Vec<_> = roster.panes().iter().map(ChatPane::contact_id).collect();
        assert_eq!(pane_ids, vec![1, 4, 2, 3]);
        assert!(roster.is_aligned());
    }

    #[test]
    fn reorder_clamps_target() {
        let mut roster = roster();
        assert_eq!(roster.reorder(2, 99), Some((1, 3)));
        assert_eq!(roster.reorder(2, 0), Some((3, 1)));
        assert_eq!(ids(&roster), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reorder_ignores_unknown_and_self() {
        let mut roster = roster();
        assert_eq!(roster.reorder(42, 1), None);
        assert_eq!(roster.reorder(1, 2), None);
        assert_eq!(roster.reorder(2, 1), None);
        assert_eq!(ids(&roster), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reset_keeps_self_and_order() {
        let mut roster = roster();
        let changed = roster.reset_all_but_first();

        assert_eq!(changed, vec![2, 3]);
        assert_eq!(ids(&roster), vec![1, 2, 3, 4]);
        assert_eq!(roster.find(1).map(|c| c.presence), Some(Presence::Available));
        assert!(roster.contacts().iter().skip(1).all(|c| c.presence == Presence::Offline));
    }

    #[test]
    fn pane_lookup_is_typed_by_contact() {
        let mut roster = roster();
        if let Some(pane) = roster.pane_mut(2) {
            pane.push(ChatLine { origin: LineOrigin::Remote, text: "hi".into(), timestamp: 1 });
        }

        assert_eq!(roster.pane(2).map(|p| p.lines().len()), Some(1));
        assert_eq!(roster.pane(3).map(|p| p.lines().len()), Some(0));
    }
}
