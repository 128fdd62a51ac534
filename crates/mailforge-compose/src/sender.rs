//! Sender identity resolution.
//!
//! The mail client decides which identity a message goes out under. We ask
//! it through the [`SenderSink`] seam, trying three strategies in a fixed
//! order and stopping at the first one the client accepts. Total failure is
//! reported, not raised: the message still opens under the client's default
//! identity.

/// One identity the mail client reports as available to the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailIdentity {
    /// The identity's email address.
    pub address: String,
    /// Client-native token for this identity, opaque to us; handed back
    /// verbatim when the identity is selected.
    pub handle: String,
}

/// Write-side of the mail client's sender assignment.
///
/// Each method attempts one assignment strategy and reports whether the
/// client accepted it. Implementations adapt a concrete mail API; tests use
/// scripted fakes.
pub trait SenderSink {
    /// Attempt "send on behalf of" with a raw address string.
    fn assign_on_behalf(&mut self, address: &str) -> bool;

    /// Attempt to select a client-reported identity by its native handle.
    fn assign_identity(&mut self, identity: &MailIdentity) -> bool;

    /// Attempt a generic "use this account string" assignment.
    fn assign_account(&mut self, address: &str) -> bool;
}

/// Which strategy, if any, assigned the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderOutcome {
    /// Strategy 1: raw "send on behalf of" string accepted.
    OnBehalf,
    /// Strategy 2: a case-insensitive identity match was selected.
    Identity(MailIdentity),
    /// Strategy 3: generic account-string assignment accepted.
    Account,
    /// Every strategy failed; the client's default identity applies.
    Failed,
}

impl SenderOutcome {
    /// True when any strategy assigned the sender.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Resolve the desired sender against the sink, first success wins.
///
/// The chain: (1) send-on-behalf with the raw string, (2) case-insensitive
/// address match in `identities` plus native-handle assignment, (3) generic
/// account-string assignment. Failure of the whole chain is logged as a
/// warning and returned as [`SenderOutcome::Failed`].
pub fn resolve_sender(
    sink: &mut dyn SenderSink,
    desired: &str,
    identities: &[MailIdentity],
) -> SenderOutcome {
    if sink.assign_on_behalf(desired) {
        return SenderOutcome::OnBehalf;
    }

    if let Some(identity) = identities
        .iter()
        .find(|i| i.address.eq_ignore_ascii_case(desired))
    {
        if sink.assign_identity(identity) {
            return SenderOutcome::Identity(identity.clone());
        }
    }

    if sink.assign_account(desired) {
        return SenderOutcome::Account;
    }

    tracing::warn!("Could not assign sender '{desired}', using the client default identity");
    SenderOutcome::Failed
}
