use crate::{Error, Result};

/// Where a publisher session sits in its lifecycle.
///
/// The ordering is load-bearing: states only ever advance, and command
/// handling compares against the minimum state a command is legal in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// Nothing exchanged yet; waiting for C0
    Uninitialized,

    /// S0 sent; waiting for C1
    VersionSent,

    /// S1 sent; S2 and C2 outstanding
    AckSent,

    /// Handshake complete, messages may flow
    HandshakeDone,

    /// The connect command has been answered
    ConnectResponseSent,

    /// The createStream command has been answered
    CreateStreamResponseSent,

    /// Receiving audio/video content
    PublishingContent,
}

impl SessionState {
    /// Advance to the next state. Moving backwards is a bug, not a peer
    /// error, hence the invalid-state error rather than a protocol one.
    pub fn advance_to(&mut self, next: SessionState) -> Result<()> {
        if next < *self {
            return Err(Error::invalid_state(format!(
                "session state cannot move backwards from {:?} to {:?}",
                self, next
            )));
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(SessionState::Uninitialized < SessionState::VersionSent);
        assert!(SessionState::VersionSent < SessionState::AckSent);
        assert!(SessionState::AckSent < SessionState::HandshakeDone);
        assert!(SessionState::HandshakeDone < SessionState::ConnectResponseSent);
        assert!(SessionState::ConnectResponseSent < SessionState::CreateStreamResponseSent);
        assert!(SessionState::CreateStreamResponseSent < SessionState::PublishingContent);
    }

    #[test]
    fn test_advance_is_monotone() {
        let mut state = SessionState::Uninitialized;
        state.advance_to(SessionState::VersionSent).unwrap();
        state.advance_to(SessionState::AckSent).unwrap();
        state.advance_to(SessionState::HandshakeDone).unwrap();
        assert_eq!(state, SessionState::HandshakeDone);

        // Re-entering the same state is fine
        state.advance_to(SessionState::HandshakeDone).unwrap();

        // Going backwards is not
        assert!(state.advance_to(SessionState::VersionSent).is_err());
        assert_eq!(state, SessionState::HandshakeDone);
    }
}
