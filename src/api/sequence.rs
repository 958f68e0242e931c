/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic request counter. A response is applied only if it answers the
/// most recently issued request, so a slow earlier response arriving after a
/// newer one is discarded instead of overwriting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequence {
    issued: u64,
    applied: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Returns true (and records the ticket as applied) if its response may be used.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 == self.issued && ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_is_accepted_once() {
        let mut seq = RequestSequence::default();
        let ticket = seq.issue();
        assert!(seq.accept(ticket));
        assert!(!seq.accept(ticket));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut seq = RequestSequence::default();
        let first = seq.issue();
        let second = seq.issue();

        // second answers first, first arrives late
        assert!(seq.accept(second));
        assert!(!seq.accept(first));
    }

    #[test]
    fn older_response_is_discarded_while_newer_is_pending() {
        let mut seq = RequestSequence::default();
        let first = seq.issue();
        let second = seq.issue();

        assert!(!seq.accept(first));
        assert!(seq.accept(second));
    }
}
