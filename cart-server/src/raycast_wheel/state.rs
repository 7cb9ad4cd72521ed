use serde::Serialize;

/// Per-wheel contact state. Decided by the probe alone each tick; a single
/// missed ray flips a wheel to airborne.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactState {
    #[default]
    Airborne,
    Grounded,
}

impl ContactState {
    pub fn from_probe(hit: bool) -> Self {
        if hit { ContactState::Grounded } else { ContactState::Airborne }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, ContactState::Grounded)
    }
}

/// Returns the next state and whether it changed.
pub fn update_contact_state(prev: ContactState, hit: bool) -> (ContactState, bool) {
    let next = ContactState::from_probe(hit);
    (next, next != prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hysteresis() {
        let (s, changed) = update_contact_state(ContactState::Grounded, false);
        assert_eq!(s, ContactState::Airborne);
        assert!(changed);

        let (s, changed) = update_contact_state(s, true);
        assert_eq!(s, ContactState::Grounded);
        assert!(changed);

        let (s, changed) = update_contact_state(s, true);
        assert!(s.is_grounded());
        assert!(!changed);
    }
}
