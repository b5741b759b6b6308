//! This module provides ways to tweak a [`MemoryRemote`](crate::memory::MemoryRemote), so that it can return errors on some tests
#![cfg(feature = "failure_injection")]

/// This stores some behaviour tweaks, that describe how a mocked provider will behave during a given test
///
/// So that a function fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    // From the AuthSource trait
    pub create_account_behaviour: (u32, u32),
    pub sign_in_behaviour: (u32, u32),

    // From the DocumentSource trait
    pub read_document_behaviour: (u32, u32),
    pub write_document_behaviour: (u32, u32),
    pub subscribe_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All operations will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            create_account_behaviour: (0, n_fails),
            sign_in_behaviour: (0, n_fails),
            read_document_behaviour: (0, n_fails),
            write_document_behaviour: (0, n_fails),
            subscribe_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_create_account(&mut self) -> Result<(), String> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_account_behaviour, "create_account")
    }
    pub fn can_sign_in(&mut self) -> Result<(), String> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.sign_in_behaviour, "sign_in")
    }
    pub fn can_read_document(&mut self) -> Result<(), String> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.read_document_behaviour, "read_document")
    }
    pub fn can_write_document(&mut self) -> Result<(), String> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.write_document_behaviour, "write_document")
    }
    pub fn can_subscribe(&mut self) -> Result<(), String> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.subscribe_behaviour, "subscribe")
    }
}

/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), String> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value))
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_behaviour() {
        let mut ok = MockBehaviour::new();
        assert!(ok.can_read_document().is_ok());
        assert!(ok.can_read_document().is_ok());
        assert!(ok.can_read_document().is_ok());
        assert!(ok.can_read_document().is_ok());

        let mut now = MockBehaviour::fail_now(2);
        assert!(now.can_read_document().is_err());
        assert!(now.can_write_document().is_err());
        assert!(now.can_write_document().is_err());
        assert!(now.can_read_document().is_err());
        assert!(now.can_read_document().is_ok());
        assert!(now.can_read_document().is_ok());
        assert!(now.can_write_document().is_ok());

        let mut custom = MockBehaviour{
            sign_in_behaviour: (0,1),
            write_document_behaviour: (1,3),
            ..MockBehaviour::default()
        };
        assert!(custom.can_sign_in().is_err());
        assert!(custom.can_sign_in().is_ok());
        assert!(custom.can_sign_in().is_ok());
        assert!(custom.can_write_document().is_ok());
        assert!(custom.can_write_document().is_err());
        assert!(custom.can_write_document().is_err());
        assert!(custom.can_write_document().is_err());
        assert!(custom.can_write_document().is_ok());
        assert!(custom.can_write_document().is_ok());
    }
}
