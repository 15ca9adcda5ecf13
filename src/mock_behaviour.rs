//! This module provides ways to tweak the mocked backend, so that it can return errors on some tests

use crate::error::Error;

/// This stores some behaviour tweaks, that describe how a mocked backend will behave during a given test
///
/// So that a kind of call fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every call will be allowed
    pub is_suspended: bool,

    /// GraphQL queries
    pub query_behaviour: (u32, u32),
    /// GraphQL mutations
    pub mutation_behaviour: (u32, u32),
    /// REST calls
    pub rest_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            query_behaviour: (0, n_fails),
            mutation_behaviour: (0, n_fails),
            rest_behaviour: (0, n_fails),
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

    pub fn can_query(&mut self) -> Result<(), Error> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.query_behaviour, "query")
    }
    pub fn can_mutate(&mut self) -> Result<(), Error> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.mutation_behaviour, "mutation")
    }
    pub fn can_call_rest(&mut self) -> Result<(), Error> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.rest_behaviour, "REST call")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
///
/// Failures look like what a real server returns when it crashes: an HTTP 500.
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), Error> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 -= 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else if remaining_failures > 0 {
        value.1 -= 1;
        log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
        Err(Error::Transport { status: 500, status_text: "Internal Server Error".to_string() })
    } else {
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    }
}
