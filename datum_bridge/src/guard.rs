// Copyright 2026 the Datum Bridge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Foreign-fault guarded call regions.
//!
//! Engines report errors by non-local exit rather than by return value. On the Rust side such an
//! exit is an unwind carrying an [`EngineFault`] payload (see [`raise`]). [`catch_foreign`]
//! stops the unwind at the boundary and hands back a [`ForeignFault`] value instead.

use alloc::boxed::Box;

/// A fault raised by the engine, as the unwind payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineFault {
    message: Box<str>,
}

impl EngineFault {
    /// Creates a fault with `message`.
    pub fn new(message: impl Into<Box<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The engine's error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An engine fault intercepted at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("foreign fault: {message}")]
pub struct ForeignFault {
    message: Box<str>,
}

impl ForeignFault {
    /// Creates an intercepted fault with `message`.
    pub fn new(message: impl Into<Box<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The intercepted fault's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EngineFault> for ForeignFault {
    fn from(fault: EngineFault) -> Self {
        Self {
            message: fault.message,
        }
    }
}

/// Raises an engine fault.
///
/// With `std`, this unwinds with an [`EngineFault`] payload and does not run the panic hook.
/// Without `std`, it panics.
pub fn raise(message: impl Into<Box<str>>) -> ! {
    let fault = EngineFault::new(message);
    #[cfg(feature = "std")]
    {
        std::panic::resume_unwind(Box::new(fault))
    }
    #[cfg(not(feature = "std"))]
    {
        panic!("engine fault: {}", fault.message())
    }
}

/// Runs `f`, converting an unwind out of it into a [`ForeignFault`].
///
/// Unwind payloads other than [`EngineFault`] (plain panics from engine glue code) are
/// intercepted too; their message is kept when it is a string.
#[cfg(feature = "std")]
pub fn catch_foreign<R>(f: impl FnOnce() -> R) -> Result<R, ForeignFault> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(fault_from_payload)
}

#[cfg(feature = "std")]
fn fault_from_payload(payload: Box<dyn core::any::Any + Send>) -> ForeignFault {
    let payload = match payload.downcast::<EngineFault>() {
        Ok(fault) => return ForeignFault::from(*fault),
        Err(other) => other,
    };
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return ForeignFault::new(*msg);
    }
    if let Some(msg) = payload.downcast_ref::<alloc::string::String>() {
        return ForeignFault::new(msg.as_str());
    }
    ForeignFault::new("unknown foreign fault")
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn passes_through_normal_returns() {
        assert_eq!(catch_foreign(|| 41 + 1), Ok(42));
    }

    #[test]
    fn intercepts_raised_engine_faults() {
        let got = catch_foreign(|| -> u32 { raise("cache lookup failed for type 99") });
        assert_eq!(
            got,
            Err(ForeignFault::new("cache lookup failed for type 99"))
        );
    }

    #[test]
    fn intercepts_string_and_opaque_payloads() {
        let got = catch_foreign::<u32>(|| std::panic::resume_unwind(Box::new("boom")));
        assert_eq!(got, Err(ForeignFault::new("boom")));

        let got = catch_foreign::<u32>(|| std::panic::resume_unwind(Box::new(7_u8)));
        assert_eq!(got, Err(ForeignFault::new("unknown foreign fault")));
    }
}
