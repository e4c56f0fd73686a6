//! SMI request/response types and the transport seam.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SmbiosError};

/// Registers sent to firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmiRequest {
    pub class: u16,
    pub select: u16,
    pub arg1: u32,
    pub arg2: u32,
}

/// Registers returned by firmware
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmiResponse {
    /// 0 on success, negative firmware error otherwise
    pub status: i32,
    pub reg2: u32,
    pub reg3: u32,
}

impl SmiRequest {
    pub fn new(class: u16, select: u16, arg1: u32, arg2: u32) -> Self {
        SmiRequest {
            class,
            select,
            arg1,
            arg2,
        }
    }
}

impl SmiResponse {
    /// Turn a non-zero status into [`SmbiosError::Transport`]
    pub fn check(self) -> Result<Self> {
        if self.status == 0 {
            Ok(self)
        } else {
            Err(SmbiosError::Transport { status: self.status })
        }
    }
}

/// Delivers a request to firmware and blocks until it answers.
///
/// Implementations own the privileged mechanism (kernel driver, WMI device,
/// I/O port). A returned `Ok` only means the call was delivered; the caller
/// inspects `status`.
pub trait SmiTransport {
    fn call(&mut self, request: SmiRequest) -> Result<SmiResponse>;
}

impl<T: SmiTransport + ?Sized> SmiTransport for &mut T {
    fn call(&mut self, request: SmiRequest) -> Result<SmiResponse> {
        (**self).call(request)
    }
}

impl<T: SmiTransport + ?Sized> SmiTransport for Box<T> {
    fn call(&mut self, request: SmiRequest) -> Result<SmiResponse> {
        (**self).call(request)
    }
}

/// Issue `request` and fail unless firmware reports success
pub fn checked_call<T: SmiTransport + ?Sized>(transport: &mut T, request: SmiRequest) -> Result<SmiResponse> {
    debug!(
        "SMI call class={} select={} arg1={:#010x} arg2={:#010x}",
        request.class, request.select, request.arg1, request.arg2
    );
    let response = transport.call(request)?;
    debug!(
        "SMI result status={} reg2={:#010x} reg3={:#010x}",
        response.status, response.reg2, response.reg3
    );
    response.check().map_err(|e| {
        warn!("SMI class={} select={} failed: {}", request.class, request.select, e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(SmiResponse);

    impl SmiTransport for Fixed {
        fn call(&mut self, _request: SmiRequest) -> Result<SmiResponse> {
            Ok(self.0)
        }
    }

    #[test]
    fn zero_status_passes() {
        let mut t = Fixed(SmiResponse {
            status: 0,
            reg2: 3,
            reg3: 0,
        });
        let resp = checked_call(&mut t, SmiRequest::new(4, 12, 0, 0)).unwrap();
        assert_eq!(resp.reg2, 3);
    }

    #[test]
    fn negative_status_is_preserved() {
        let mut t = Fixed(SmiResponse {
            status: -2,
            ..Default::default()
        });
        match checked_call(&mut t, SmiRequest::new(4, 12, 0, 0)) {
            Err(SmbiosError::Transport { status }) => assert_eq!(status, -2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
