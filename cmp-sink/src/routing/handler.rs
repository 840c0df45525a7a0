/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Message handler capability and the non-owning reference route tables keep.

use crate::message::CmpMessage;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

/// Consumer of routed messages.
///
/// Handlers are owned by topology objects (or by the caller); route tables only
/// keep a [`Weak`] reference, so a dropped owner is never called again.
pub trait MessageHandler: Send + Sync {
    /// Processes one message published under the handler's key.
    fn process_one(&self, message: &Arc<CmpMessage>);

    /// Processes an ordered batch of messages decoded from one frame.
    fn process_many(&self, messages: &[Arc<CmpMessage>]);
}

/// Non-owning handler reference compared by allocation identity.
#[derive(Clone)]
pub(crate) struct HandlerRef {
    handler: Weak<dyn MessageHandler>,
}

impl HandlerRef {
    pub(crate) fn new(handler: &Arc<dyn MessageHandler>) -> Self {
        Self {
            handler: Arc::downgrade(handler),
        }
    }

    /// Returns a strong reference while the owner is still alive.
    pub(crate) fn upgrade(&self) -> Option<Arc<dyn MessageHandler>> {
        self.handler.upgrade()
    }

    pub(crate) fn refers_to(&self, handler: &Arc<dyn MessageHandler>) -> bool {
        self.address() == Arc::as_ptr(handler) as *const ()
    }

    fn address(&self) -> *const () {
        self.handler.as_ptr() as *const ()
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for HandlerRef {}

impl Debug for HandlerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRef")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerRef, MessageHandler};
    use crate::message::CmpMessage;
    use std::sync::Arc;

    struct NoopHandler;

    impl MessageHandler for NoopHandler {
        fn process_one(&self, _message: &Arc<CmpMessage>) {}
        fn process_many(&self, _messages: &[Arc<CmpMessage>]) {}
    }

    #[test]
    fn handler_ref_uses_allocation_identity() {
        let first: Arc<dyn MessageHandler> = Arc::new(NoopHandler);
        let second: Arc<dyn MessageHandler> = Arc::new(NoopHandler);

        let first_ref = HandlerRef::new(&first);

        assert!(first_ref.refers_to(&first));
        assert!(!first_ref.refers_to(&second));
        assert_eq!(first_ref, HandlerRef::new(&first.clone()));
        assert_ne!(first_ref, HandlerRef::new(&second));
    }

    #[test]
    fn handler_ref_does_not_keep_owner_alive() {
        let owner: Arc<dyn MessageHandler> = Arc::new(NoopHandler);
        let handler_ref = HandlerRef::new(&owner);
        assert!(handler_ref.upgrade().is_some());

        drop(owner);

        assert!(handler_ref.upgrade().is_none());
    }
}
