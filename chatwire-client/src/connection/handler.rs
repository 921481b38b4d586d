//! Dispatch hook for inbound frames

use chatwire_protocol::Frame;

/// Trait for handling incoming frames
///
/// Called from the receive loop, in socket order, before waiters on the
/// response signal are woken. Implementations should return quickly.
pub trait MessageHandler: Send {
    /// Handle one decoded frame
    fn handle(&mut self, frame: &Frame);

    /// Called when the connection is established
    fn on_connected(&mut self) {}

    /// Called when the connection is lost or closed
    fn on_disconnected(&mut self) {}
}

/// Simple callback-based handler
pub struct CallbackHandler<F>
where
    F: FnMut(&Frame) + Send,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: FnMut(&Frame) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> MessageHandler for CallbackHandler<F>
where
    F: FnMut(&Frame) + Send,
{
    fn handle(&mut self, frame: &Frame) {
        (self.callback)(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatwire_protocol::MessageType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callback_handler_receives_frames() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let mut handler = CallbackHandler::new(move |_frame: &Frame| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let frame = Frame::from_text(MessageType::ChatText, 0, "hi").unwrap();
        handler.handle(&frame);
        handler.handle(&frame);
        handler.handle(&frame);

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_callback_handler_sees_types_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut handler = CallbackHandler::new(move |frame: &Frame| {
            seen_clone.lock().unwrap().push(frame.msg_type());
        });

        handler.handle(&Frame::from_text(MessageType::AgentThought, 1, "hmm").unwrap());
        handler.handle(&Frame::from_text(MessageType::ChatText, 2, "answer").unwrap());

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![MessageType::AgentThought, MessageType::ChatText]);
    }

    struct TestHandler {
        connected_called: bool,
        disconnected_called: bool,
    }

    impl MessageHandler for TestHandler {
        fn handle(&mut self, _frame: &Frame) {}

        fn on_connected(&mut self) {
            self.connected_called = true;
        }

        fn on_disconnected(&mut self) {
            self.disconnected_called = true;
        }
    }

    #[test]
    fn test_message_handler_lifecycle_callbacks() {
        let mut handler = TestHandler {
            connected_called: false,
            disconnected_called: false,
        };

        handler.on_connected();
        assert!(handler.connected_called);
        assert!(!handler.disconnected_called);

        handler.on_disconnected();
        assert!(handler.disconnected_called);
    }

    #[test]
    fn test_callback_handler_default_lifecycle_is_noop() {
        let mut handler = CallbackHandler::new(|_: &Frame| {});
        handler.on_connected();
        handler.on_disconnected();
    }

    fn assert_send<T: Send>() {}

    #[test]
    fn test_callback_handler_is_send() {
        assert_send::<CallbackHandler<fn(&Frame)>>();
    }
}
