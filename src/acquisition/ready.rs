use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// Edge-triggered, single-producer/single-consumer readiness flag.
///
/// Models an interrupt-set "sample ready" signal. The consumer side must
/// read and clear in one indivisible step so an event raised between the
/// read and the clear is never lost; `take` uses an atomic swap for that.
#[derive(Debug, Default)]
pub struct ReadyLatch {
    ready: AtomicBool,
}

impl ReadyLatch {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Producer side: raise the flag. Safe from a preempting context.
    pub fn set(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Consumer side: atomically read and clear. Returns whether the flag
    /// was set.
    pub fn take(&self) -> bool {
        self.ready.swap(false, Ordering::Acquire)
    }
}

/// One-deep mailbox pairing a raw sample code with a `ReadyLatch`.
///
/// The producer posts a code and raises the flag; the consumer drains with
/// `take`. A post before the previous code was consumed overwrites it,
/// matching the overrun behavior of a one-sample hardware register.
#[derive(Debug, Default)]
pub struct SampleMailbox {
    code: AtomicU16,
    latch: ReadyLatch,
}

impl SampleMailbox {
    pub fn new() -> Self {
        Self {
            code: AtomicU16::new(0),
            latch: ReadyLatch::new(),
        }
    }

    /// Producer side: store the code, then raise the readiness flag.
    pub fn post(&self, code: u16) {
        self.code.store(code, Ordering::Release);
        self.latch.set();
    }

    /// Consumer side: take the pending code, if any.
    pub fn take(&self) -> Option<u16> {
        if self.latch.take() {
            Some(self.code.load(Ordering::Acquire))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_take_is_one_shot() {
        let latch = ReadyLatch::new();
        assert!(!latch.take());
        latch.set();
        assert!(latch.take());
        // Second take sees the cleared flag; the event is not double-consumed.
        assert!(!latch.take());
    }

    #[test]
    fn test_mailbox_delivers_latest_code() {
        let mailbox = SampleMailbox::new();
        assert_eq!(mailbox.take(), None);

        mailbox.post(1234);
        assert_eq!(mailbox.take(), Some(1234));
        assert_eq!(mailbox.take(), None);

        // Overrun: a second post before consumption wins.
        mailbox.post(1);
        mailbox.post(2);
        assert_eq!(mailbox.take(), Some(2));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_mailbox_across_threads() {
        use std::sync::Arc;

        let mailbox = Arc::new(SampleMailbox::new());
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            std::thread::spawn(move || {
                for code in 0..100u16 {
                    mailbox.post(code);
                    std::thread::yield_now();
                }
            })
        };

        let mut last_seen = None;
        while !producer.is_finished() {
            if let Some(code) = mailbox.take() {
                last_seen = Some(code);
            }
        }
        producer.join().unwrap();
        if let Some(code) = mailbox.take() {
            last_seen = Some(code);
        }
        assert_eq!(last_seen, Some(99));
    }
}
