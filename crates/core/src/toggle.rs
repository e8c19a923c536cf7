use std::fmt;
use tokio::sync::watch;

/// Process-wide "AI features on/off" switch.
///
/// Cloning shares the same underlying state. Consumers read through `is_enabled` or a
/// `subscribe`d receiver; `set` and `toggle` are the only ways to change it.
#[derive(Debug, Clone)]
pub struct AiToggle {
    tx: watch::Sender<bool>,
}

impl AiToggle {
    pub fn new(enabled: bool) -> Self {
        let (tx, _rx) = watch::channel(enabled);
        Self { tx }
    }

    pub fn is_enabled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set(&self, enabled: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == enabled {
                return false;
            }
            *current = enabled;
            true
        });
        if changed {
            tracing::info!(enabled, "AI toggle changed");
        }
    }

    /// Flips the switch and returns the new value.
    pub fn toggle(&self) -> bool {
        let mut now = false;
        self.tx.send_modify(|current| {
            *current = !*current;
            now = *current;
        });
        tracing::info!(enabled = now, "AI toggle changed");
        now
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn ensure_enabled(&self, flow: &'static str) -> Result<(), AiDisabledError> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(AiDisabledError { flow })
        }
    }
}

impl Default for AiToggle {
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiDisabledError {
    pub flow: &'static str,
}

impl fmt::Display for AiDisabledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AI features are disabled; refusing to run {}", self.flow)
    }
}

impl std::error::Error for AiDisabledError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = AiToggle::new(true);
        let b = a.clone();
        assert!(!a.toggle());
        assert!(!b.is_enabled());
        b.set(true);
        assert!(a.is_enabled());
    }

    #[test]
    fn ensure_enabled_reports_flow_name() {
        let toggle = AiToggle::new(false);
        let err = toggle.ensure_enabled("aiChatFlow").unwrap_err();
        assert_eq!(err.flow, "aiChatFlow");
        assert!(AiToggle::default().ensure_enabled("aiChatFlow").is_ok());
    }

    #[tokio::test]
    async fn subscribers_observe_changes_but_not_noop_sets() {
        let toggle = AiToggle::new(true);
        let mut rx = toggle.subscribe();

        toggle.set(true);
        assert!(!rx.has_changed().unwrap());

        toggle.set(false);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }
}
