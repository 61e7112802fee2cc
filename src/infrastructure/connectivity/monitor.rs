use crate::application::ports::ConnectivityStatus;
use tokio::sync::watch;

/// Current online/offline state plus a change feed for subscribers.
pub struct ConnectivityMonitor {
    sender: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self { sender }
    }

    /// 状態が実際に変わった時だけ購読者へ通知する。戻り値は遷移の有無。
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!(target: "lunch::connectivity", online, "connectivity changed");
        }
        changed
    }
}

impl ConnectivityStatus for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_explicit() {
        assert!(!ConnectivityMonitor::new(false).is_online());
        assert!(ConnectivityMonitor::new(true).is_online());
    }

    #[test]
    fn test_only_transitions_notify() {
        let monitor = ConnectivityMonitor::new(false);
        let mut rx = monitor.subscribe();

        assert!(!monitor.set_online(false));
        assert!(!rx.has_changed().unwrap());

        assert!(monitor.set_online(true));
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(monitor.is_online());

        assert!(!monitor.set_online(true));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_set_online_without_subscribers() {
        let monitor = ConnectivityMonitor::new(true);
        assert!(monitor.set_online(false));
        assert!(!monitor.is_online());
    }
}
