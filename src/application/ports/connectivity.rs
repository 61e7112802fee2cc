use tokio::sync::watch;

/// オンライン状態のシグナル。プラットフォーム依存の検出はインフラ層に閉じ込める。
pub trait ConnectivityStatus: Send + Sync {
    fn is_online(&self) -> bool;
    fn subscribe(&self) -> watch::Receiver<bool>;
}
