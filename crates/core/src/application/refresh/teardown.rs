// View teardown signal for the refresh loops

use tokio::sync::watch;

/// Held by each background loop; resolves once the hosting view goes away
#[derive(Clone)]
pub struct TeardownToken {
    torn_down: watch::Receiver<bool>,
}

impl TeardownToken {
    pub fn is_torn_down(&self) -> bool {
        *self.torn_down.borrow()
    }

    /// Resolve on teardown, immediately if it already happened
    ///
    /// A dropped [`ViewHandle`] counts as teardown.
    pub async fn torn_down(&mut self) {
        let _ = self.torn_down.wait_for(|down| *down).await;
    }
}

/// Owned by the surface showing the live estimate
///
/// Calling [`ViewHandle::teardown`] or dropping the handle stops every loop
/// holding a token from the same pair.
pub struct ViewHandle {
    torn_down: watch::Sender<bool>,
}

impl ViewHandle {
    pub fn teardown(&self) {
        self.torn_down.send_replace(true);
    }
}

/// Create a view handle and the token its loops watch
pub fn teardown_channel() -> (ViewHandle, TeardownToken) {
    let (torn_down, rx) = watch::channel(false);
    (ViewHandle { torn_down }, TeardownToken { torn_down: rx })
}
