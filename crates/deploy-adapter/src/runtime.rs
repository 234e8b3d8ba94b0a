//! Runtime-agnostic timer.

use std::time::Duration;

/// Sleep for the specified duration using the enabled runtime
///
/// smol's timer runs on its own reactor thread, so it is preferred whenever
/// the `smol` feature is on, even inside a tokio runtime.
pub(crate) async fn sleep(duration: Duration) {
    #[cfg(feature = "smol")]
    {
        smol::Timer::after(duration).await;
    }

    #[cfg(all(feature = "tokio", not(feature = "smol")))]
    {
        tokio::time::sleep(duration).await;
    }

    #[cfg(not(any(feature = "smol", feature = "tokio")))]
    {
        compile_error!("One of the runtime features must be enabled: smol or tokio");
    }
}
