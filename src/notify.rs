//! User-notification channel.

/// Where the transcoder reports progress and problems.
///
/// `message`, `warning` and `error` are console/log lines. `alert` is for the
/// rare case that needs the user's attention in a host UI (a dialog box, a
/// status bar); hosts without a UI can leave the default, since the same text
/// is always sent through [`warning`](Self::warning) as well.
pub trait Notifier {
    fn message(&self, text: &str);
    fn warning(&self, text: &str);
    fn error(&self, text: &str);
    fn alert(&self, _text: &str) {}
}

/// Default notifier: forwards everything to [`tracing`] events.
///
/// The library never installs a subscriber; hosts decide where these go.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn message(&self, text: &str) {
        tracing::info!("{text}");
    }

    fn warning(&self, text: &str) {
        tracing::warn!("{text}");
    }

    fn error(&self, text: &str) {
        tracing::error!("{text}");
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn message(&self, text: &str) {
        (**self).message(text);
    }

    fn warning(&self, text: &str) {
        (**self).warning(text);
    }

    fn error(&self, text: &str) {
        (**self).error(text);
    }

    fn alert(&self, text: &str) {
        (**self).alert(text);
    }
}
