//! Tracing subscriber setup shared by the server and client binaries.

use tracing::Level;
use tracing_subscriber::fmt::writer::{MakeWriterExt, OrElse, WithMaxLevel};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to the
/// workspace crates and `tower_http`. `json` switches to one JSON object
/// per line. Errors go to stderr, everything else to stdout.
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "prototodo_api={default_level},prototodo_db={default_level},\
             prototodo_core={default_level},tower_http={default_level}"
        )
        .into()
    });

    let writer = split_by_level(std::io::stderr, std::io::stdout);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }
}

/// Route `ERROR` events to `errors` and all other levels to `rest`.
fn split_by_level<E, O>(errors: E, rest: O) -> OrElse<WithMaxLevel<E>, O>
where
    E: for<'a> MakeWriter<'a>,
    O: for<'a> MakeWriter<'a>,
{
    errors.with_max_level(Level::ERROR).or_else(rest)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn errors_and_other_levels_go_to_separate_sinks() {
        let errors = Buffer::default();
        let rest = Buffer::default();

        let writer = {
            let errors = errors.clone();
            let rest = rest.clone();
            split_by_level(move || errors.clone(), move || rest.clone())
        };
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(writer)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("store unreachable");
            tracing::warn!("slow query");
            tracing::info!("todo created");
        });

        let errors = errors.contents();
        let rest = rest.contents();
        assert!(errors.contains("store unreachable"));
        assert!(!errors.contains("slow query"));
        assert!(!errors.contains("todo created"));
        assert!(rest.contains("slow query"));
        assert!(rest.contains("todo created"));
        assert!(!rest.contains("store unreachable"));
    }
}
