//! Shared test utilities used across graphprep crates.

pub mod tracing {
    //! Capture of spans and events so tests can assert instrumentation.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, MutexGuard};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    /// Layer that stores closed spans and emitted events in memory.
    ///
    /// Clones share storage, so a clone can be handed to the subscriber while
    /// the original is kept for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Returns the closed spans in completion order.
        ///
        /// # Examples
        /// ```
        /// use graphprep_test_support::tracing::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            lock(&self.spans).clone()
        }

        /// Returns the emitted events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            lock(&self.events).clone()
        }

        /// Returns the events whose message equals `message`.
        #[must_use]
        pub fn events_with_message(&self, message: &str) -> Vec<EventRecord> {
            lock(&self.events)
                .iter()
                .filter(|event| event.message() == Some(message))
                .cloned()
                .collect()
        }

        /// Returns the first closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<SpanRecord> {
            lock(&self.spans)
                .iter()
                .find(|span| span.name == name)
                .cloned()
        }
    }

    /// Runs `body` with a thread-local subscriber that records into a fresh
    /// [`RecordingLayer`].
    ///
    /// # Examples
    /// ```
    /// use graphprep_test_support::tracing::capture;
    ///
    /// let ((), layer) = capture(|| tracing::info!(answer = 42, "computed"));
    /// let events = layer.events_with_message("computed");
    /// assert_eq!(events.len(), 1);
    /// assert_eq!(events[0].fields.get("answer").map(String::as_str), Some("42"));
    /// ```
    pub fn capture<T>(body: impl FnOnce() -> T) -> (T, RecordingLayer) {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let value = tracing::subscriber::with_default(subscriber, body);
        (value, layer)
    }

    /// Snapshot of a closed span.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the tracing metadata.
        pub name: String,
        /// Fields recorded at creation or through `Span::record`.
        pub fields: HashMap<String, String>,
    }

    /// Snapshot of an emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Level of the event.
        pub level: Level,
        /// Target of the event.
        pub target: String,
        /// Fields attached to the event, including `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Returns the formatted event message, if any.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.field("message")
        }

        /// Returns a field value by name.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[derive(Default)]
    struct SpanData {
        name: String,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            id: &tracing::span::Id,
            ctx: Context<'_, S>,
        ) {
            if let Some(span) = ctx.span(id) {
                let mut data = SpanData {
                    name: attrs.metadata().name().to_owned(),
                    fields: HashMap::new(),
                };
                attrs.record(&mut FieldRecorder(&mut data.fields));
                span.extensions_mut().insert(data);
            }
        }

        fn on_record(
            &self,
            id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut extensions = span.extensions_mut();
            if let Some(data) = extensions.get_mut::<SpanData>() {
                values.record(&mut FieldRecorder(&mut data.fields));
            }
        }

        fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(data) = span.extensions_mut().remove::<SpanData>() else {
                return;
            };
            lock(&self.spans).push(SpanRecord {
                name: data.name,
                fields: data.fields,
            });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder(&mut fields));
            lock(&self.events).push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            });
        }
    }

    struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldRecorder<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }
    }
}

pub mod fixtures {
    //! On-disk Matrix Market and walk corpus fixtures.
    use std::io::{self, Write};

    use tempfile::NamedTempFile;

    /// Writes a general real coordinate Matrix Market file.
    ///
    /// `entries` are zero-based and written one-based.
    ///
    /// # Errors
    /// Returns any I/O error raised while creating or writing the file.
    ///
    /// # Examples
    /// ```
    /// use graphprep_test_support::fixtures::matrix_market_file;
    ///
    /// let file = matrix_market_file((2, 2), &[(0, 1, 1.0)])?;
    /// let text = std::fs::read_to_string(file.path())?;
    /// assert!(text.ends_with("2 2 1\n1 2 1\n"));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn matrix_market_file(
        shape: (usize, usize),
        entries: &[(usize, usize, f64)],
    ) -> io::Result<NamedTempFile> {
        let mut text = String::from("%%MatrixMarket matrix coordinate real general\n");
        text.push_str(&format!("{} {} {}\n", shape.0, shape.1, entries.len()));
        for (row, col, value) in entries {
            text.push_str(&format!("{} {} {value}\n", row + 1, col + 1));
        }
        text_file(&text, ".mtx")
    }

    /// Writes `contents` verbatim to a temporary file with `suffix`.
    ///
    /// # Errors
    /// Returns any I/O error raised while creating or writing the file.
    pub fn text_file(contents: &str, suffix: &str) -> io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("graphprep-")
            .suffix(suffix)
            .tempfile()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}
