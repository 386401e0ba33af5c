/// A timed trace span opened around one filter body invocation.
pub trait TraceSpan: Send {
    /// Change the identifying name recorded when the span closes.
    fn rename(&mut self, name: &str);

    /// Stop timing and record the span. Consumes the span so it can only close once.
    fn close_and_record(self: Box<Self>);
}

/// Tracer defines the port for time-based monitoring of filter execution
pub trait Tracer: Send + Sync + 'static {
    /// Start a new span
    ///
    /// # Arguments
    /// * `name` - Identifying name, e.g. `ZUUL::AuthFilter`
    ///
    /// # Returns
    /// An open span that the caller must close with [`TraceSpan::close_and_record`]
    fn start_span(&self, name: &str) -> Box<dyn TraceSpan>;
}
